//! Ordered (red-black tree) indices and their views.
//!
//! An ordered index keeps every element of the container in a red-black
//! tree, sorted by `Comparator::compare` over the keys its extractor
//! projects. The tree is threaded through per-node slots owned by the index
//! (parent/left/right links plus a color), keyed by the element's `Ptr`, so
//! the elements themselves never move.
//!
//! Null handles stand in for missing children and for the root's parent;
//! with slot-array storage a null check costs nothing, which is what a
//! dedicated sentinel node would otherwise buy.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::marker::PhantomData;

use crate::arena::Arena;
use crate::container::{HandleInsert, MultiIndex};
use crate::handle::NodeHandle;
use crate::index::{IndexCore, IndexList, IndexSpec, Nth, Uniqueness};
use crate::key::{CompareKey, Comparator, KeyExtractor, Natural};
use crate::Ptr;

/// Spec for an ordered index that rejects key-equivalent elements.
///
/// Build one with [`ordered_unique`] or [`ordered_unique_by`].
#[derive(Debug, Clone, Copy)]
pub struct OrderedUnique<E, C = Natural> {
    extract: E,
    cmp: C,
}

/// Spec for an ordered index that admits key-equivalent elements.
///
/// Equivalent elements keep their insertion order relative to each other.
/// Build one with [`ordered_non_unique`] or [`ordered_non_unique_by`].
#[derive(Debug, Clone, Copy)]
pub struct OrderedNonUnique<E, C = Natural> {
    extract: E,
    cmp: C,
}

/// An ordered-unique index over the keys `extract` projects, sorted by the
/// keys' own `Ord`.
pub fn ordered_unique<E>(extract: E) -> OrderedUnique<E, Natural> {
    OrderedUnique {
        extract,
        cmp: Natural,
    }
}

/// An ordered-unique index with an explicit comparator.
pub fn ordered_unique_by<E, C>(extract: E, cmp: C) -> OrderedUnique<E, C> {
    OrderedUnique { extract, cmp }
}

/// An ordered-non-unique index over the keys `extract` projects, sorted by
/// the keys' own `Ord`.
pub fn ordered_non_unique<E>(extract: E) -> OrderedNonUnique<E, Natural> {
    OrderedNonUnique {
        extract,
        cmp: Natural,
    }
}

/// An ordered-non-unique index with an explicit comparator.
pub fn ordered_non_unique_by<E, C>(extract: E, cmp: C) -> OrderedNonUnique<E, C> {
    OrderedNonUnique { extract, cmp }
}

impl<T, E, C> IndexSpec<T> for OrderedUnique<E, C>
where
    E: KeyExtractor<T> + Clone,
    C: Comparator<E::Key> + Clone,
{
    type Core = OrderedCore<E, C>;

    fn into_core(self) -> Self::Core {
        OrderedCore::new(self.extract, self.cmp, Uniqueness::Unique)
    }
}

impl<T, E, C> IndexSpec<T> for OrderedNonUnique<E, C>
where
    E: KeyExtractor<T> + Clone,
    C: Comparator<E::Key> + Clone,
{
    type Core = OrderedCore<E, C>;

    fn into_core(self) -> Self::Core {
        OrderedCore::new(self.extract, self.cmp, Uniqueness::NonUnique)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone, Copy)]
struct TreeSlot {
    parent: Ptr,
    left: Ptr,
    right: Ptr,
    color: Color,
}

impl Default for TreeSlot {
    fn default() -> Self {
        TreeSlot {
            parent: Ptr::null(),
            left: Ptr::null(),
            right: Ptr::null(),
            color: Color::Red,
        }
    }
}

/// Where a probed insertion will attach.
#[doc(hidden)]
#[derive(Debug, Clone, Copy)]
pub struct TreeHint {
    parent: Ptr,
    left_side: bool,
}

/// The state of one ordered index: the tree root, the per-node link slots,
/// and the key/order capabilities.
///
/// This type only appears in `Nth<P, Index = OrderedCore<..>>` bounds; it has
/// no user-facing methods of its own. Go through [`OrderedView`] /
/// [`OrderedViewMut`].
pub struct OrderedCore<E, C> {
    extract: E,
    cmp: C,
    pub(crate) unique: Uniqueness,
    root: Ptr,
    slots: Vec<TreeSlot>,
}

impl<E, C> OrderedCore<E, C> {
    fn new(extract: E, cmp: C, unique: Uniqueness) -> Self {
        OrderedCore {
            extract,
            cmp,
            unique,
            root: Ptr::null(),
            slots: Vec::new(),
        }
    }

    fn s(&self, ptr: Ptr) -> &TreeSlot {
        &self.slots[ptr.unchecked_get()]
    }

    fn s_mut(&mut self, ptr: Ptr) -> &mut TreeSlot {
        &mut self.slots[ptr.unchecked_get()]
    }

    fn left(&self, ptr: Ptr) -> Ptr {
        self.s(ptr).left
    }

    fn right(&self, ptr: Ptr) -> Ptr {
        self.s(ptr).right
    }

    fn parent(&self, ptr: Ptr) -> Ptr {
        self.s(ptr).parent
    }

    fn set_left(&mut self, ptr: Ptr, to: Ptr) {
        self.s_mut(ptr).left = to;
    }

    fn set_right(&mut self, ptr: Ptr, to: Ptr) {
        self.s_mut(ptr).right = to;
    }

    fn set_parent(&mut self, ptr: Ptr, to: Ptr) {
        self.s_mut(ptr).parent = to;
    }

    fn set_color(&mut self, ptr: Ptr, color: Color) {
        self.s_mut(ptr).color = color;
    }

    fn color_of(&self, ptr: Ptr) -> Color {
        self.s(ptr).color
    }

    /// Null handles count as black.
    fn is_red(&self, ptr: Ptr) -> bool {
        !ptr.is_null() && self.s(ptr).color == Color::Red
    }

    fn min_from(&self, mut ptr: Ptr) -> Ptr {
        while !self.left(ptr).is_null() {
            ptr = self.left(ptr);
        }
        ptr
    }

    fn max_from(&self, mut ptr: Ptr) -> Ptr {
        while !self.right(ptr).is_null() {
            ptr = self.right(ptr);
        }
        ptr
    }

    /// Smallest element, or null if the tree is empty.
    pub(crate) fn first(&self) -> Ptr {
        if self.root.is_null() {
            Ptr::null()
        } else {
            self.min_from(self.root)
        }
    }

    /// Largest element, or null if the tree is empty.
    pub(crate) fn last(&self) -> Ptr {
        if self.root.is_null() {
            Ptr::null()
        } else {
            self.max_from(self.root)
        }
    }

    /// In-order successor, or null past the maximum.
    pub(crate) fn successor(&self, mut ptr: Ptr) -> Ptr {
        if !self.right(ptr).is_null() {
            return self.min_from(self.right(ptr));
        }
        let mut up = self.parent(ptr);
        while !up.is_null() && ptr == self.right(up) {
            ptr = up;
            up = self.parent(up);
        }
        up
    }

    /// In-order predecessor, or null before the minimum.
    pub(crate) fn predecessor(&self, mut ptr: Ptr) -> Ptr {
        if !self.left(ptr).is_null() {
            return self.max_from(self.left(ptr));
        }
        let mut up = self.parent(ptr);
        while !up.is_null() && ptr == self.left(up) {
            ptr = up;
            up = self.parent(up);
        }
        up
    }

    fn rotate_left(&mut self, x: Ptr) {
        let y = self.right(x);
        debug_assert!(!y.is_null());
        let y_left = self.left(y);
        self.set_right(x, y_left);
        if !y_left.is_null() {
            self.set_parent(y_left, x);
        }
        let up = self.parent(x);
        self.set_parent(y, up);
        if up.is_null() {
            self.root = y;
        } else if self.left(up) == x {
            self.set_left(up, y);
        } else {
            self.set_right(up, y);
        }
        self.set_left(y, x);
        self.set_parent(x, y);
    }

    fn rotate_right(&mut self, x: Ptr) {
        let y = self.left(x);
        debug_assert!(!y.is_null());
        let y_right = self.right(y);
        self.set_left(x, y_right);
        if !y_right.is_null() {
            self.set_parent(y_right, x);
        }
        let up = self.parent(x);
        self.set_parent(y, up);
        if up.is_null() {
            self.root = y;
        } else if self.right(up) == x {
            self.set_right(up, y);
        } else {
            self.set_left(up, y);
        }
        self.set_right(y, x);
        self.set_parent(x, y);
    }

    /// Replaces the subtree rooted at `u` with the one rooted at `v`.
    fn transplant(&mut self, u: Ptr, v: Ptr) {
        let up = self.parent(u);
        if up.is_null() {
            self.root = v;
        } else if self.left(up) == u {
            self.set_left(up, v);
        } else {
            self.set_right(up, v);
        }
        if !v.is_null() {
            self.set_parent(v, up);
        }
    }

    fn fix_insert(&mut self, mut z: Ptr) {
        loop {
            let p = self.parent(z);
            if p.is_null() || !self.is_red(p) {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let g = self.parent(p);
            debug_assert!(!g.is_null());
            if p == self.left(g) {
                let uncle = self.right(g);
                if self.is_red(uncle) {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.right(p) {
                        z = p;
                        self.rotate_left(z);
                    }
                    let p2 = self.parent(z);
                    let g2 = self.parent(p2);
                    self.set_color(p2, Color::Black);
                    self.set_color(g2, Color::Red);
                    self.rotate_right(g2);
                }
            } else {
                let uncle = self.left(g);
                if self.is_red(uncle) {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.left(p) {
                        z = p;
                        self.rotate_right(z);
                    }
                    let p2 = self.parent(z);
                    let g2 = self.parent(p2);
                    self.set_color(p2, Color::Black);
                    self.set_color(g2, Color::Red);
                    self.rotate_left(g2);
                }
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    fn remove_node(&mut self, z: Ptr) {
        let mut removed_color = self.color_of(z);
        let x: Ptr;
        let x_parent: Ptr;
        let z_left = self.left(z);
        let z_right = self.right(z);

        if z_left.is_null() {
            x = z_right;
            x_parent = self.parent(z);
            self.transplant(z, z_right);
        } else if z_right.is_null() {
            x = z_left;
            x_parent = self.parent(z);
            self.transplant(z, z_left);
        } else {
            // Two children: splice in the in-order successor.
            let y = self.min_from(z_right);
            removed_color = self.color_of(y);
            x = self.right(y);
            if self.parent(y) == z {
                x_parent = y;
            } else {
                x_parent = self.parent(y);
                let y_right = self.right(y);
                self.transplant(y, y_right);
                let z_right = self.right(z);
                self.set_right(y, z_right);
                self.set_parent(z_right, y);
            }
            self.transplant(z, y);
            let z_left = self.left(z);
            self.set_left(y, z_left);
            self.set_parent(z_left, y);
            let z_color = self.color_of(z);
            self.set_color(y, z_color);
        }

        if removed_color == Color::Black {
            self.fix_remove(x, x_parent);
        }
    }

    fn fix_remove(&mut self, mut x: Ptr, mut x_parent: Ptr) {
        while x != self.root && !self.is_red(x) {
            if x_parent.is_null() {
                break;
            }
            // A null x cannot be compared against the parent's child slots
            // directly; the occupied slot is the sibling's side.
            let x_is_left = if x.is_null() {
                self.left(x_parent).is_null()
            } else {
                x == self.left(x_parent)
            };
            if x_is_left {
                let mut w = self.right(x_parent);
                debug_assert!(!w.is_null());
                if self.is_red(w) {
                    self.set_color(w, Color::Black);
                    self.set_color(x_parent, Color::Red);
                    self.rotate_left(x_parent);
                    w = self.right(x_parent);
                }
                if !self.is_red(self.left(w)) && !self.is_red(self.right(w)) {
                    self.set_color(w, Color::Red);
                    x = x_parent;
                    x_parent = self.parent(x);
                } else {
                    if !self.is_red(self.right(w)) {
                        let w_left = self.left(w);
                        self.set_color(w_left, Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = self.right(x_parent);
                    }
                    let parent_color = self.color_of(x_parent);
                    self.set_color(w, parent_color);
                    self.set_color(x_parent, Color::Black);
                    let w_right = self.right(w);
                    self.set_color(w_right, Color::Black);
                    self.rotate_left(x_parent);
                    x = self.root;
                    x_parent = Ptr::null();
                }
            } else {
                let mut w = self.left(x_parent);
                debug_assert!(!w.is_null());
                if self.is_red(w) {
                    self.set_color(w, Color::Black);
                    self.set_color(x_parent, Color::Red);
                    self.rotate_right(x_parent);
                    w = self.left(x_parent);
                }
                if !self.is_red(self.left(w)) && !self.is_red(self.right(w)) {
                    self.set_color(w, Color::Red);
                    x = x_parent;
                    x_parent = self.parent(x);
                } else {
                    if !self.is_red(self.left(w)) {
                        let w_right = self.right(w);
                        self.set_color(w_right, Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = self.left(x_parent);
                    }
                    let parent_color = self.color_of(x_parent);
                    self.set_color(w, parent_color);
                    self.set_color(x_parent, Color::Black);
                    let w_left = self.left(w);
                    self.set_color(w_left, Color::Black);
                    self.rotate_right(x_parent);
                    x = self.root;
                    x_parent = Ptr::null();
                }
            }
        }
        if !x.is_null() {
            self.set_color(x, Color::Black);
        }
    }
}

impl<E, C> OrderedCore<E, C> {
    fn key<'v, T>(&self, arena: &'v Arena<T>, ptr: Ptr) -> &'v E::Key
    where
        E: KeyExtractor<T>,
    {
        self.extract.key(&arena[ptr])
    }

    /// Some element whose key is equivalent to `probe` (for a non-unique
    /// index, not necessarily the first in order), or null.
    pub(crate) fn find_in<T, Q>(&self, arena: &Arena<T>, probe: &Q) -> Ptr
    where
        E: KeyExtractor<T>,
        C: Comparator<E::Key> + CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        let mut cur = self.root;
        while !cur.is_null() {
            match self.cmp.compare_key(probe, self.key(arena, cur)) {
                Ordering::Less => cur = self.left(cur),
                Ordering::Greater => cur = self.right(cur),
                Ordering::Equal => return cur,
            }
        }
        Ptr::null()
    }

    /// First element whose key is not before `probe`, or null.
    pub(crate) fn lower_bound_in<T, Q>(&self, arena: &Arena<T>, probe: &Q) -> Ptr
    where
        E: KeyExtractor<T>,
        C: Comparator<E::Key> + CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        let mut cur = self.root;
        let mut bound = Ptr::null();
        while !cur.is_null() {
            if self.cmp.compare_key(probe, self.key(arena, cur)) != Ordering::Greater {
                bound = cur;
                cur = self.left(cur);
            } else {
                cur = self.right(cur);
            }
        }
        bound
    }

    /// First element whose key is after `probe`, or null.
    pub(crate) fn upper_bound_in<T, Q>(&self, arena: &Arena<T>, probe: &Q) -> Ptr
    where
        E: KeyExtractor<T>,
        C: Comparator<E::Key> + CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        let mut cur = self.root;
        let mut bound = Ptr::null();
        while !cur.is_null() {
            if self.cmp.compare_key(probe, self.key(arena, cur)) == Ordering::Less {
                bound = cur;
                cur = self.left(cur);
            } else {
                cur = self.right(cur);
            }
        }
        bound
    }

    /// Number of elements whose keys are equivalent to `probe`.
    pub(crate) fn count_in<T, Q>(&self, arena: &Arena<T>, probe: &Q) -> usize
    where
        E: KeyExtractor<T>,
        C: Comparator<E::Key> + CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        let hit = self.find_in(arena, probe);
        if hit.is_null() {
            return 0;
        }
        if self.unique == Uniqueness::Unique {
            return 1;
        }
        let mut count = 1;
        let mut cur = self.predecessor(hit);
        while !cur.is_null() && self.cmp.compare_key(probe, self.key(arena, cur)) == Ordering::Equal
        {
            count += 1;
            cur = self.predecessor(cur);
        }
        let mut cur = self.successor(hit);
        while !cur.is_null() && self.cmp.compare_key(probe, self.key(arena, cur)) == Ordering::Equal
        {
            count += 1;
            cur = self.successor(cur);
        }
        count
    }

    /// Every element equivalent to `probe`, gathered around a tree hit.
    pub(crate) fn equivalents_in<T, Q>(&self, arena: &Arena<T>, probe: &Q) -> Vec<Ptr>
    where
        E: KeyExtractor<T>,
        C: Comparator<E::Key> + CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        let hit = self.find_in(arena, probe);
        if hit.is_null() {
            return Vec::new();
        }
        let mut found = vec![hit];
        if self.unique == Uniqueness::NonUnique {
            let mut cur = self.predecessor(hit);
            while !cur.is_null()
                && self.cmp.compare_key(probe, self.key(arena, cur)) == Ordering::Equal
            {
                found.push(cur);
                cur = self.predecessor(cur);
            }
            let mut cur = self.successor(hit);
            while !cur.is_null()
                && self.cmp.compare_key(probe, self.key(arena, cur)) == Ordering::Equal
            {
                found.push(cur);
                cur = self.successor(cur);
            }
        }
        found
    }

    /// The mutated element at `ptr` no longer sits where the tree order
    /// wants it. Unique indices test strictly (an equal neighbor is a
    /// violation); non-unique indices tolerate equal neighbors.
    fn displaced<T>(&self, arena: &Arena<T>, ptr: Ptr) -> bool
    where
        E: KeyExtractor<T>,
        C: Comparator<E::Key>,
    {
        let key = self.key(arena, ptr);
        let prev = self.predecessor(ptr);
        let next = self.successor(ptr);
        match self.unique {
            Uniqueness::NonUnique => {
                (!next.is_null()
                    && self.cmp.compare(self.key(arena, next), key) == Ordering::Less)
                    || (!prev.is_null()
                        && self.cmp.compare(key, self.key(arena, prev)) == Ordering::Less)
            }
            Uniqueness::Unique => {
                (!next.is_null()
                    && self.cmp.compare(key, self.key(arena, next)) != Ordering::Less)
                    || (!prev.is_null()
                        && self.cmp.compare(self.key(arena, prev), key) != Ordering::Less)
            }
        }
    }
}

impl<T, E, C> IndexCore<T> for OrderedCore<E, C>
where
    E: KeyExtractor<T> + Clone,
    C: Comparator<E::Key> + Clone,
{
    type Hint = TreeHint;
    type Cache = ();

    fn grow(&mut self, slots: usize) {
        if self.slots.len() < slots {
            self.slots.resize(slots, TreeSlot::default());
        }
    }

    fn probe(&mut self, arena: &Arena<T>, _len: usize, ptr: Ptr) -> Result<TreeHint, Ptr> {
        let key = self.extract.key(&arena[ptr]);
        let mut parent = Ptr::null();
        let mut cur = self.root;
        let mut left_side = false;
        while !cur.is_null() {
            parent = cur;
            let cur_key = self.key(arena, cur);
            match self.unique {
                Uniqueness::Unique => match self.cmp.compare(key, cur_key) {
                    Ordering::Less => {
                        cur = self.left(cur);
                        left_side = true;
                    }
                    Ordering::Greater => {
                        cur = self.right(cur);
                        left_side = false;
                    }
                    Ordering::Equal => return Err(cur),
                },
                // Equal keys descend right, keeping equals in insertion order.
                Uniqueness::NonUnique => match self.cmp.compare(key, cur_key) {
                    Ordering::Less => {
                        cur = self.left(cur);
                        left_side = true;
                    }
                    Ordering::Equal | Ordering::Greater => {
                        cur = self.right(cur);
                        left_side = false;
                    }
                },
            }
        }
        Ok(TreeHint { parent, left_side })
    }

    fn commit(&mut self, _arena: &Arena<T>, ptr: Ptr, hint: TreeHint) {
        *self.s_mut(ptr) = TreeSlot {
            parent: hint.parent,
            left: Ptr::null(),
            right: Ptr::null(),
            color: Color::Red,
        };
        if hint.parent.is_null() {
            self.root = ptr;
        } else if hint.left_side {
            self.set_left(hint.parent, ptr);
        } else {
            self.set_right(hint.parent, ptr);
        }
        self.fix_insert(ptr);
    }

    fn remove(&mut self, ptr: Ptr) {
        self.remove_node(ptr);
    }

    fn pre_modify(&self, _arena: &Arena<T>, _ptr: Ptr) {}

    fn detach_if_displaced(&mut self, arena: &Arena<T>, ptr: Ptr, _cache: &()) -> bool {
        if self.displaced(arena, ptr) {
            self.remove_node(ptr);
            true
        } else {
            false
        }
    }

    fn clear(&mut self) {
        self.root = Ptr::null();
    }

    fn fresh(&self) -> Self {
        OrderedCore::new(self.extract.clone(), self.cmp.clone(), self.unique)
    }
}

/// A read-only view of one ordered index.
///
/// Obtained from [`MultiIndex::ordered`]. Lookup methods accept any probe
/// type the index comparator can place relative to stored keys; with the
/// default [`Natural`] order that means any
/// [`Comparable`](equivalent::Comparable) type, e.g. `&str` probing
/// `String` keys.
pub struct OrderedView<'c, T, E, C> {
    pub(crate) arena: &'c Arena<T>,
    pub(crate) core: &'c OrderedCore<E, C>,
}

impl<'c, T, E, C> OrderedView<'c, T, E, C>
where
    E: KeyExtractor<T>,
    C: Comparator<E::Key>,
{
    /// The element behind `ptr`, if it is live.
    pub fn get(&self, ptr: Ptr) -> Option<&'c T> {
        self.arena.get(ptr)
    }

    /// Some element with a key equivalent to `probe`.
    ///
    /// For a non-unique index this is whichever equivalent element the tree
    /// descent hits; use [`equal_range`](Self::equal_range) to see them all.
    pub fn find<Q>(&self, probe: &Q) -> Option<Ptr>
    where
        C: CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        self.core.find_in(self.arena, probe).optional()
    }

    /// Returns `true` if some element's key is equivalent to `probe`.
    pub fn contains<Q>(&self, probe: &Q) -> bool
    where
        C: CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        self.find(probe).is_some()
    }

    /// The first element whose key is not before `probe`.
    pub fn lower_bound<Q>(&self, probe: &Q) -> Option<Ptr>
    where
        C: CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        self.core.lower_bound_in(self.arena, probe).optional()
    }

    /// The first element whose key is after `probe`.
    pub fn upper_bound<Q>(&self, probe: &Q) -> Option<Ptr>
    where
        C: CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        self.core.upper_bound_in(self.arena, probe).optional()
    }

    /// Number of elements with keys equivalent to `probe`.
    pub fn count<Q>(&self, probe: &Q) -> usize
    where
        C: CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        self.core.count_in(self.arena, probe)
    }

    /// The smallest element in this index's order.
    pub fn first(&self) -> Option<Ptr> {
        self.core.first().optional()
    }

    /// The largest element in this index's order.
    pub fn last(&self) -> Option<Ptr> {
        self.core.last().optional()
    }

    /// The element after `ptr` in this index's order. Returns `None` past
    /// the maximum or when `ptr` is stale.
    pub fn next(&self, ptr: Ptr) -> Option<Ptr> {
        if !self.arena.is_occupied(ptr) {
            return None;
        }
        self.core.successor(ptr).optional()
    }

    /// The element before `ptr` in this index's order. Returns `None` before
    /// the minimum or when `ptr` is stale.
    pub fn prev(&self, ptr: Ptr) -> Option<Ptr> {
        if !self.arena.is_occupied(ptr) {
            return None;
        }
        self.core.predecessor(ptr).optional()
    }

    /// Iterates every element in this index's order.
    pub fn iter(&self) -> OrderedIter<'c, T, E, C> {
        OrderedIter {
            arena: self.arena,
            core: self.core,
            front: self.core.first(),
            back: self.core.last(),
        }
    }

    /// Iterates from `ptr` (inclusive) to the end of this index's order.
    pub fn iter_at(&self, ptr: Ptr) -> OrderedIter<'c, T, E, C> {
        let (front, back) = if self.arena.is_occupied(ptr) {
            (ptr, self.core.last())
        } else {
            (Ptr::null(), Ptr::null())
        };
        OrderedIter {
            arena: self.arena,
            core: self.core,
            front,
            back,
        }
    }

    /// Iterates every element whose key is equivalent to `probe`.
    pub fn equal_range<Q>(&self, probe: &Q) -> OrderedIter<'c, T, E, C>
    where
        C: CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        let lower = self.core.lower_bound_in(self.arena, probe);
        let upper = self.core.upper_bound_in(self.arena, probe);
        let (front, back) = if lower.is_null() || lower == upper {
            (Ptr::null(), Ptr::null())
        } else if upper.is_null() {
            (lower, self.core.last())
        } else {
            (lower, self.core.predecessor(upper))
        };
        OrderedIter {
            arena: self.arena,
            core: self.core,
            front,
            back,
        }
    }
}

impl<'c, T, E, C> Clone for OrderedView<'c, T, E, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'c, T, E, C> Copy for OrderedView<'c, T, E, C> {}

/// A double-ended iterator over an ordered index, in key order.
pub struct OrderedIter<'a, T, E, C> {
    arena: &'a Arena<T>,
    core: &'a OrderedCore<E, C>,
    front: Ptr,
    back: Ptr,
}

impl<'a, T, E, C> Iterator for OrderedIter<'a, T, E, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let cur = self.front.optional()?;
        if self.front == self.back {
            self.front = Ptr::null();
            self.back = Ptr::null();
        } else {
            self.front = self.core.successor(cur);
        }
        Some(&self.arena[cur])
    }
}

impl<'a, T, E, C> DoubleEndedIterator for OrderedIter<'a, T, E, C> {
    fn next_back(&mut self) -> Option<&'a T> {
        let cur = self.back.optional()?;
        if self.back == self.front {
            self.front = Ptr::null();
            self.back = Ptr::null();
        } else {
            self.back = self.core.predecessor(cur);
        }
        Some(&self.arena[cur])
    }
}

impl<'a, T, E, C> Clone for OrderedIter<'a, T, E, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T, E, C> Copy for OrderedIter<'a, T, E, C> {}

/// A mutable view of one ordered index.
///
/// Obtained from [`MultiIndex::ordered_mut`]. Every mutating operation goes
/// through the container, so all other indices stay consistent.
pub struct OrderedViewMut<'c, T, L, P> {
    pub(crate) cont: &'c mut MultiIndex<T, L>,
    pub(crate) _pos: PhantomData<P>,
}

impl<'c, T, L, P, E, C> OrderedViewMut<'c, T, L, P>
where
    L: IndexList<T> + Nth<P, Index = OrderedCore<E, C>>,
    E: KeyExtractor<T>,
    C: Comparator<E::Key>,
{
    /// Reborrows as a read-only view.
    pub fn as_view(&self) -> OrderedView<'_, T, E, C> {
        OrderedView {
            arena: self.cont.arena(),
            core: self.cont.indices().nth(),
        }
    }

    /// Inserts into the container. See [`MultiIndex::insert`].
    pub fn insert(&mut self, value: T) -> (Ptr, bool) {
        self.cont.insert(value)
    }

    /// Reinserts an extracted element. See [`MultiIndex::insert_handle`].
    pub fn insert_handle(&mut self, handle: NodeHandle<T>) -> HandleInsert<T> {
        self.cont.insert_handle(handle)
    }

    /// Removes the element at `ptr` from every index, returning the value
    /// and the successor in *this* index's order.
    pub fn remove(&mut self, ptr: Ptr) -> Option<(T, Option<Ptr>)> {
        if !self.cont.contains_ptr(ptr) {
            return None;
        }
        let next = self.cont.indices().nth().successor(ptr).optional();
        let value = self.cont.remove(ptr)?;
        Some((value, next))
    }

    /// Removes every element whose key is equivalent to `probe`, returning
    /// how many were removed. A unique index removes at most one.
    pub fn remove_key<Q>(&mut self, probe: &Q) -> usize
    where
        C: CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        let targets = self
            .cont
            .indices()
            .nth()
            .equivalents_in(self.cont.arena(), probe);
        for &ptr in &targets {
            self.cont.remove(ptr);
        }
        targets.len()
    }

    /// Mutates the element at `ptr` in place. See [`MultiIndex::modify`].
    pub fn modify<F>(&mut self, ptr: Ptr, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        self.cont.modify(ptr, f)
    }

    /// Detaches the element at `ptr` into a [`NodeHandle`]. See
    /// [`MultiIndex::extract`].
    pub fn extract(&mut self, ptr: Ptr) -> Option<NodeHandle<T>> {
        self.cont.extract(ptr)
    }

    /// Removes every element. See [`MultiIndex::clear`].
    pub fn clear(&mut self) {
        self.cont.clear();
    }

    /// See [`OrderedView::find`].
    pub fn find<Q>(&self, probe: &Q) -> Option<Ptr>
    where
        C: CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        self.as_view().find(probe)
    }

    /// See [`OrderedView::count`].
    pub fn count<Q>(&self, probe: &Q) -> usize
    where
        C: CompareKey<Q, E::Key>,
        Q: ?Sized,
    {
        self.as_view().count(probe)
    }

    /// See [`OrderedView::first`].
    pub fn first(&self) -> Option<Ptr> {
        self.as_view().first()
    }

    /// See [`OrderedView::last`].
    pub fn last(&self) -> Option<Ptr> {
        self.as_view().last()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::container::MultiIndex;
    use crate::key::{CmpFn, Identity, Reversed};
    use crate::index::I0;

    use super::*;

    fn int_set() -> MultiIndex<i64, (OrderedCore<Identity, Natural>,)> {
        MultiIndex::new((ordered_unique(Identity),))
    }

    fn int_bag() -> MultiIndex<i64, (OrderedCore<Identity, Natural>,)> {
        MultiIndex::new((ordered_non_unique(Identity),))
    }

    fn contents(set: &MultiIndex<i64, (OrderedCore<Identity, Natural>,)>) -> Vec<i64> {
        set.ordered(I0).iter().copied().collect()
    }

    #[test]
    fn test_sorted_iteration() {
        let mut set = int_set();
        for v in [5, 1, 9, 3, 7, 2, 8, 4, 6, 0] {
            let (_, inserted) = set.insert(v);
            assert!(inserted);
        }
        assert_eq!(contents(&set), (0..=9).collect::<Vec<_>>());
        let reversed: Vec<i64> = set.ordered(I0).iter().rev().copied().collect();
        assert_eq!(reversed, (0..=9).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_unique_rejects_duplicates() {
        let mut set = int_set();
        let (first, inserted) = set.insert(5);
        assert!(inserted);
        let (conflict, inserted) = set.insert(5);
        assert!(!inserted);
        assert_eq!(conflict, first);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_non_unique_keeps_duplicates() {
        let mut bag = int_bag();
        for v in [3, 1, 3, 2, 3] {
            let (_, inserted) = bag.insert(v);
            assert!(inserted);
        }
        assert_eq!(contents(&bag), [1, 2, 3, 3, 3]);
        assert_eq!(bag.ordered(I0).count(&3), 3);
        assert_eq!(bag.ordered(I0).count(&1), 1);
        assert_eq!(bag.ordered(I0).count(&9), 0);
    }

    #[test]
    fn test_find_and_bounds() {
        let mut set = int_set();
        for v in [10, 20, 30, 40] {
            set.insert(v);
        }
        let view = set.ordered(I0);
        assert_eq!(view.get(view.find(&20).unwrap()), Some(&20));
        assert_eq!(view.find(&25), None);

        assert_eq!(view.get(view.lower_bound(&20).unwrap()), Some(&20));
        assert_eq!(view.get(view.lower_bound(&25).unwrap()), Some(&30));
        assert_eq!(view.lower_bound(&41), None);

        assert_eq!(view.get(view.upper_bound(&20).unwrap()), Some(&30));
        assert_eq!(view.upper_bound(&40), None);
    }

    #[test]
    fn test_equal_range() {
        let mut bag = int_bag();
        for v in [1, 2, 2, 2, 3] {
            bag.insert(v);
        }
        let view = bag.ordered(I0);
        let range: Vec<i64> = view.equal_range(&2).copied().collect();
        assert_eq!(range, [2, 2, 2]);
        let empty: Vec<i64> = view.equal_range(&9).copied().collect();
        assert_eq!(empty, Vec::<i64>::new());
        let edge: Vec<i64> = view.equal_range(&3).copied().collect();
        assert_eq!(edge, [3]);
    }

    #[test]
    fn test_reversed_order() {
        let mut set: MultiIndex<i64, (OrderedCore<Identity, Reversed>,)> =
            MultiIndex::new((ordered_unique_by(Identity, Reversed),));
        for v in [2, 9, 4, 7] {
            set.insert(v);
        }
        let values: Vec<i64> = set.ordered(I0).iter().copied().collect();
        assert_eq!(values, [9, 7, 4, 2]);
        assert_eq!(set.ordered(I0).get(set.ordered(I0).first().unwrap()), Some(&9));
    }

    #[test]
    fn test_custom_comparator() {
        let by_abs = CmpFn(|a: &i64, b: &i64| a.abs().cmp(&b.abs()));
        let mut set = MultiIndex::new((ordered_unique_by(Identity, by_abs),));
        set.insert(-5i64);
        set.insert(2);
        set.insert(-1);
        let values: Vec<i64> = set.ordered(I0).iter().copied().collect();
        assert_eq!(values, [-1, 2, -5]);
        // |-5| and |5| collide under this order.
        let (_, inserted) = set.insert(5);
        assert!(!inserted);
    }

    #[test]
    fn test_removal_keeps_order() {
        let mut set = int_set();
        for v in 0..64 {
            set.insert(v);
        }
        // Remove odds through the view, checking reported successors.
        let mut view = set.ordered_mut(I0);
        for v in (1..64).step_by(2) {
            let ptr = view.find(&v).unwrap();
            let (value, next) = view.remove(ptr).unwrap();
            assert_eq!(value, v);
            if v < 63 {
                assert_eq!(view.as_view().get(next.unwrap()), Some(&(v + 1)));
            } else {
                assert_eq!(next, None);
            }
        }
        assert_eq!(contents(&set), (0..64).step_by(2).collect::<Vec<_>>());
    }

    #[test]
    fn test_remove_key_non_unique_removes_class() {
        let mut bag = int_bag();
        for v in [2, 1, 2, 3, 2] {
            bag.insert(v);
        }
        assert_eq!(bag.ordered_mut(I0).remove_key(&2), 3);
        assert_eq!(bag.ordered_mut(I0).remove_key(&9), 0);
        assert_eq!(contents(&bag), [1, 3]);
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_churn_keeps_invariants() {
        // Deterministic pseudo-random insert/remove churn; ordering and
        // counting must hold at every step.
        let mut set = int_set();
        let mut live = Vec::new();
        let mut state = 0x2545f49_u64;
        for _ in 0..2000 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let v = (state >> 33) as i64 % 256;
            if state & 1 == 0 {
                let (_, inserted) = set.insert(v);
                assert_eq!(inserted, !live.contains(&v));
                if inserted {
                    live.push(v);
                }
            } else if let Some(ptr) = set.ordered(I0).find(&v) {
                set.ordered_mut(I0).remove(ptr);
                live.retain(|&x| x != v);
            }
            assert_eq!(set.len(), live.len());
        }
        live.sort_unstable();
        assert_eq!(contents(&set), live);
    }

    #[test]
    fn test_iter_at() {
        let mut set = int_set();
        for v in [1, 2, 3, 4] {
            set.insert(v);
        }
        let view = set.ordered(I0);
        let ptr = view.find(&3).unwrap();
        let tail: Vec<i64> = view.iter_at(ptr).copied().collect();
        assert_eq!(tail, [3, 4]);
    }

    #[test]
    fn test_heterogeneous_lookup() {
        use alloc::string::{String, ToString};

        #[derive(Clone)]
        struct Whole;
        impl KeyExtractor<String> for Whole {
            type Key = str;
            fn key<'a>(&self, value: &'a String) -> &'a str {
                value
            }
        }

        let mut set = MultiIndex::new((ordered_unique(Whole),));
        set.insert("beta".to_string());
        set.insert("alpha".to_string());
        let view = set.ordered(I0);
        assert!(view.contains("alpha"));
        assert_eq!(view.get(view.find("beta").unwrap()), Some(&"beta".to_string()));
        assert_eq!(view.count("gamma"), 0);
    }
}
