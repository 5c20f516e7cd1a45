//! The container that drives every index in lock-step.
//!
//! [`MultiIndex`] owns the element arena, the insertion-order list, and the
//! tuple of index states. Every mutating operation is a small transaction
//! across the whole tuple:
//!
//! - `insert` probes every index before committing to any of them, so a
//!   uniqueness conflict is detected while the container is still untouched.
//! - `remove` / `extract` unlink from every index, then the order list, then
//!   the arena.
//! - `modify` captures per-index locators, runs the caller's mutation, and
//!   re-files the element wherever its keys changed, or backs it out of the
//!   container entirely if a uniqueness rule now rejects it.
//!
//! The insertion-order list is circular (the head's `prev` is the tail),
//! giving O(1) append and unlink and double-ended iteration that is
//! independent of every index.

use core::fmt;
use core::marker::PhantomData;

use crate::arena::Arena;
use crate::handle::NodeHandle;
use crate::hashed::{HashedCore, HashedView, HashedViewMut};
use crate::index::{IndexList, IndexSpecs, Nth};
use crate::ordered::{OrderedCore, OrderedView, OrderedViewMut};
use crate::Ptr;

/// A collection of `T` kept live in several independent indices at once.
///
/// `L` is the tuple of index states, normally inferred from the spec tuple
/// handed to [`new`](MultiIndex::new):
///
/// ```
/// use weft::{hashed_unique, ordered_unique, Identity, MultiIndex, I0, I1};
///
/// let mut set = MultiIndex::new((hashed_unique(Identity), ordered_unique(Identity)));
/// set.insert(3u32);
/// set.insert(1);
/// set.insert(2);
///
/// assert!(set.hashed(I0).contains(&2));
/// let sorted: Vec<u32> = set.ordered(I1).iter().copied().collect();
/// assert_eq!(sorted, [1, 2, 3]);
///
/// // Insertion order is kept independently of every index.
/// let arrival: Vec<u32> = set.iter().copied().collect();
/// assert_eq!(arrival, [3, 1, 2]);
/// ```
pub struct MultiIndex<T, L> {
    arena: Arena<T>,
    indices: L,
    head: Ptr,
    tail: Ptr,
    len: usize,
}

/// Result of reinserting an extracted element.
///
/// On success `inserted` is `true`, `ptr` names the element's node, and
/// `handle` is empty. On a uniqueness conflict `ptr` names the incumbent and
/// `handle` carries the rejected element back to the caller.
#[derive(Debug)]
pub struct HandleInsert<T> {
    /// The inserted node, or the conflicting incumbent.
    pub ptr: Ptr,
    /// Whether the element entered the container.
    pub inserted: bool,
    /// The element itself when it was rejected, empty otherwise.
    pub handle: NodeHandle<T>,
}

impl<T, L: IndexList<T>> MultiIndex<T, L> {
    /// Creates an empty container from a tuple of index specs.
    ///
    /// The spec tuple fixes the index lineup for the container's lifetime;
    /// see [`ordered_unique`](crate::ordered_unique),
    /// [`hashed_unique`](crate::hashed_unique) and their siblings.
    pub fn new<S>(specs: S) -> Self
    where
        S: IndexSpecs<T, List = L>,
    {
        MultiIndex {
            arena: Arena::new(),
            indices: specs.into_list(),
            head: Ptr::null(),
            tail: Ptr::null(),
            len: 0,
        }
    }

    /// Creates an empty container pre-sized for `capacity` elements.
    pub fn with_capacity<S>(specs: S, capacity: usize) -> Self
    where
        S: IndexSpecs<T, List = L>,
    {
        MultiIndex {
            arena: Arena::with_capacity(capacity),
            indices: specs.into_list(),
            head: Ptr::null(),
            tail: Ptr::null(),
            len: 0,
        }
    }

    pub(crate) fn arena(&self) -> &Arena<T> {
        &self.arena
    }

    pub(crate) fn indices(&self) -> &L {
        &self.indices
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the container holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The element behind `ptr`, if it is live.
    pub fn get(&self, ptr: Ptr) -> Option<&T> {
        self.arena.get(ptr)
    }

    /// Returns `true` if `ptr` refers to a live element of this container.
    pub fn contains_ptr(&self, ptr: Ptr) -> bool {
        self.arena.is_occupied(ptr)
    }

    /// The oldest live element, or null when empty.
    pub fn head_ptr(&self) -> Ptr {
        self.head
    }

    /// The newest live element, or null when empty.
    pub fn tail_ptr(&self) -> Ptr {
        self.tail
    }

    /// Inserts `value`, making it discoverable through every index at once.
    ///
    /// Returns the new element's [`Ptr`] and `true`; or, if some unique
    /// index already holds an equivalent element, that incumbent's [`Ptr`]
    /// and `false` with the container unchanged.
    pub fn insert(&mut self, value: T) -> (Ptr, bool) {
        match self.insert_value(value) {
            Ok(ptr) => (ptr, true),
            Err((conflict, _rejected)) => (conflict, false),
        }
    }

    fn insert_value(&mut self, value: T) -> Result<Ptr, (Ptr, T)> {
        let ptr = self.arena.alloc(value);
        self.indices.grow(self.arena.slot_count());

        let Self {
            arena,
            indices,
            len,
            ..
        } = self;
        match indices.probe(arena, *len, ptr) {
            Ok(hints) => {
                indices.commit(arena, ptr, hints);
                self.link_tail(ptr);
                self.len += 1;
                Ok(ptr)
            }
            Err(conflict) => {
                // No index was touched; take the freshly allocated node back
                // apart and surface the incumbent.
                let freed = self.arena.free(ptr);
                Err((conflict, freed.value))
            }
        }
    }

    /// Removes the element at `ptr` from every index and destroys its node,
    /// returning the value. Returns `None` if `ptr` is not live.
    pub fn remove(&mut self, ptr: Ptr) -> Option<T> {
        if !self.arena.is_occupied(ptr) {
            return None;
        }
        self.indices.remove(ptr);
        let freed = self.arena.free(ptr);
        self.finish_unlink(ptr, freed.prev, freed.next);
        self.len -= 1;
        Some(freed.value)
    }

    /// Mutates the element at `ptr` in place, re-filing it in every index
    /// whose key the mutation changed.
    ///
    /// Returns `true` if the element is still in the container. If the
    /// mutation made the element collide with an incumbent under some unique
    /// index, the element is removed and destroyed and `modify` returns
    /// `false`; the pre-mutation key is gone, so there is nothing to
    /// restore. Returns `false` without calling `f` if `ptr` is not live.
    pub fn modify<F>(&mut self, ptr: Ptr, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        if !self.arena.is_occupied(ptr) {
            return false;
        }
        let Self {
            arena,
            indices,
            len,
            ..
        } = self;
        let caches = indices.pre_modify(arena, ptr);
        f(&mut arena[ptr]);
        let kept = indices.reconcile(arena, *len, ptr, caches);
        if !kept {
            let freed = self.arena.free(ptr);
            self.finish_unlink(ptr, freed.prev, freed.next);
            self.len -= 1;
        }
        kept
    }

    /// Removes the element at `ptr` from every index and moves it into a
    /// detachable [`NodeHandle`] instead of destroying it.
    pub fn extract(&mut self, ptr: Ptr) -> Option<NodeHandle<T>> {
        self.remove(ptr).map(NodeHandle::new)
    }

    /// Reinserts an element held by a [`NodeHandle`].
    ///
    /// On a uniqueness conflict the element comes back inside
    /// [`HandleInsert::handle`] together with the incumbent's [`Ptr`]. An
    /// empty handle reports `inserted == false` with a null `ptr`.
    pub fn insert_handle(&mut self, mut handle: NodeHandle<T>) -> HandleInsert<T> {
        let Some(value) = handle.take() else {
            return HandleInsert {
                ptr: Ptr::null(),
                inserted: false,
                handle,
            };
        };
        match self.insert_value(value) {
            Ok(ptr) => HandleInsert {
                ptr,
                inserted: true,
                handle: NodeHandle::empty(),
            },
            Err((conflict, value)) => HandleInsert {
                ptr: conflict,
                inserted: false,
                handle: NodeHandle::new(value),
            },
        }
    }

    /// Removes every element. Index capacity (bucket arrays, slot vectors)
    /// is kept for reuse.
    pub fn clear(&mut self) {
        self.indices.clear();
        self.arena.clear();
        self.head = Ptr::null();
        self.tail = Ptr::null();
        self.len = 0;
    }

    /// Iterates every element in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: &self.arena,
            forward: self.head,
            reverse: self.tail,
        }
    }

    /// A read-only view of the ordered index at position `P`.
    ///
    /// ```
    /// use weft::{ordered_unique, Identity, MultiIndex, I0};
    ///
    /// let mut set = MultiIndex::new((ordered_unique(Identity),));
    /// set.insert(2);
    /// assert!(set.ordered(I0).contains(&2));
    /// ```
    pub fn ordered<P, E, C>(&self, _pos: P) -> OrderedView<'_, T, E, C>
    where
        L: Nth<P, Index = OrderedCore<E, C>>,
    {
        OrderedView {
            arena: &self.arena,
            core: self.indices.nth(),
        }
    }

    /// A mutable view of the ordered index at position `P`.
    pub fn ordered_mut<P, E, C>(&mut self, _pos: P) -> OrderedViewMut<'_, T, L, P>
    where
        L: Nth<P, Index = OrderedCore<E, C>>,
    {
        OrderedViewMut {
            cont: self,
            _pos: PhantomData,
        }
    }

    /// A read-only view of the hashed index at position `P`.
    ///
    /// ```
    /// use weft::{hashed_unique, Identity, MultiIndex, I0};
    ///
    /// let mut set = MultiIndex::new((hashed_unique(Identity),));
    /// set.insert(2);
    /// assert!(set.hashed(I0).contains(&2));
    /// ```
    pub fn hashed<P, E, S>(&self, _pos: P) -> HashedView<'_, T, E, S>
    where
        L: Nth<P, Index = HashedCore<E, S>>,
    {
        HashedView {
            arena: &self.arena,
            core: self.indices.nth(),
        }
    }

    /// A mutable view of the hashed index at position `P`.
    pub fn hashed_mut<P, E, S>(&mut self, _pos: P) -> HashedViewMut<'_, T, L, P>
    where
        L: Nth<P, Index = HashedCore<E, S>>,
    {
        HashedViewMut {
            cont: self,
            _pos: PhantomData,
        }
    }

    fn link_tail(&mut self, ptr: Ptr) {
        if self.head.is_null() {
            debug_assert!(self.tail.is_null());
            self.head = ptr;
            self.tail = ptr;
            // The fresh node is already circularly self-linked.
        } else {
            let head = self.head;
            let tail = self.tail;
            self.arena.set_next(tail, ptr);
            self.arena.set_prev(head, ptr);
            self.arena.set_next(ptr, head);
            self.arena.set_prev(ptr, tail);
            self.tail = ptr;
        }
    }

    /// The arena already spliced the node's neighbors together; this fixes
    /// up `head`/`tail`.
    fn finish_unlink(&mut self, ptr: Ptr, prev: Ptr, next: Ptr) {
        if prev.is_null() {
            debug_assert!(next.is_null());
            if self.head == ptr {
                self.head = Ptr::null();
                self.tail = Ptr::null();
            }
        } else {
            if self.head == ptr {
                self.head = next;
            }
            if self.tail == ptr {
                self.tail = prev;
            }
        }
    }

    /// Audits the container's cross-index bookkeeping, panicking on any
    /// inconsistency. Only available in debug builds with the
    /// `internal-debugging` feature.
    #[cfg(all(debug_assertions, feature = "internal-debugging"))]
    pub fn debug_validate(&self) {
        if self.is_empty() {
            assert_eq!(self.head, Ptr::null(), "head of an empty container");
            assert_eq!(self.tail, Ptr::null(), "tail of an empty container");
            return;
        }
        assert_ne!(self.head, Ptr::null(), "head missing");
        assert_ne!(self.tail, Ptr::null(), "tail missing");
        assert_eq!(
            self.arena.prev_of(self.head),
            self.tail,
            "order list is not circular"
        );
        assert_eq!(
            self.arena.next_of(self.tail),
            self.head,
            "order list is not circular"
        );
        assert_eq!(self.iter().count(), self.len, "order list length drifted");
    }
}

impl<T: Clone, L: IndexList<T>> Clone for MultiIndex<T, L> {
    /// Rebuilds every index by replaying this container's insertion order.
    fn clone(&self) -> Self {
        let mut clone = MultiIndex {
            arena: Arena::with_capacity(self.len),
            indices: self.indices.fresh(),
            head: Ptr::null(),
            tail: Ptr::null(),
            len: 0,
        };
        for value in self.iter() {
            let (_, inserted) = clone.insert(value.clone());
            debug_assert!(inserted, "replaying a valid container cannot conflict");
        }
        clone
    }
}

impl<T: PartialEq, L: IndexList<T>> PartialEq for MultiIndex<T, L> {
    /// Containers are equal when their insertion-order sequences are.
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq, L: IndexList<T>> Eq for MultiIndex<T, L> {}

impl<T: fmt::Debug, L: IndexList<T>> fmt::Debug for MultiIndex<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MultiIndex ")?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, L: IndexList<T>> core::ops::Index<Ptr> for MultiIndex<T, L> {
    type Output = T;

    fn index(&self, index: Ptr) -> &T {
        &self.arena[index]
    }
}

impl<'a, T, L: IndexList<T>> IntoIterator for &'a MultiIndex<T, L> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, L: IndexList<T>> IntoIterator for MultiIndex<T, L> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Consumes the container, yielding elements in insertion order.
    fn into_iter(self) -> IntoIter<T> {
        let MultiIndex {
            arena, head, tail, ..
        } = self;
        IntoIter {
            arena,
            forward: head,
            reverse: tail,
        }
    }
}

/// A double-ended iterator over a container in insertion order.
///
/// Created by [`MultiIndex::iter`].
pub struct Iter<'a, T> {
    arena: &'a Arena<T>,
    forward: Ptr,
    reverse: Ptr,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let cur = self.forward.optional()?;
        if self.forward == self.reverse {
            self.forward = Ptr::null();
            self.reverse = Ptr::null();
        } else {
            self.forward = self.arena.next_of(cur);
        }
        Some(&self.arena[cur])
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        let cur = self.reverse.optional()?;
        if self.reverse == self.forward {
            self.forward = Ptr::null();
            self.reverse = Ptr::null();
        } else {
            self.reverse = self.arena.prev_of(cur);
        }
        Some(&self.arena[cur])
    }
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Iter<'a, T> {}

/// An owning iterator over a container in insertion order.
///
/// Created by [`MultiIndex::into_iter`]. Elements not yielded are dropped
/// with the iterator.
pub struct IntoIter<T> {
    arena: Arena<T>,
    forward: Ptr,
    reverse: Ptr,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let cur = self.forward.optional()?;
        if self.forward == self.reverse {
            self.forward = Ptr::null();
            self.reverse = Ptr::null();
        } else {
            self.forward = self.arena.next_of(cur);
        }
        Some(self.arena.free(cur).value)
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        let cur = self.reverse.optional()?;
        if self.reverse == self.forward {
            self.forward = Ptr::null();
            self.reverse = Ptr::null();
        } else {
            self.reverse = self.arena.prev_of(cur);
        }
        Some(self.arena.free(cur).value)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::hashed::hashed_unique;
    use crate::index::{I0, I1, I2};
    use crate::key::{Identity, KeyExtractor, Natural, Reversed};
    use crate::ordered::{ordered_non_unique, ordered_unique, ordered_unique_by};

    use super::*;

    type TriList = (
        HashedCore<Identity, crate::RandomState>,
        OrderedCore<Identity, Natural>,
        OrderedCore<Identity, Reversed>,
    );

    /// One hashed-unique index plus ascending and descending ordered-unique
    /// indices over the same `i64` key.
    fn tri_index() -> MultiIndex<i64, TriList> {
        MultiIndex::new((
            hashed_unique(Identity),
            ordered_unique(Identity),
            ordered_unique_by(Identity, Reversed),
        ))
    }

    fn assert_tri_invariants(c: &MultiIndex<i64, TriList>) {
        // Every index sees exactly the container's elements.
        assert_eq!(c.iter().count(), c.len());
        assert_eq!(c.hashed(I0).iter().count(), c.len());
        assert_eq!(c.ordered(I1).iter().count(), c.len());
        assert_eq!(c.ordered(I2).iter().count(), c.len());

        let ascending: Vec<i64> = c.ordered(I1).iter().copied().collect();
        let mut expected = ascending.clone();
        expected.sort_unstable();
        expected.dedup();
        assert_eq!(ascending, expected, "ascending index out of order");

        let descending: Vec<i64> = c.ordered(I2).iter().copied().collect();
        let mut reversed = descending.clone();
        reversed.reverse();
        assert_eq!(reversed, ascending, "the two orders disagree");

        for &v in &ascending {
            let hashed = c.hashed(I0).find(&v).unwrap();
            let asc = c.ordered(I1).find(&v).unwrap();
            let desc = c.ordered(I2).find(&v).unwrap();
            // One element, one node: every index reports the same handle.
            assert_eq!(hashed, asc);
            assert_eq!(asc, desc);
        }
    }

    #[test]
    fn test_modify_refiles_in_every_index() {
        let mut c = tri_index();
        for v in 0..=10 {
            let (_, inserted) = c.insert(v);
            assert!(inserted);
        }

        let zero = c.hashed(I0).find(&0).unwrap();
        assert!(c.modify(zero, |v| *v = 11));

        assert_eq!(c.hashed(I0).find(&0), None);
        let eleven = c.hashed(I0).find(&11).unwrap();
        assert_eq!(c[eleven], 11);
        let first_asc = c.ordered(I1).first().unwrap();
        assert_eq!(c[first_asc], 1);
        let first_desc = c.ordered(I2).first().unwrap();
        assert_eq!(c[first_desc], 11);
        assert_eq!(c.len(), 11);
        assert_tri_invariants(&c);
    }

    #[test]
    fn test_conflicting_insert_changes_nothing() {
        let mut c = tri_index();
        let (first, inserted) = c.insert(5);
        assert!(inserted);

        let (conflict, inserted) = c.insert(5);
        assert!(!inserted);
        assert_eq!(conflict, first);
        assert_eq!(c.len(), 1);
        assert_tri_invariants(&c);
    }

    #[test]
    fn test_destructive_modify_removes_element() {
        let mut c = tri_index();
        for v in [1, 2, 3] {
            c.insert(v);
        }

        let one = c.hashed(I0).find(&1).unwrap();
        // 1 -> 2 collides with the incumbent 2 in every unique index.
        assert!(!c.modify(one, |v| *v = 2));

        assert_eq!(c.len(), 2);
        assert!(!c.contains_ptr(one));
        let remaining: Vec<i64> = c.ordered(I1).iter().copied().collect();
        assert_eq!(remaining, [2, 3]);
        // The insertion-order list lost exactly the destroyed node.
        let arrival: Vec<i64> = c.iter().copied().collect();
        assert_eq!(arrival, [2, 3]);
        assert_tri_invariants(&c);
    }

    #[test]
    fn test_unique_hash_guards_non_unique_order() {
        let mut c = MultiIndex::new((hashed_unique(Identity), ordered_non_unique(Identity)));
        let results: Vec<bool> = [1i64, 1, 2, 3].iter().map(|&v| c.insert(v).1).collect();
        assert_eq!(results, [true, false, true, true]);
        assert_eq!(c.len(), 3);
        let ordered: Vec<i64> = c.ordered(I1).iter().copied().collect();
        assert_eq!(ordered, [1, 2, 3]);
        assert_eq!(c.ordered(I1).count(&1), 1);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Pair(i64, char);

    #[derive(Clone)]
    struct First;
    impl KeyExtractor<Pair> for First {
        type Key = i64;
        fn key<'a>(&self, value: &'a Pair) -> &'a i64 {
            &value.0
        }
    }

    #[derive(Clone)]
    struct Second;
    impl KeyExtractor<Pair> for Second {
        type Key = char;
        fn key<'a>(&self, value: &'a Pair) -> &'a char {
            &value.1
        }
    }

    #[test]
    fn test_extract_and_reinsert_through_other_view() {
        let mut c = MultiIndex::new((ordered_unique(First), ordered_unique(Second)));
        c.insert(Pair(1, 'a'));
        c.insert(Pair(2, 'b'));

        let ptr = c.ordered(I0).find(&1).unwrap();
        let handle = c.ordered_mut(I0).extract(ptr).unwrap();
        assert_eq!(c.len(), 1);
        assert!(!c.ordered(I0).contains(&1));
        assert!(!c.ordered(I1).contains(&'a'));

        let outcome = c.ordered_mut(I1).insert_handle(handle);
        assert!(outcome.inserted);
        assert!(outcome.handle.is_empty());
        assert_eq!(c.len(), 2);
        assert_eq!(c.ordered(I0).get(c.ordered(I0).find(&1).unwrap()), Some(&Pair(1, 'a')));
        assert_eq!(c.ordered(I1).get(c.ordered(I1).find(&'a').unwrap()), Some(&Pair(1, 'a')));
    }

    #[test]
    fn test_insert_handle_conflict_returns_element() {
        let mut c = tri_index();
        c.insert(1);
        c.insert(2);

        let handle = c.extract(c.hashed(I0).find(&1).unwrap()).unwrap();
        c.insert(1);

        let outcome = c.insert_handle(handle);
        assert!(!outcome.inserted);
        assert_eq!(c[outcome.ptr], 1);
        assert_eq!(outcome.handle.into_value(), Some(1));
        assert_eq!(c.len(), 2);
        assert_tri_invariants(&c);
    }

    #[test]
    fn test_insert_empty_handle() {
        let mut c = tri_index();
        let outcome = c.insert_handle(NodeHandle::empty());
        assert!(!outcome.inserted);
        assert!(outcome.ptr.is_null());
        assert!(outcome.handle.is_empty());
        assert!(c.is_empty());
    }

    #[test]
    fn test_noop_modify_is_a_fixed_point() {
        let mut c = tri_index();
        for v in [4, 1, 3, 2] {
            c.insert(v);
        }
        let before_arrival: Vec<i64> = c.iter().copied().collect();
        let before_asc: Vec<i64> = c.ordered(I1).iter().copied().collect();
        let before_desc: Vec<i64> = c.ordered(I2).iter().copied().collect();
        let before_hash: Vec<i64> = c.hashed(I0).iter().copied().collect();

        let ptr = c.hashed(I0).find(&3).unwrap();
        assert!(c.modify(ptr, |_| {}));

        assert_eq!(c.iter().copied().collect::<Vec<_>>(), before_arrival);
        assert_eq!(c.ordered(I1).iter().copied().collect::<Vec<_>>(), before_asc);
        assert_eq!(c.ordered(I2).iter().copied().collect::<Vec<_>>(), before_desc);
        assert_eq!(c.hashed(I0).iter().copied().collect::<Vec<_>>(), before_hash);
        assert_tri_invariants(&c);
    }

    #[test]
    fn test_clone_replays_insertion_order() {
        let mut c = tri_index();
        for v in [9, 2, 7, 4] {
            c.insert(v);
        }
        let copy = c.clone();
        assert_eq!(c, copy);
        assert_eq!(
            c.iter().collect::<Vec<_>>(),
            copy.iter().collect::<Vec<_>>()
        );
        assert_eq!(
            c.ordered(I1).iter().collect::<Vec<_>>(),
            copy.ordered(I1).iter().collect::<Vec<_>>()
        );
        assert_eq!(
            c.ordered(I2).iter().collect::<Vec<_>>(),
            copy.ordered(I2).iter().collect::<Vec<_>>()
        );
        assert_tri_invariants(&copy);

        // The copy is independent.
        let mut copy = copy;
        copy.insert(100);
        assert_eq!(c.len(), 4);
        assert_eq!(copy.len(), 5);
        assert_ne!(c, copy);
    }

    #[test]
    fn test_insertion_order_iteration() {
        let mut c = tri_index();
        for v in [5, 3, 9, 1] {
            c.insert(v);
        }
        let arrival: Vec<i64> = c.iter().copied().collect();
        assert_eq!(arrival, [5, 3, 9, 1]);
        let reverse: Vec<i64> = c.iter().rev().copied().collect();
        assert_eq!(reverse, [1, 9, 3, 5]);
        assert_eq!(c[c.head_ptr()], 5);
        assert_eq!(c[c.tail_ptr()], 1);

        c.remove(c.hashed(I0).find(&5).unwrap());
        assert_eq!(c[c.head_ptr()], 3);
        let arrival: Vec<i64> = c.iter().copied().collect();
        assert_eq!(arrival, [3, 9, 1]);
    }

    #[test]
    fn test_into_iter_drains_in_order() {
        let mut c = tri_index();
        for v in [5, 3, 9] {
            c.insert(v);
        }
        let drained: Vec<i64> = c.into_iter().collect();
        assert_eq!(drained, [5, 3, 9]);
    }

    #[test]
    fn test_clear_then_reuse() {
        let mut c = tri_index();
        for v in 0..20 {
            c.insert(v);
        }
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.iter().count(), 0);
        assert_eq!(c.hashed(I0).find(&3), None);
        assert_eq!(c.ordered(I1).first(), None);

        for v in 10..15 {
            let (_, inserted) = c.insert(v);
            assert!(inserted);
        }
        assert_eq!(c.len(), 5);
        assert_tri_invariants(&c);
    }

    #[test]
    fn test_stale_ptr_is_rejected() {
        let mut c = tri_index();
        let (ptr, _) = c.insert(1);
        c.remove(ptr);

        assert_eq!(c.get(ptr), None);
        assert!(!c.contains_ptr(ptr));
        assert_eq!(c.remove(ptr), None);
        assert!(!c.modify(ptr, |_| panic!("mutator must not run")));
        assert!(c.extract(ptr).is_none());
    }

    #[test]
    fn test_churn_across_three_indices() {
        let mut c = tri_index();
        let mut state = 0x9e3779b9_u64;
        for round in 0..1500_i64 {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let v = (state >> 40) as i64 % 128;
            match state % 3 {
                0 => {
                    c.insert(v);
                }
                1 => {
                    if let Some(ptr) = c.hashed(I0).find(&v) {
                        c.remove(ptr);
                    }
                }
                _ => {
                    if let Some(ptr) = c.ordered(I1).find(&v) {
                        // Shift the key; a collision destroys the element,
                        // and the invariants must hold either way.
                        c.modify(ptr, |x| *x = (*x + round) % 128);
                    }
                }
            }
            if round % 100 == 0 {
                assert_tri_invariants(&c);
            }
        }
        assert_tri_invariants(&c);
    }

    #[test]
    fn test_debug_format() {
        let mut c = tri_index();
        c.insert(2);
        c.insert(1);
        assert_eq!(alloc::format!("{c:?}"), "MultiIndex [2, 1]");
    }

    #[test]
    fn test_equality_is_insertion_order() {
        let mut a = tri_index();
        let mut b = tri_index();
        a.insert(1);
        a.insert(2);
        b.insert(2);
        b.insert(1);
        // Same elements, different arrival order.
        assert_ne!(a, b);

        let mut c = tri_index();
        c.insert(1);
        c.insert(2);
        assert_eq!(a, c);
    }
}
