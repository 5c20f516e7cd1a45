//! Hashed (separate-chaining) indices and their views.
//!
//! A hashed index owns a power-of-two bucket array of chain heads and one
//! slot per node (the chain link plus the cached hash of the element's key).
//! Chains are LIFO: the most recently inserted element of a bucket is its
//! head. The cached hash makes rehashing a pure re-chaining pass and turns
//! the post-`modify` "did the key change" test into an integer compare.
//!
//! The bucket array is sized lazily on first insert (2048 buckets unless the
//! spec carries a hint) and doubles whenever the container's size reaches
//! 0.8 of the bucket count. `clear` keeps the allocated bucket array.

use alloc::vec;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;

use equivalent::Equivalent;

use crate::arena::Arena;
use crate::container::{HandleInsert, MultiIndex};
use crate::handle::NodeHandle;
use crate::index::{IndexCore, IndexList, IndexSpec, Nth, Uniqueness};
use crate::key::KeyExtractor;
use crate::{Ptr, RandomState};

/// Bucket count used when a hashed spec carries no hint.
const FIRST_BUCKET_COUNT: usize = 2048;

/// Spec for a hashed index that rejects key-equivalent elements.
///
/// Build one with [`hashed_unique`] or [`hashed_unique_with`].
#[derive(Debug, Clone)]
pub struct HashedUnique<E, S = RandomState> {
    extract: E,
    build: S,
    buckets: usize,
}

/// Spec for a hashed index that admits key-equivalent elements.
///
/// Build one with [`hashed_non_unique`] or [`hashed_non_unique_with`].
#[derive(Debug, Clone)]
pub struct HashedNonUnique<E, S = RandomState> {
    extract: E,
    build: S,
    buckets: usize,
}

/// A hashed-unique index over the keys `extract` projects, using the
/// default hasher.
pub fn hashed_unique<E>(extract: E) -> HashedUnique<E, RandomState> {
    HashedUnique {
        extract,
        build: RandomState::default(),
        buckets: FIRST_BUCKET_COUNT,
    }
}

/// A hashed-unique index with an explicit hasher and an initial bucket-count
/// hint (rounded up to a power of two).
pub fn hashed_unique_with<E, S>(extract: E, build: S, buckets: usize) -> HashedUnique<E, S> {
    HashedUnique {
        extract,
        build,
        buckets,
    }
}

/// A hashed-non-unique index over the keys `extract` projects, using the
/// default hasher.
pub fn hashed_non_unique<E>(extract: E) -> HashedNonUnique<E, RandomState> {
    HashedNonUnique {
        extract,
        build: RandomState::default(),
        buckets: FIRST_BUCKET_COUNT,
    }
}

/// A hashed-non-unique index with an explicit hasher and an initial
/// bucket-count hint (rounded up to a power of two).
pub fn hashed_non_unique_with<E, S>(extract: E, build: S, buckets: usize) -> HashedNonUnique<E, S> {
    HashedNonUnique {
        extract,
        build,
        buckets,
    }
}

impl<T, E, S> IndexSpec<T> for HashedUnique<E, S>
where
    E: KeyExtractor<T> + Clone,
    E::Key: Hash + Eq,
    S: BuildHasher + Clone,
{
    type Core = HashedCore<E, S>;

    fn into_core(self) -> Self::Core {
        HashedCore::new(self.extract, self.build, Uniqueness::Unique, self.buckets)
    }
}

impl<T, E, S> IndexSpec<T> for HashedNonUnique<E, S>
where
    E: KeyExtractor<T> + Clone,
    E::Key: Hash + Eq,
    S: BuildHasher + Clone,
{
    type Core = HashedCore<E, S>;

    fn into_core(self) -> Self::Core {
        HashedCore::new(self.extract, self.build, Uniqueness::NonUnique, self.buckets)
    }
}

#[derive(Debug, Clone, Copy)]
struct HashSlot {
    next: Ptr,
    hash: u64,
}

impl Default for HashSlot {
    fn default() -> Self {
        HashSlot {
            next: Ptr::null(),
            hash: 0,
        }
    }
}

/// Placement computed by a probe: the key's hash and its target bucket.
#[doc(hidden)]
#[derive(Debug, Clone, Copy)]
pub struct BucketHint {
    hash: u64,
    bucket: usize,
}

/// Chain locator captured before a `modify`, good for one O(1) unlink even
/// if the mutation changed the key (and therefore the bucket).
#[doc(hidden)]
#[derive(Debug, Clone, Copy)]
pub struct ChainCache {
    bucket: usize,
    prev: Ptr,
}

/// The state of one hashed index: bucket array, per-node chain slots, and
/// the key/hash capabilities.
///
/// This type only appears in `Nth<P, Index = HashedCore<..>>` bounds; go
/// through [`HashedView`] / [`HashedViewMut`] instead.
pub struct HashedCore<E, S> {
    extract: E,
    build: S,
    pub(crate) unique: Uniqueness,
    initial_buckets: usize,
    buckets: Vec<Ptr>,
    slots: Vec<HashSlot>,
}

impl<E, S> HashedCore<E, S> {
    fn new(extract: E, build: S, unique: Uniqueness, bucket_hint: usize) -> Self {
        HashedCore {
            extract,
            build,
            unique,
            initial_buckets: bucket_hint.next_power_of_two().max(1),
            buckets: Vec::new(),
            slots: Vec::new(),
        }
    }

    fn hs(&self, ptr: Ptr) -> &HashSlot {
        &self.slots[ptr.unchecked_get()]
    }

    fn hs_mut(&mut self, ptr: Ptr) -> &mut HashSlot {
        &mut self.slots[ptr.unchecked_get()]
    }

    fn bucket_of(&self, hash: u64) -> usize {
        debug_assert!(self.buckets.len().is_power_of_two());
        (hash & (self.buckets.len() as u64 - 1)) as usize
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Re-chains every node by its cached hash; keys are not re-hashed.
    fn rehash(&mut self, new_count: usize) {
        debug_assert!(new_count.is_power_of_two());
        let mut new_buckets = vec![Ptr::null(); new_count];
        let old = core::mem::take(&mut self.buckets);
        for head in old {
            let mut cur = head;
            while !cur.is_null() {
                let slot = *self.hs(cur);
                let bucket = (slot.hash & (new_count as u64 - 1)) as usize;
                self.hs_mut(cur).next = new_buckets[bucket];
                new_buckets[bucket] = cur;
                cur = slot.next;
            }
        }
        self.buckets = new_buckets;
    }

    /// First element in bucket order, or null.
    pub(crate) fn first_in_table(&self) -> Ptr {
        for &head in &self.buckets {
            if !head.is_null() {
                return head;
            }
        }
        Ptr::null()
    }

    /// Successor of `ptr` in bucket order: rest of its chain, then the next
    /// non-empty bucket.
    pub(crate) fn next_in_table(&self, ptr: Ptr) -> Ptr {
        let slot = self.hs(ptr);
        if !slot.next.is_null() {
            return slot.next;
        }
        for bucket in self.bucket_of(slot.hash) + 1..self.buckets.len() {
            if !self.buckets[bucket].is_null() {
                return self.buckets[bucket];
            }
        }
        Ptr::null()
    }

    fn key<'v, T>(&self, arena: &'v Arena<T>, ptr: Ptr) -> &'v E::Key
    where
        E: KeyExtractor<T>,
    {
        self.extract.key(&arena[ptr])
    }

    /// Some element whose key is equivalent to `probe`, or null.
    pub(crate) fn find_in<T, Q>(&self, arena: &Arena<T>, probe: &Q) -> Ptr
    where
        E: KeyExtractor<T>,
        S: BuildHasher,
        Q: ?Sized + Hash + Equivalent<E::Key>,
    {
        if self.buckets.is_empty() {
            return Ptr::null();
        }
        let hash = self.build.hash_one(probe);
        let mut cur = self.buckets[self.bucket_of(hash)];
        while !cur.is_null() {
            let slot = self.hs(cur);
            if slot.hash == hash && probe.equivalent(self.key(arena, cur)) {
                return cur;
            }
            cur = slot.next;
        }
        Ptr::null()
    }

    /// Number of elements with keys equivalent to `probe`.
    pub(crate) fn count_in<T, Q>(&self, arena: &Arena<T>, probe: &Q) -> usize
    where
        E: KeyExtractor<T>,
        S: BuildHasher,
        Q: ?Sized + Hash + Equivalent<E::Key>,
    {
        if self.buckets.is_empty() {
            return 0;
        }
        let hash = self.build.hash_one(probe);
        let mut count = 0;
        let mut cur = self.buckets[self.bucket_of(hash)];
        while !cur.is_null() {
            let slot = self.hs(cur);
            if slot.hash == hash && probe.equivalent(self.key(arena, cur)) {
                count += 1;
                if self.unique == Uniqueness::Unique {
                    break;
                }
            }
            cur = slot.next;
        }
        count
    }

    /// Every element with a key equivalent to `probe`. Equivalent keys hash
    /// alike, so one chain holds them all.
    pub(crate) fn equivalents_in<T, Q>(&self, arena: &Arena<T>, probe: &Q) -> Vec<Ptr>
    where
        E: KeyExtractor<T>,
        S: BuildHasher,
        Q: ?Sized + Hash + Equivalent<E::Key>,
    {
        let mut found = Vec::new();
        if self.buckets.is_empty() {
            return found;
        }
        let hash = self.build.hash_one(probe);
        let mut cur = self.buckets[self.bucket_of(hash)];
        while !cur.is_null() {
            let slot = self.hs(cur);
            if slot.hash == hash && probe.equivalent(self.key(arena, cur)) {
                found.push(cur);
                if self.unique == Uniqueness::Unique {
                    break;
                }
            }
            cur = slot.next;
        }
        found
    }
}

impl<T, E, S> IndexCore<T> for HashedCore<E, S>
where
    E: KeyExtractor<T> + Clone,
    E::Key: Hash + Eq,
    S: BuildHasher + Clone,
{
    type Hint = BucketHint;
    type Cache = ChainCache;

    fn grow(&mut self, slots: usize) {
        if self.slots.len() < slots {
            self.slots.resize(slots, HashSlot::default());
        }
    }

    fn probe(&mut self, arena: &Arena<T>, len: usize, ptr: Ptr) -> Result<BucketHint, Ptr> {
        let key = self.extract.key(&arena[ptr]);
        let hash = self.build.hash_one(key);

        if self.buckets.is_empty() {
            self.buckets = vec![Ptr::null(); self.initial_buckets];
        } else if len * 5 >= self.buckets.len() * 4 {
            // 0.8 load factor; double before this insert lands.
            let doubled = self.buckets.len() * 2;
            self.rehash(doubled);
        }

        let bucket = self.bucket_of(hash);
        if self.unique == Uniqueness::Unique {
            let mut cur = self.buckets[bucket];
            while !cur.is_null() {
                let slot = self.hs(cur);
                if slot.hash == hash && self.key(arena, cur) == key {
                    return Err(cur);
                }
                cur = slot.next;
            }
        }
        Ok(BucketHint { hash, bucket })
    }

    fn commit(&mut self, _arena: &Arena<T>, ptr: Ptr, hint: BucketHint) {
        let head = self.buckets[hint.bucket];
        *self.hs_mut(ptr) = HashSlot {
            next: head,
            hash: hint.hash,
        };
        self.buckets[hint.bucket] = ptr;
    }

    fn remove(&mut self, ptr: Ptr) {
        if self.buckets.is_empty() {
            return;
        }
        let bucket = self.bucket_of(self.hs(ptr).hash);
        let mut cur = self.buckets[bucket];
        let mut prev = Ptr::null();
        while !cur.is_null() {
            if cur == ptr {
                let next = self.hs(cur).next;
                if prev.is_null() {
                    self.buckets[bucket] = next;
                } else {
                    self.hs_mut(prev).next = next;
                }
                return;
            }
            prev = cur;
            cur = self.hs(cur).next;
        }
        debug_assert!(false, "node missing from its bucket chain");
    }

    fn pre_modify(&self, _arena: &Arena<T>, ptr: Ptr) -> ChainCache {
        let bucket = self.bucket_of(self.hs(ptr).hash);
        let mut cur = self.buckets[bucket];
        let mut prev = Ptr::null();
        while !cur.is_null() && cur != ptr {
            prev = cur;
            cur = self.hs(cur).next;
        }
        debug_assert!(!cur.is_null(), "node missing from its bucket chain");
        ChainCache { bucket, prev }
    }

    fn detach_if_displaced(&mut self, arena: &Arena<T>, ptr: Ptr, cache: &ChainCache) -> bool {
        let key = self.extract.key(&arena[ptr]);
        if self.build.hash_one(key) == self.hs(ptr).hash {
            return false;
        }
        let next = self.hs(ptr).next;
        if cache.prev.is_null() {
            self.buckets[cache.bucket] = next;
        } else {
            self.hs_mut(cache.prev).next = next;
        }
        true
    }

    fn clear(&mut self) {
        // Keep the allocated bucket array; just empty the chains.
        for bucket in &mut self.buckets {
            *bucket = Ptr::null();
        }
    }

    fn fresh(&self) -> Self {
        HashedCore::new(
            self.extract.clone(),
            self.build.clone(),
            self.unique,
            self.initial_buckets,
        )
    }
}

/// A read-only view of one hashed index.
///
/// Obtained from [`MultiIndex::hashed`]. Lookups accept any
/// `Q: Hash + Equivalent<Key>` probe (for example `&str` against `String`
/// keys), under the usual contract that equivalent values hash identically.
pub struct HashedView<'c, T, E, S> {
    pub(crate) arena: &'c Arena<T>,
    pub(crate) core: &'c HashedCore<E, S>,
}

impl<'c, T, E, S> HashedView<'c, T, E, S>
where
    E: KeyExtractor<T>,
    S: BuildHasher,
{
    /// The element behind `ptr`, if it is live.
    pub fn get(&self, ptr: Ptr) -> Option<&'c T> {
        self.arena.get(ptr)
    }

    /// Some element with a key equivalent to `probe`.
    pub fn find<Q>(&self, probe: &Q) -> Option<Ptr>
    where
        Q: ?Sized + Hash + Equivalent<E::Key>,
    {
        self.core.find_in(self.arena, probe).optional()
    }

    /// Returns `true` if some element's key is equivalent to `probe`.
    pub fn contains<Q>(&self, probe: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<E::Key>,
    {
        self.find(probe).is_some()
    }

    /// Number of elements with keys equivalent to `probe`.
    pub fn count<Q>(&self, probe: &Q) -> usize
    where
        Q: ?Sized + Hash + Equivalent<E::Key>,
    {
        self.core.count_in(self.arena, probe)
    }

    /// Current bucket-array length (zero until the first insert).
    pub fn bucket_count(&self) -> usize {
        self.core.bucket_count()
    }

    /// Iterates every element in bucket order (ascending bucket, then LIFO
    /// within each chain).
    pub fn iter(&self) -> HashedIter<'c, T, E, S> {
        HashedIter {
            arena: self.arena,
            core: self.core,
            cur: self.core.first_in_table(),
        }
    }
}

impl<'c, T, E, S> Clone for HashedView<'c, T, E, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'c, T, E, S> Copy for HashedView<'c, T, E, S> {}

/// A forward iterator over a hashed index, in bucket order.
pub struct HashedIter<'a, T, E, S> {
    arena: &'a Arena<T>,
    core: &'a HashedCore<E, S>,
    cur: Ptr,
}

impl<'a, T, E, S> Iterator for HashedIter<'a, T, E, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let cur = self.cur.optional()?;
        self.cur = self.core.next_in_table(cur);
        Some(&self.arena[cur])
    }
}

impl<'a, T, E, S> Clone for HashedIter<'a, T, E, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T, E, S> Copy for HashedIter<'a, T, E, S> {}

/// A mutable view of one hashed index.
///
/// Obtained from [`MultiIndex::hashed_mut`]. Every mutating operation goes
/// through the container, so all other indices stay consistent.
pub struct HashedViewMut<'c, T, L, P> {
    pub(crate) cont: &'c mut MultiIndex<T, L>,
    pub(crate) _pos: PhantomData<P>,
}

impl<'c, T, L, P, E, S> HashedViewMut<'c, T, L, P>
where
    L: IndexList<T> + Nth<P, Index = HashedCore<E, S>>,
    E: KeyExtractor<T>,
    S: BuildHasher,
{
    /// Reborrows as a read-only view.
    pub fn as_view(&self) -> HashedView<'_, T, E, S> {
        HashedView {
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
    /// and the successor in *this* index's bucket order.
    pub fn remove(&mut self, ptr: Ptr) -> Option<(T, Option<Ptr>)> {
        if !self.cont.contains_ptr(ptr) {
            return None;
        }
        let next = self.cont.indices().nth().next_in_table(ptr).optional();
        let value = self.cont.remove(ptr)?;
        Some((value, next))
    }

    /// Removes every element whose key is equivalent to `probe`, returning
    /// how many were removed. A unique index removes at most one.
    pub fn remove_key<Q>(&mut self, probe: &Q) -> usize
    where
        Q: ?Sized + Hash + Equivalent<E::Key>,
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

    /// See [`HashedView::find`].
    pub fn find<Q>(&self, probe: &Q) -> Option<Ptr>
    where
        Q: ?Sized + Hash + Equivalent<E::Key>,
    {
        self.as_view().find(probe)
    }

    /// See [`HashedView::count`].
    pub fn count<Q>(&self, probe: &Q) -> usize
    where
        Q: ?Sized + Hash + Equivalent<E::Key>,
    {
        self.as_view().count(probe)
    }

    /// See [`HashedView::bucket_count`].
    pub fn bucket_count(&self) -> usize {
        self.as_view().bucket_count()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use core::hash::Hasher;

    use crate::container::MultiIndex;
    use crate::index::I0;
    use crate::key::Identity;

    use super::*;

    #[test]
    fn test_insert_and_find() {
        let mut set = MultiIndex::new((hashed_unique(Identity),));
        for v in 0..32i64 {
            let (_, inserted) = set.insert(v);
            assert!(inserted);
        }
        let view = set.hashed(I0);
        for v in 0..32i64 {
            let ptr = view.find(&v).unwrap();
            assert_eq!(view.get(ptr), Some(&v));
        }
        assert_eq!(view.find(&99), None);
        assert!(!view.contains(&99));
    }

    #[test]
    fn test_unique_rejects_duplicates() {
        let mut set = MultiIndex::new((hashed_unique(Identity),));
        let (first, inserted) = set.insert(5i64);
        assert!(inserted);
        let (conflict, inserted) = set.insert(5);
        assert!(!inserted);
        assert_eq!(conflict, first);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_non_unique_counts() {
        let mut bag = MultiIndex::new((hashed_non_unique(Identity),));
        for v in [7i64, 7, 7, 3] {
            let (_, inserted) = bag.insert(v);
            assert!(inserted);
        }
        let view = bag.hashed(I0);
        assert_eq!(view.count(&7), 3);
        assert_eq!(view.count(&3), 1);
        assert_eq!(view.count(&8), 0);
        assert_eq!(bag.len(), 4);
    }

    #[test]
    fn test_growth_keeps_everything_findable() {
        let mut set =
            MultiIndex::new((hashed_unique_with(Identity, RandomState::default(), 4),));
        for v in 0..100i64 {
            set.insert(v);
            for probe in 0..=v {
                assert!(set.hashed(I0).contains(&probe), "lost {probe} at size {v}");
            }
            assert_eq!(set.len(), (v + 1) as usize);
        }
        // Smallest power of two keeping the load factor under 0.8.
        assert_eq!(set.hashed(I0).bucket_count(), 128);
    }

    #[test]
    fn test_bucket_hint_rounds_up() {
        let mut set =
            MultiIndex::new((hashed_unique_with(Identity, RandomState::default(), 3),));
        set.insert(1i64);
        assert_eq!(set.hashed(I0).bucket_count(), 4);
    }

    /// Hasher that sends every key to one bucket, forcing chain collisions.
    #[derive(Clone, Default)]
    struct Clash;

    struct ClashHasher;

    impl Hasher for ClashHasher {
        fn finish(&self) -> u64 {
            0
        }
        fn write(&mut self, _bytes: &[u8]) {}
    }

    impl BuildHasher for Clash {
        type Hasher = ClashHasher;
        fn build_hasher(&self) -> ClashHasher {
            ClashHasher
        }
    }

    #[test]
    fn test_single_bucket_chains() {
        // Big enough that no growth rehash re-chains the bucket mid-test.
        let mut set = MultiIndex::new((hashed_unique_with(Identity, Clash, 32),));
        for v in 0..16i64 {
            let (_, inserted) = set.insert(v);
            assert!(inserted);
        }
        let view = set.hashed(I0);
        for v in 0..16i64 {
            assert!(view.contains(&v));
        }
        let (_, inserted) = set.insert(7);
        assert!(!inserted);

        // LIFO within the one chain: newest first.
        let order: Vec<i64> = set.hashed(I0).iter().copied().collect();
        assert_eq!(order, (0..16i64).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_iter_covers_all() {
        let mut set = MultiIndex::new((hashed_unique(Identity),));
        for v in 0..50i64 {
            set.insert(v);
        }
        let mut seen: Vec<i64> = set.hashed(I0).iter().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_remove_by_ptr_reports_successor() {
        let mut set = MultiIndex::new((hashed_unique_with(Identity, Clash, 8),));
        for v in [1i64, 2, 3] {
            set.insert(v);
        }
        // Chain is 3 -> 2 -> 1; removing 2 should report 1 as successor.
        let mut view = set.hashed_mut(I0);
        let ptr = view.find(&2).unwrap();
        let (value, next) = view.remove(ptr).unwrap();
        assert_eq!(value, 2);
        assert_eq!(view.as_view().get(next.unwrap()), Some(&1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_key() {
        let mut bag = MultiIndex::new((hashed_non_unique(Identity),));
        for v in [5i64, 5, 5, 2] {
            bag.insert(v);
        }
        assert_eq!(bag.hashed_mut(I0).remove_key(&5), 3);
        assert_eq!(bag.hashed_mut(I0).remove_key(&9), 0);
        assert_eq!(bag.len(), 1);
        assert!(bag.hashed(I0).contains(&2));
    }

    #[test]
    fn test_heterogeneous_lookup() {
        struct Whole;
        impl KeyExtractor<String> for Whole {
            type Key = str;
            fn key<'a>(&self, value: &'a String) -> &'a str {
                value
            }
        }
        impl Clone for Whole {
            fn clone(&self) -> Self {
                Whole
            }
        }

        let mut set = MultiIndex::new((hashed_unique(Whole),));
        set.insert("alpha".to_string());
        set.insert("beta".to_string());
        let view = set.hashed(I0);
        assert!(view.contains("alpha"));
        assert_eq!(view.get(view.find("beta").unwrap()), Some(&"beta".to_string()));
        assert_eq!(view.count("gamma"), 0);
    }

    #[test]
    fn test_clear_keeps_bucket_array() {
        let mut set = MultiIndex::new((hashed_unique_with(Identity, RandomState::default(), 8),));
        for v in 0..5i64 {
            set.insert(v);
        }
        let buckets = set.hashed(I0).bucket_count();
        set.clear();
        assert_eq!(set.len(), 0);
        assert_eq!(set.hashed(I0).bucket_count(), buckets);
        assert_eq!(set.hashed(I0).find(&3), None);

        set.insert(3);
        assert!(set.hashed(I0).contains(&3));
    }
}
