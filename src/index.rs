//! The cross-index protocol and the tuple machinery that drives it.
//!
//! A container's indices are a tuple of *index states* (tree or table), and
//! every container operation walks that tuple in declaration order:
//!
//! - **insert** is two-phase: every index is probed first (computing an
//!   insertion hint and detecting uniqueness conflicts) and only if all of
//!   them agree does every index splice the node in. A conflict therefore
//!   leaves no trace.
//! - **modify** is reconciled per index: each one decides whether the
//!   mutated element still sorts/hashes where it is, detaches it if not,
//!   re-probes the detached ones, and either commits all re-insertions or
//!   backs the element out of the container entirely.
//!
//! [`IndexCore`] is one index's side of that contract, [`IndexList`] lifts
//! it over a tuple, and [`Nth`] selects one index statically via the
//! position markers [`I0`]..[`I5`]. User code only touches the markers (and
//! the spec tuples accepted by `MultiIndex::new`); the protocol traits are
//! exposed so container types can be named in signatures, but they are not
//! implementable outside the crate because their vocabulary types are
//! private.

use crate::arena::Arena;
use crate::Ptr;

/// Whether an index rejects key-equivalent elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Uniqueness {
    Unique,
    NonUnique,
}

/// One index's side of the cross-index insert/erase/modify protocol.
///
/// Implemented by the ordered (red-black tree) and hashed (bucket table)
/// index states. Not implementable downstream.
pub trait IndexCore<T> {
    /// Placement computed by a successful probe, consumed by `commit`.
    type Hint;
    /// Locator captured before a `modify` runs, enabling O(1) detach even
    /// if the mutation changed the key.
    type Cache;

    /// Extends the per-node slot storage to cover `slots` arena cells.
    #[doc(hidden)]
    fn grow(&mut self, slots: usize);

    /// Locates where the node at `ptr` would be placed. Returns the
    /// conflicting incumbent instead if a uniqueness rule forbids it.
    /// May grow internal storage but must not make observable changes.
    #[doc(hidden)]
    fn probe(&mut self, arena: &Arena<T>, len: usize, ptr: Ptr) -> Result<Self::Hint, Ptr>;

    /// Splices the node at `ptr` into the position recorded by `hint`.
    #[doc(hidden)]
    fn commit(&mut self, arena: &Arena<T>, ptr: Ptr, hint: Self::Hint);

    /// Unlinks the node at `ptr`.
    #[doc(hidden)]
    fn remove(&mut self, ptr: Ptr);

    /// Captures whatever is needed to detach `ptr` in O(1) after a
    /// mutation that may change its key.
    #[doc(hidden)]
    fn pre_modify(&self, arena: &Arena<T>, ptr: Ptr) -> Self::Cache;

    /// After a mutation: detaches `ptr` if its key no longer belongs where
    /// the node sits, returning whether it was detached.
    #[doc(hidden)]
    fn detach_if_displaced(&mut self, arena: &Arena<T>, ptr: Ptr, cache: &Self::Cache) -> bool;

    /// Forgets every node.
    #[doc(hidden)]
    fn clear(&mut self);

    /// An empty index with the same configuration (callables, capacity
    /// hints), used when cloning a container.
    #[doc(hidden)]
    fn fresh(&self) -> Self
    where
        Self: Sized;
}

/// A tuple of index states driven in lock-step by the container.
///
/// Implemented for tuples of [`IndexCore`] states up to arity 6.
pub trait IndexList<T> {
    /// Per-index insertion hints.
    type Hints;
    /// Per-index pre-modify caches.
    type Caches;

    /// Number of indices.
    const LEN: usize;

    /// Extends every index's slot storage to cover `slots` arena cells.
    #[doc(hidden)]
    fn grow(&mut self, slots: usize);

    /// Probes every index in order; `Err` carries the first conflicting
    /// incumbent and guarantees no index was changed observably.
    #[doc(hidden)]
    fn probe(&mut self, arena: &Arena<T>, len: usize, ptr: Ptr) -> Result<Self::Hints, Ptr>;

    /// Commits a fully probed insertion to every index.
    #[doc(hidden)]
    fn commit(&mut self, arena: &Arena<T>, ptr: Ptr, hints: Self::Hints);

    /// Unlinks `ptr` from every index.
    #[doc(hidden)]
    fn remove(&mut self, ptr: Ptr);

    /// Captures every index's pre-modify cache for `ptr`.
    #[doc(hidden)]
    fn pre_modify(&self, arena: &Arena<T>, ptr: Ptr) -> Self::Caches;

    /// Re-files `ptr` after a mutation. Returns `true` if the element is
    /// still admissible (displaced indices re-inserted it); `false` if a
    /// uniqueness conflict arose, in which case the element has been
    /// unlinked from *every* index and the caller must destroy the node.
    #[doc(hidden)]
    fn reconcile(&mut self, arena: &Arena<T>, len: usize, ptr: Ptr, caches: Self::Caches) -> bool;

    /// Forgets every node in every index.
    #[doc(hidden)]
    fn clear(&mut self);

    /// Empty copies of every index, same configuration.
    #[doc(hidden)]
    fn fresh(&self) -> Self
    where
        Self: Sized;
}

/// A spec value (`ordered_unique(..)`, `hashed_unique(..)`, ...) that builds
/// one index state at container construction.
pub trait IndexSpec<T> {
    /// The index state this spec configures.
    type Core: IndexCore<T>;

    /// Consumes the spec, producing an empty index state.
    #[doc(hidden)]
    fn into_core(self) -> Self::Core;
}

/// A tuple of index specs, accepted by `MultiIndex::new`.
pub trait IndexSpecs<T> {
    /// The index-state tuple the specs build.
    type List: IndexList<T>;

    /// Consumes the specs, producing the empty index states.
    #[doc(hidden)]
    fn into_list(self) -> Self::List;
}

/// Statically selects the index at position `P` out of an index tuple.
///
/// `P` is one of the markers [`I0`]..[`I5`]. A user-facing "tag" is just a
/// type alias for a marker: `type ByName = weft::I1;`.
pub trait Nth<P> {
    /// The selected index state.
    type Index;

    /// Borrows the selected index.
    #[doc(hidden)]
    fn nth(&self) -> &Self::Index;

    /// Mutably borrows the selected index.
    #[doc(hidden)]
    fn nth_mut(&mut self) -> &mut Self::Index;
}

/// Position marker for the first index of a container.
#[derive(Debug, Clone, Copy, Default)]
pub struct I0;
/// Position marker for the second index of a container.
#[derive(Debug, Clone, Copy, Default)]
pub struct I1;
/// Position marker for the third index of a container.
#[derive(Debug, Clone, Copy, Default)]
pub struct I2;
/// Position marker for the fourth index of a container.
#[derive(Debug, Clone, Copy, Default)]
pub struct I3;
/// Position marker for the fifth index of a container.
#[derive(Debug, Clone, Copy, Default)]
pub struct I4;
/// Position marker for the sixth index of a container.
#[derive(Debug, Clone, Copy, Default)]
pub struct I5;

macro_rules! impl_nth {
    ($marker:ty, $idx:tt, $sel:ident, ($($t:ident),+)) => {
        impl<$($t),+> Nth<$marker> for ($($t,)+) {
            type Index = $sel;

            fn nth(&self) -> &$sel {
                &self.$idx
            }

            fn nth_mut(&mut self) -> &mut $sel {
                &mut self.$idx
            }
        }
    };
}

impl_nth!(I0, 0, A, (A));

impl_nth!(I0, 0, A, (A, B));
impl_nth!(I1, 1, B, (A, B));

impl_nth!(I0, 0, A, (A, B, C));
impl_nth!(I1, 1, B, (A, B, C));
impl_nth!(I2, 2, C, (A, B, C));

impl_nth!(I0, 0, A, (A, B, C, D));
impl_nth!(I1, 1, B, (A, B, C, D));
impl_nth!(I2, 2, C, (A, B, C, D));
impl_nth!(I3, 3, D, (A, B, C, D));

impl_nth!(I0, 0, A, (A, B, C, D, E));
impl_nth!(I1, 1, B, (A, B, C, D, E));
impl_nth!(I2, 2, C, (A, B, C, D, E));
impl_nth!(I3, 3, D, (A, B, C, D, E));
impl_nth!(I4, 4, E, (A, B, C, D, E));

impl_nth!(I0, 0, A, (A, B, C, D, E, F));
impl_nth!(I1, 1, B, (A, B, C, D, E, F));
impl_nth!(I2, 2, C, (A, B, C, D, E, F));
impl_nth!(I3, 3, D, (A, B, C, D, E, F));
impl_nth!(I4, 4, E, (A, B, C, D, E, F));
impl_nth!(I5, 5, F, (A, B, C, D, E, F));

macro_rules! impl_index_list {
    ($len:expr, $(($t:ident, $i:tt)),+) => {
        impl<T, $($t: IndexCore<T>),+> IndexList<T> for ($($t,)+) {
            type Hints = ($($t::Hint,)+);
            type Caches = ($($t::Cache,)+);

            const LEN: usize = $len;

            fn grow(&mut self, slots: usize) {
                $(self.$i.grow(slots);)+
            }

            fn probe(
                &mut self,
                arena: &Arena<T>,
                len: usize,
                ptr: Ptr,
            ) -> Result<Self::Hints, Ptr> {
                Ok(($(self.$i.probe(arena, len, ptr)?,)+))
            }

            fn commit(&mut self, arena: &Arena<T>, ptr: Ptr, hints: Self::Hints) {
                $(self.$i.commit(arena, ptr, hints.$i);)+
            }

            fn remove(&mut self, ptr: Ptr) {
                $(self.$i.remove(ptr);)+
            }

            fn pre_modify(&self, arena: &Arena<T>, ptr: Ptr) -> Self::Caches {
                ($(self.$i.pre_modify(arena, ptr),)+)
            }

            fn reconcile(
                &mut self,
                arena: &Arena<T>,
                len: usize,
                ptr: Ptr,
                caches: Self::Caches,
            ) -> bool {
                let moved = ($(self.$i.detach_if_displaced(arena, ptr, &caches.$i),)+);
                let mut conflict = false;
                let hints = ($(
                    if moved.$i && !conflict {
                        match self.$i.probe(arena, len, ptr) {
                            Ok(hint) => Some(hint),
                            Err(_) => {
                                conflict = true;
                                None
                            }
                        }
                    } else {
                        None
                    },
                )+);
                if conflict {
                    // The displaced indices already let go of the node; pull
                    // it out of the rest so the caller can destroy it.
                    $(
                        if !moved.$i {
                            self.$i.remove(ptr);
                        }
                    )+
                    return false;
                }
                $(
                    if let Some(hint) = hints.$i {
                        self.$i.commit(arena, ptr, hint);
                    }
                )+
                true
            }

            fn clear(&mut self) {
                $(self.$i.clear();)+
            }

            fn fresh(&self) -> Self {
                ($(self.$i.fresh(),)+)
            }
        }

        impl<T, $($t: IndexSpec<T>),+> IndexSpecs<T> for ($($t,)+) {
            type List = ($($t::Core,)+);

            fn into_list(self) -> Self::List {
                ($(self.$i.into_core(),)+)
            }
        }
    };
}

impl_index_list!(1, (A, 0));
impl_index_list!(2, (A, 0), (B, 1));
impl_index_list!(3, (A, 0), (B, 1), (C, 2));
impl_index_list!(4, (A, 0), (B, 1), (C, 2), (D, 3));
impl_index_list!(5, (A, 0), (B, 1), (C, 2), (D, 3), (E, 4));
impl_index_list!(6, (A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5));
