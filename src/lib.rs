#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

extern crate alloc;

mod arena;
pub mod container;
pub mod handle;
pub mod hashed;
pub mod index;
pub mod key;
pub mod ordered;

use core::num::NonZeroU32;

/// The hash builder used by hashed indices unless one is supplied.
///
/// `std` builds use the standard library's SipHash-backed `RandomState`;
/// `no_std` builds fall back to `hashbrown`'s default hasher.
#[cfg(feature = "std")]
pub type RandomState = std::hash::RandomState;
/// The hash builder used by hashed indices unless one is supplied.
#[cfg(not(feature = "std"))]
pub type RandomState = hashbrown::DefaultHashBuilder;

pub use container::{HandleInsert, IntoIter, Iter, MultiIndex};
pub use handle::NodeHandle;
pub use hashed::{
    hashed_non_unique, hashed_non_unique_with, hashed_unique, hashed_unique_with, HashedCore,
    HashedIter, HashedNonUnique, HashedUnique, HashedView, HashedViewMut,
};
pub use index::{I0, I1, I2, I3, I4, I5};
pub use key::{
    key_fn, CmpFn, CompareKey, Comparator, Identity, KeyExtractor, KeyFn, Natural, Reversed,
};
pub use ordered::{
    ordered_non_unique, ordered_non_unique_by, ordered_unique, ordered_unique_by, OrderedCore,
    OrderedIter, OrderedNonUnique, OrderedUnique, OrderedView, OrderedViewMut,
};

/// A compact handle to an element stored in a [`MultiIndex`].
///
/// Every element lives in exactly one arena node, and `Ptr` names that node.
/// The same `Ptr` is valid with every index of the owning container: a handle
/// found through a hashed index can be fed straight to an ordered view's
/// traversal methods. Handles are **non-generational**: once the element is
/// removed, its `Ptr` may be reused by a later insertion, so do not assume
/// temporal uniqueness. Using a stale `Ptr` returns `None` from checked
/// accessors and panics on direct indexing.
///
/// # Examples
///
/// ```
/// use weft::{ordered_unique, Identity, MultiIndex};
///
/// let mut set = MultiIndex::new((ordered_unique(Identity),));
/// let (ptr, inserted) = set.insert(7);
/// assert!(inserted);
/// assert_eq!(set.get(ptr), Some(&7));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Ptr(NonZeroU32);

const NULL_REPR: NonZeroU32 = NonZeroU32::MAX;

impl Ptr {
    pub(crate) fn unchecked_from(index: usize) -> Self {
        debug_assert!(index < (u32::MAX - 1) as usize, "arena index overflows Ptr");
        // SAFETY: index + 1 cannot be zero for any index below u32::MAX.
        Ptr(unsafe { NonZeroU32::new_unchecked(index as u32 + 1) })
    }

    pub(crate) fn unchecked_get(self) -> usize {
        self.0.get() as usize - 1
    }

    /// The reserved handle that refers to no element.
    pub const fn null() -> Self {
        Ptr(NULL_REPR)
    }

    /// Returns `true` if this is the reserved null handle.
    pub fn is_null(self) -> bool {
        self.0 == NULL_REPR
    }

    /// Converts the handle into `Option` form, mapping null to `None`.
    pub fn optional(self) -> Option<Ptr> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }
}

impl Default for Ptr {
    fn default() -> Self {
        Ptr::null()
    }
}

impl core::fmt::Debug for Ptr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_null() {
            write!(f, "Ptr(null)")
        } else {
            write!(f, "Ptr({})", self.unchecked_get())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ptr_roundtrip() {
        for index in [0usize, 1, 2, 1000, 65535] {
            let ptr = Ptr::unchecked_from(index);
            assert!(!ptr.is_null());
            assert_eq!(ptr.unchecked_get(), index);
            assert_eq!(ptr.optional(), Some(ptr));
        }
    }

    #[test]
    fn test_ptr_null() {
        let null = Ptr::null();
        assert!(null.is_null());
        assert_eq!(null.optional(), None);
        assert_eq!(Ptr::default(), null);
    }

    #[test]
    fn test_ptr_is_niche_sized() {
        assert_eq!(
            core::mem::size_of::<Option<Ptr>>(),
            core::mem::size_of::<Ptr>()
        );
    }

    #[test]
    fn test_ptr_debug() {
        let ptr = Ptr::unchecked_from(5);
        assert_eq!(alloc::format!("{ptr:?}"), "Ptr(5)");
        assert_eq!(alloc::format!("{:?}", Ptr::null()), "Ptr(null)");
    }
}
