//! Detached element handles.
//!
//! [`MultiIndex::extract`](crate::MultiIndex::extract) pulls an element out
//! of every index and parks it in a [`NodeHandle`]: an owning, move-only
//! holder that can be mutated freely (it belongs to no index while held) and
//! later reinserted into the same or a compatible container. Dropping a
//! non-empty handle drops the element.

/// An element removed from a container but not destroyed.
///
/// # Examples
///
/// ```
/// use weft::{ordered_unique, Identity, MultiIndex};
///
/// let mut set = MultiIndex::new((ordered_unique(Identity),));
/// let (ptr, _) = set.insert(2);
/// set.insert(9);
///
/// let mut handle = set.extract(ptr).unwrap();
/// assert_eq!(set.len(), 1);
/// assert_eq!(handle.value(), Some(&2));
///
/// // The held element is in no index; mutate it directly.
/// *handle.value_mut().unwrap() = 4;
///
/// let outcome = set.insert_handle(handle);
/// assert!(outcome.inserted);
/// assert_eq!(set.get(outcome.ptr), Some(&4));
/// ```
#[derive(Debug, Default)]
pub struct NodeHandle<T> {
    value: Option<T>,
}

impl<T> NodeHandle<T> {
    pub(crate) fn new(value: T) -> Self {
        NodeHandle { value: Some(value) }
    }

    /// A handle holding nothing.
    pub fn empty() -> Self {
        NodeHandle { value: None }
    }

    /// Returns `true` if the handle holds no element.
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Borrows the held element.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Mutably borrows the held element.
    pub fn value_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    /// Consumes the handle, yielding the held element.
    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub(crate) fn take(&mut self) -> Option<T> {
        self.value.take()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_empty_handle() {
        let handle: NodeHandle<i32> = NodeHandle::empty();
        assert!(handle.is_empty());
        assert_eq!(handle.value(), None);
        assert_eq!(handle.into_value(), None);
        assert!(NodeHandle::<i32>::default().is_empty());
    }

    #[test]
    fn test_holds_and_mutates() {
        let mut handle = NodeHandle::new("hello".to_string());
        assert!(!handle.is_empty());
        handle.value_mut().unwrap().push('!');
        assert_eq!(handle.into_value().unwrap(), "hello!");
    }

    #[test]
    fn test_drop_releases_value() {
        let handle = NodeHandle::new(alloc::vec![1, 2, 3]);
        drop(handle);
    }
}
