//! Key extraction and ordering capabilities.
//!
//! An index never looks at a whole element; it looks at the *key* a
//! [`KeyExtractor`] projects out of it, and orders or hashes that key with
//! the capability objects in this module. Extractors return borrowed keys so
//! that `String` fields can be probed with `&str`, unsized keys work, and no
//! key is ever cloned on the hot path.

use core::cmp::Ordering;
use core::marker::PhantomData;

use equivalent::Comparable;

/// Projects a key out of an element.
///
/// Extraction must be deterministic: two calls on the same (unmutated)
/// element must return equal keys, otherwise the indices silently corrupt.
///
/// # Examples
///
/// A field extractor is a unit struct:
///
/// ```
/// use weft::KeyExtractor;
///
/// struct Person {
///     id: u64,
///     name: String,
/// }
///
/// struct ById;
/// impl KeyExtractor<Person> for ById {
///     type Key = u64;
///     fn key<'a>(&self, person: &'a Person) -> &'a u64 {
///         &person.id
///     }
/// }
///
/// struct ByName;
/// impl KeyExtractor<Person> for ByName {
///     type Key = str;
///     fn key<'a>(&self, person: &'a Person) -> &'a str {
///         &person.name
///     }
/// }
/// ```
pub trait KeyExtractor<T> {
    /// The projected key type. May be unsized (`str`, `[u8]`).
    type Key: ?Sized;

    /// Borrows the key out of `value`.
    fn key<'a>(&self, value: &'a T) -> &'a Self::Key;
}

/// The extractor that uses the whole element as its own key.
///
/// # Examples
///
/// ```
/// use weft::{ordered_unique, Identity, MultiIndex};
///
/// let mut set = MultiIndex::new((ordered_unique(Identity),));
/// set.insert(3);
/// set.insert(1);
/// let sorted: Vec<i32> = set.ordered(weft::I0).iter().copied().collect();
/// assert_eq!(sorted, [1, 3]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T> KeyExtractor<T> for Identity {
    type Key = T;

    fn key<'a>(&self, value: &'a T) -> &'a T {
        value
    }
}

/// Adapts a `for<'a> Fn(&'a T) -> &'a K` closure into a [`KeyExtractor`].
///
/// Built with [`key_fn`]; the extra `K` parameter pins down the key type the
/// closure projects.
pub struct KeyFn<F, K: ?Sized> {
    f: F,
    _key: PhantomData<K>,
}

impl<F: Clone, K: ?Sized> Clone for KeyFn<F, K> {
    fn clone(&self) -> Self {
        KeyFn {
            f: self.f.clone(),
            _key: PhantomData,
        }
    }
}

/// Wraps a borrowing closure as a key extractor.
///
/// # Examples
///
/// ```
/// use weft::{key_fn, ordered_unique_by, MultiIndex, Natural, I0};
///
/// let mut pairs = MultiIndex::new((ordered_unique_by(
///     key_fn(|pair: &(u32, char)| &pair.0),
///     Natural,
/// ),));
/// pairs.insert((2, 'b'));
/// pairs.insert((1, 'a'));
/// assert_eq!(pairs.ordered(I0).iter().next(), Some(&(1, 'a')));
/// ```
pub fn key_fn<T, K, F>(f: F) -> KeyFn<F, K>
where
    K: ?Sized,
    F: for<'a> Fn(&'a T) -> &'a K,
{
    KeyFn {
        f,
        _key: PhantomData,
    }
}

impl<T, K, F> KeyExtractor<T> for KeyFn<F, K>
where
    K: ?Sized,
    F: for<'a> Fn(&'a T) -> &'a K,
{
    type Key = K;

    fn key<'a>(&self, value: &'a T) -> &'a K {
        (self.f)(value)
    }
}

/// A strict weak order over keys, used by ordered indices.
///
/// The provided implementations cover the common cases: [`Natural`] (the
/// key's `Ord`), [`Reversed`], and [`CmpFn`] for ad-hoc orders.
pub trait Comparator<K: ?Sized> {
    /// Compares two stored keys in index order.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Compares a probe key of type `Q` against a stored key of type `K`.
///
/// This is the heterogeneous-lookup side of a [`Comparator`]: `find`,
/// bound queries, and `count` accept any `Q` the index comparator can place
/// relative to stored keys. For [`Natural`] and [`Reversed`] that is every
/// `Q: Comparable<K>` (for example `&str` against `String` keys); a
/// [`CmpFn`] comparator only accepts the key type itself.
pub trait CompareKey<Q: ?Sized, K: ?Sized> {
    /// Returns where `probe` sorts relative to `key` in index order.
    fn compare_key(&self, probe: &Q, key: &K) -> Ordering;
}

/// Orders keys by their `Ord` implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Natural;

impl<K: ?Sized + Ord> Comparator<K> for Natural {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<Q, K> CompareKey<Q, K> for Natural
where
    Q: ?Sized + Comparable<K>,
    K: ?Sized,
{
    fn compare_key(&self, probe: &Q, key: &K) -> Ordering {
        probe.compare(key)
    }
}

/// Orders keys by their `Ord` implementation, descending.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reversed;

impl<K: ?Sized + Ord> Comparator<K> for Reversed {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        b.cmp(a)
    }
}

impl<Q, K> CompareKey<Q, K> for Reversed
where
    Q: ?Sized + Comparable<K>,
    K: ?Sized,
{
    fn compare_key(&self, probe: &Q, key: &K) -> Ordering {
        probe.compare(key).reverse()
    }
}

/// Adapts a `Fn(&K, &K) -> Ordering` closure into a [`Comparator`].
///
/// # Examples
///
/// ```
/// use weft::{ordered_unique_by, CmpFn, Identity, MultiIndex, I0};
///
/// // Order by absolute value.
/// let mut set = MultiIndex::new((ordered_unique_by(
///     Identity,
///     CmpFn(|a: &i32, b: &i32| a.abs().cmp(&b.abs())),
/// ),));
/// set.insert(-5);
/// set.insert(2);
/// let order: Vec<i32> = set.ordered(I0).iter().copied().collect();
/// assert_eq!(order, [2, -5]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CmpFn<F>(pub F);

impl<K, F> Comparator<K> for CmpFn<F>
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

impl<K, F> CompareKey<K, K> for CmpFn<F>
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    fn compare_key(&self, probe: &K, key: &K) -> Ordering {
        (self.0)(probe, key)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use super::*;

    struct Pair {
        id: u32,
        name: String,
    }

    struct ByName;
    impl KeyExtractor<Pair> for ByName {
        type Key = str;
        fn key<'a>(&self, value: &'a Pair) -> &'a str {
            &value.name
        }
    }

    #[test]
    fn test_identity_extractor() {
        let value = 42;
        assert_eq!(Identity.key(&value), &42);
    }

    #[test]
    fn test_field_extractor_unsized_key() {
        let pair = Pair {
            id: 1,
            name: "ada".to_string(),
        };
        assert_eq!(ByName.key(&pair), "ada");
        let _ = pair.id;
    }

    #[test]
    fn test_key_fn() {
        let extract = key_fn(|pair: &(u32, char)| &pair.0);
        assert_eq!(extract.key(&(7, 'x')), &7);
    }

    #[test]
    fn test_natural_and_reversed() {
        assert_eq!(Natural.compare(&1, &2), Ordering::Less);
        assert_eq!(Reversed.compare(&1, &2), Ordering::Greater);
        assert_eq!(Natural.compare_key(&1, &1), Ordering::Equal);
        assert_eq!(Reversed.compare_key(&3, &1), Ordering::Less);
    }

    #[test]
    fn test_natural_heterogeneous() {
        let stored = "beta".to_string();
        assert_eq!(Natural.compare_key("alpha", &stored), Ordering::Less);
        assert_eq!(Natural.compare_key("beta", &stored), Ordering::Equal);
    }

    #[test]
    fn test_cmp_fn() {
        let by_abs = CmpFn(|a: &i32, b: &i32| a.abs().cmp(&b.abs()));
        assert_eq!(by_abs.compare(&-5, &2), Ordering::Greater);
        assert_eq!(by_abs.compare_key(&-2, &2), Ordering::Equal);
    }
}
