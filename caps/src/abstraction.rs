//! The [`Comparer`] and [`Equivalence`] traits.
use std::{cmp::Ordering, hash::Hash, rc::Rc, sync::Arc};

use collkit_util::hash::hash_ref;

/// A total order on values of type `T`.
///
/// Implementations must be antisymmetric and transitive, and must compare every value as equal
/// to itself. This is not checked.
pub trait Comparer<T: ?Sized> {
    /// Compares two values.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// An equivalence relation on values of type `T` together with a compatible hash function.
///
/// Values that are [`equals`][Self::equals] must have the same [`hash`][Self::hash].
pub trait Equivalence<T: ?Sized> {
    /// Returns `true` when the two values are equivalent.
    fn equals(&self, a: &T, b: &T) -> bool;
    /// Returns the hash of a value.
    fn hash(&self, value: &T) -> u64;
}

macro_rules! forward_impls {
    ($($wrapper:ident<$c:ident>),*) => {$(
        impl<T: ?Sized, $c: Comparer<T> + ?Sized> Comparer<T> for $wrapper<$c> {
            #[inline(always)]
            fn compare(&self, a: &T, b: &T) -> Ordering {
                (**self).compare(a, b)
            }
        }

        impl<T: ?Sized, $c: Equivalence<T> + ?Sized> Equivalence<T> for $wrapper<$c> {
            #[inline(always)]
            fn equals(&self, a: &T, b: &T) -> bool {
                (**self).equals(a, b)
            }
            #[inline(always)]
            fn hash(&self, value: &T) -> u64 {
                (**self).hash(value)
            }
        }
    )*};
}

forward_impls!(Box<C>, Rc<C>, Arc<C>);

impl<T: ?Sized, C: Comparer<T> + ?Sized> Comparer<T> for &C {
    #[inline(always)]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (**self).compare(a, b)
    }
}

impl<T: ?Sized, C: Equivalence<T> + ?Sized> Equivalence<T> for &C {
    #[inline(always)]
    fn equals(&self, a: &T, b: &T) -> bool {
        (**self).equals(a, b)
    }
    #[inline(always)]
    fn hash(&self, value: &T) -> u64 {
        (**self).hash(value)
    }
}

/// Orders and compares values using their own [`Ord`], [`Eq`] and [`Hash`] implementations.
///
/// Hashing uses collkit's default hasher, see [`collkit_util::hash`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct Natural;

impl<T: Ord + ?Sized> Comparer<T> for Natural {
    #[inline(always)]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T: Eq + Hash + ?Sized> Equivalence<T> for Natural {
    #[inline(always)]
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
    #[inline(always)]
    fn hash(&self, value: &T) -> u64 {
        hash_ref(value)
    }
}
