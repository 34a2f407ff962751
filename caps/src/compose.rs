//! Composition of abstractions for compound keys.
use std::{cmp::Ordering, fmt};

use collkit_util::hash::combine_hashes;

use crate::{Comparer, Equivalence};

/// A [`Comparer`] that calls a comparison function.
///
/// The function is trusted to implement a total order.
#[derive(Clone, Copy)]
pub struct FnComparer<F>(F);

impl<F> fmt::Debug for FnComparer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnComparer(..)")
    }
}

/// Returns a [`Comparer`] that calls the given comparison function.
pub fn from_fn<T: ?Sized, F: Fn(&T, &T) -> Ordering>(compare: F) -> FnComparer<F> {
    FnComparer(compare)
}

impl<T: ?Sized, F: Fn(&T, &T) -> Ordering> Comparer<T> for FnComparer<F> {
    #[inline(always)]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.0)(a, b)
    }
}

/// Lifts an abstraction for keys to `(key, value)` pairs by ignoring the value.
///
/// Two pairs with equivalent keys compare equal no matter their values. This is what key based
/// containers storing pairs need.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct KeyOnly<C>(pub C);

/// Returns a [`KeyOnly`] abstraction for pairs, wrapping the given abstraction for keys.
pub fn key_only<C>(key: C) -> KeyOnly<C> {
    KeyOnly(key)
}

impl<K, V, C: Comparer<K>> Comparer<(K, V)> for KeyOnly<C> {
    #[inline(always)]
    fn compare(&self, a: &(K, V), b: &(K, V)) -> Ordering {
        self.0.compare(&a.0, &b.0)
    }
}

impl<K, V, C: Equivalence<K>> Equivalence<(K, V)> for KeyOnly<C> {
    #[inline(always)]
    fn equals(&self, a: &(K, V), b: &(K, V)) -> bool {
        self.0.equals(&a.0, &b.0)
    }
    #[inline(always)]
    fn hash(&self, value: &(K, V)) -> u64 {
        self.0.hash(&value.0)
    }
}

/// Orders pairs by their first component, using the second component to break ties.
///
/// As an [`Equivalence`], two pairs are equal when both components are.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct Lexicographic<A, B> {
    /// The abstraction for the first component.
    pub first: A,
    /// The abstraction for the second component.
    pub second: B,
}

/// Returns a [`Lexicographic`] abstraction for pairs.
pub fn lexicographic<A, B>(first: A, second: B) -> Lexicographic<A, B> {
    Lexicographic { first, second }
}

impl<X, Y, A: Comparer<X>, B: Comparer<Y>> Comparer<(X, Y)> for Lexicographic<A, B> {
    #[inline]
    fn compare(&self, a: &(X, Y), b: &(X, Y)) -> Ordering {
        match self.first.compare(&a.0, &b.0) {
            Ordering::Equal => self.second.compare(&a.1, &b.1),
            unequal => unequal,
        }
    }
}

impl<X, Y, A: Equivalence<X>, B: Equivalence<Y>> Equivalence<(X, Y)> for Lexicographic<A, B> {
    #[inline]
    fn equals(&self, a: &(X, Y), b: &(X, Y)) -> bool {
        self.first.equals(&a.0, &b.0) && self.second.equals(&a.1, &b.1)
    }
    #[inline]
    fn hash(&self, value: &(X, Y)) -> u64 {
        combine_hashes(self.first.hash(&value.0), self.second.hash(&value.1))
    }
}

/// Orders triples by their first, then second, then third component.
///
/// As an [`Equivalence`], two triples are equal when all components are.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct Lexicographic3<A, B, C> {
    /// The abstraction for the first component.
    pub first: A,
    /// The abstraction for the second component.
    pub second: B,
    /// The abstraction for the third component.
    pub third: C,
}

/// Returns a [`Lexicographic3`] abstraction for triples.
pub fn lexicographic3<A, B, C>(first: A, second: B, third: C) -> Lexicographic3<A, B, C> {
    Lexicographic3 {
        first,
        second,
        third,
    }
}

impl<X, Y, Z, A, B, C> Comparer<(X, Y, Z)> for Lexicographic3<A, B, C>
where
    A: Comparer<X>,
    B: Comparer<Y>,
    C: Comparer<Z>,
{
    #[inline]
    fn compare(&self, a: &(X, Y, Z), b: &(X, Y, Z)) -> Ordering {
        match self.first.compare(&a.0, &b.0) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        match self.second.compare(&a.1, &b.1) {
            Ordering::Equal => self.third.compare(&a.2, &b.2),
            unequal => unequal,
        }
    }
}

impl<X, Y, Z, A, B, C> Equivalence<(X, Y, Z)> for Lexicographic3<A, B, C>
where
    A: Equivalence<X>,
    B: Equivalence<Y>,
    C: Equivalence<Z>,
{
    #[inline]
    fn equals(&self, a: &(X, Y, Z), b: &(X, Y, Z)) -> bool {
        self.first.equals(&a.0, &b.0)
            && self.second.equals(&a.1, &b.1)
            && self.third.equals(&a.2, &b.2)
    }
    #[inline]
    fn hash(&self, value: &(X, Y, Z)) -> u64 {
        combine_hashes(
            combine_hashes(self.first.hash(&value.0), self.second.hash(&value.1)),
            self.third.hash(&value.2),
        )
    }
}

/// Reverses a [`Comparer`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct Reversed<C>(pub C);

impl<T: ?Sized, C: Comparer<T>> Comparer<T> for Reversed<C> {
    #[inline(always)]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(a, b).reverse()
    }
}
