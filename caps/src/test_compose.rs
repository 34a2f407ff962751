#![cfg(test)]
#![allow(missing_docs)]
use std::{cmp::Ordering, rc::Rc, sync::Arc};

use rand::prelude::*;

use crate::{
    default_equality, default_ordering, from_fn, key_only, lexicographic, lexicographic3,
    Comparer, Equivalence, Natural, Reversed,
};

fn odd_before_even(a: &i32, b: &i32) -> Ordering {
    (a % 2 == 0).cmp(&(b % 2 == 0)).then(a.cmp(b))
}

#[test]
fn lexicographic_key_order_wins() {
    let ordering = lexicographic(from_fn(odd_before_even), Natural);
    assert_eq!(ordering.compare(&(7, "foo"), &(6, "bar")), Ordering::Less);
    assert_eq!(ordering.compare(&(6, "bar"), &(7, "foo")), Ordering::Greater);

    let mut pairs = vec![(6, "bar"), (7, "foo"), (4, "aaa"), (7, "abc"), (1, "zzz")];
    pairs.sort_by(|a, b| ordering.compare(a, b));
    assert_eq!(
        pairs,
        vec![(1, "zzz"), (7, "abc"), (7, "foo"), (4, "aaa"), (6, "bar")]
    );
}

#[test]
fn lexicographic_uses_value_for_ties() {
    let ordering = lexicographic(Natural, Reversed(Natural));
    assert_eq!(ordering.compare(&(1, 10), &(1, 20)), Ordering::Greater);
    assert_eq!(ordering.compare(&(1, 10), &(2, 20)), Ordering::Less);
    assert_eq!(ordering.compare(&(1, 10), &(1, 10)), Ordering::Equal);
}

#[test]
fn key_only_ignores_values() {
    let ordering = key_only(Natural);
    let equality = key_only(Natural);
    let a = ("key", 1);
    let b = ("key", 2);
    let c = ("other", 1);

    assert_eq!(ordering.compare(&a, &b), Ordering::Equal);
    assert_eq!(ordering.compare(&a, &c), Ordering::Less);
    assert!(equality.equals(&a, &b));
    assert_eq!(equality.hash(&a), equality.hash(&b));
    assert!(!equality.equals(&a, &c));
}

#[test]
fn key_only_wraps_resolved_abstractions() {
    let ordering = key_only(default_ordering::<String>().unwrap());
    let equality = key_only(default_equality::<String>());
    let a = ("x".to_string(), vec![1]);
    let b = ("x".to_string(), vec![2, 3]);
    assert_eq!(ordering.compare(&a, &b), Ordering::Equal);
    assert!(equality.equals(&a, &b));
}

#[test]
fn lexicographic3_short_circuits() {
    let never = from_fn(|_: &u8, _: &u8| -> Ordering { panic!("third component compared") });
    let ordering = lexicographic3(Natural, Natural, never);
    assert_eq!(ordering.compare(&(1, 'a', 0), &(2, 'a', 0)), Ordering::Less);
    assert_eq!(ordering.compare(&(1, 'b', 0), &(1, 'a', 0)), Ordering::Greater);

    let ordering = lexicographic3(Natural, Natural, Reversed(Natural));
    assert_eq!(ordering.compare(&(1, 'a', 3), &(1, 'a', 4)), Ordering::Greater);
}

#[test]
fn lexicographic_equivalence() {
    let equality = lexicographic(Natural, key_only(Natural));
    let a = (1, ("k", 5));
    let b = (1, ("k", 6));
    let c = (2, ("k", 5));
    assert!(equality.equals(&a, &b));
    assert_eq!(equality.hash(&a), equality.hash(&b));
    assert!(!equality.equals(&a, &c));

    let equality = lexicographic3(Natural, Natural, Natural);
    assert!(equality.equals(&(1, 2, 3), &(1, 2, 3)));
    assert!(!equality.equals(&(1, 2, 3), &(1, 2, 4)));
    assert_ne!(equality.hash(&(1, 2, 3)), equality.hash(&(3, 2, 1)));
}

#[test]
fn nested_compound_keys() {
    // ((a, b), c) ordered by (a, b) only, with b descending
    let ordering = key_only(lexicographic(Natural, Reversed(Natural)));
    let mut items = vec![((1, 1), "x"), ((0, 5), "y"), ((1, 3), "z"), ((0, 7), "w")];
    items.sort_by(|a, b| ordering.compare(a, b));
    assert_eq!(
        items,
        vec![((0, 7), "w"), ((0, 5), "y"), ((1, 3), "z"), ((1, 1), "x")]
    );
}

#[test]
fn composers_match_tuple_order() {
    let mut rng = rand_pcg::Pcg64::seed_from_u64(17);
    let ordering = lexicographic3(Natural, Natural, Natural);
    let mut triples: Vec<(u8, u8, u8)> = (0..500)
        .map(|_| (rng.gen_range(0..4), rng.gen_range(0..4), rng.gen()))
        .collect();
    let mut expected = triples.clone();
    expected.sort();
    triples.sort_by(|a, b| ordering.compare(a, b));
    assert_eq!(triples, expected);
}

#[test]
fn shared_abstractions() {
    let shared = Arc::new(lexicographic(Natural, Natural));
    let ordering = key_only(shared.clone());
    assert_eq!(
        ordering.compare(&((1, 2), ()), &((1, 3), ())),
        Ordering::Less
    );
    let boxed: Box<dyn Comparer<i32>> = Box::new(from_fn(odd_before_even));
    assert_eq!(boxed.compare(&2, &3), Ordering::Greater);
    let counted = Rc::new(Natural);
    assert!(Equivalence::<str>::equals(&counted, "a", "a"));
}
