#![cfg(test)]
#![allow(missing_docs)]
use std::{any::Any, cmp::Ordering};

use collkit_util::hash::hash_value;

use crate::{
    default_equality, default_ordering, Capabilities, Comparer, ConfigError, DefaultEquality,
    DefaultOrdering, EqualityFns, Equivalence, ObjectCompareFn, ObjectEqualityFns,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Modern(i32);

crate::capabilities!(ord: Modern);

// Only comparable through a type erased operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Legacy(i32);

impl Legacy {
    fn compare_to(&self, other: &dyn Any) -> Ordering {
        let other = other
            .downcast_ref::<Legacy>()
            .expect("Legacy compared against a foreign type");
        self.0.cmp(&other.0)
    }
}

impl Capabilities for Legacy {
    fn object_ordering() -> Option<ObjectCompareFn<Self>> {
        Some(Self::compare_to)
    }
    fn structural_equality() -> EqualityFns<Self> {
        EqualityFns::natural()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Opaque(u8);

crate::capabilities!(eq: Opaque);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Caseless(String);

fn caseless_equals(a: &Caseless, b: &dyn Any) -> bool {
    b.downcast_ref::<Caseless>()
        .is_some_and(|b| a.0.eq_ignore_ascii_case(&b.0))
}

fn caseless_hash(value: &Caseless) -> u64 {
    hash_value(value.0.to_ascii_lowercase())
}

impl Capabilities for Caseless {
    fn object_equality() -> Option<ObjectEqualityFns<Self>> {
        Some(ObjectEqualityFns {
            equals: caseless_equals,
            hash: caseless_hash,
        })
    }
    fn structural_equality() -> EqualityFns<Self> {
        EqualityFns::natural()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Plain(Vec<u8>);

impl Capabilities for Plain {
    fn structural_equality() -> EqualityFns<Self> {
        EqualityFns::natural()
    }
}

const VALUES: [i32; 9] = [5, -3, 12, 0, 7, 7, -20, 3, 1];

#[test]
fn untyped_ordering_matches_typed() {
    let typed = default_ordering::<Modern>().unwrap();
    let untyped = default_ordering::<Legacy>().unwrap();
    assert!(matches!(typed, DefaultOrdering::Typed(_)));
    assert!(matches!(untyped, DefaultOrdering::Object(_)));

    let mut modern: Vec<Modern> = VALUES.iter().map(|&v| Modern(v)).collect();
    let mut legacy: Vec<Legacy> = VALUES.iter().map(|&v| Legacy(v)).collect();
    modern.sort_by(|a, b| typed.compare(a, b));
    legacy.sort_by(|a, b| untyped.compare(a, b));

    assert!(modern.iter().map(|m| m.0).eq(legacy.iter().map(|l| l.0)));

    for &a in VALUES.iter() {
        for &b in VALUES.iter() {
            assert_eq!(
                typed.compare(&Modern(a), &Modern(b)),
                untyped.compare(&Legacy(a), &Legacy(b))
            );
        }
    }
}

#[test]
fn missing_ordering_names_the_type() {
    let err = default_ordering::<Opaque>().unwrap_err();
    assert!(matches!(err, ConfigError::NoOrdering { .. }));
    assert!(err.type_name().ends_with("Opaque"));
    let message = err.to_string();
    assert!(message.contains("Opaque"), "{message}");
    assert!(message.contains("neither"), "{message}");

    assert!(default_ordering::<Plain>().is_err());
}

// Declares both orderings, with the untyped one reversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Both(i32);

impl Both {
    fn compare(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
    fn compare_to(&self, other: &dyn Any) -> Ordering {
        other.downcast_ref::<Both>().unwrap().0.cmp(&self.0)
    }
}

impl Capabilities for Both {
    fn typed_ordering() -> Option<crate::CompareFn<Self>> {
        Some(Self::compare)
    }
    fn object_ordering() -> Option<ObjectCompareFn<Self>> {
        Some(Self::compare_to)
    }
    fn structural_equality() -> EqualityFns<Self> {
        EqualityFns::natural()
    }
}

#[test]
fn typed_ordering_is_preferred() {
    let ordering = default_ordering::<Both>().unwrap();
    assert!(matches!(ordering, DefaultOrdering::Typed(_)));
    assert_eq!(ordering.compare(&Both(1), &Both(2)), Ordering::Less);
}

#[test]
fn builtin_orderings() {
    let strings = default_ordering::<String>().unwrap();
    assert_eq!(
        strings.compare(&"apple".to_string(), &"banana".to_string()),
        Ordering::Less
    );

    let floats = default_ordering::<f64>().unwrap();
    assert_eq!(floats.compare(&-0.0, &0.0), Ordering::Less);
    assert_eq!(floats.compare(&f64::NAN, &f64::INFINITY), Ordering::Greater);

    let pairs = default_ordering::<(u8, &'static str)>().unwrap();
    assert_eq!(pairs.compare(&(1, "b"), &(1, "a")), Ordering::Greater);
}

#[test]
fn containers_of_ordered_types_resolve() {
    let options = default_ordering::<Option<u32>>().unwrap();
    assert_eq!(options.compare(&None, &Some(0)), Ordering::Less);

    let vecs = default_ordering::<Vec<i8>>().unwrap();
    assert_eq!(vecs.compare(&vec![1, 2], &vec![1, 2, 0]), Ordering::Less);
    assert_eq!(vecs.compare(&vec![2], &vec![1, 9]), Ordering::Greater);

    let triples = default_ordering::<(u8, char, String)>().unwrap();
    assert_eq!(
        triples.compare(&(1, 'a', "z".to_string()), &(1, 'a', "y".to_string())),
        Ordering::Greater
    );

    assert!(matches!(
        default_equality::<Option<String>>(),
        DefaultEquality::Typed(_)
    ));
    let eq = default_equality::<(u8, Vec<u8>)>();
    assert!(eq.equals(&(1, vec![2]), &(1, vec![2])));
    assert!(!eq.equals(&(1, vec![2]), &(1, vec![3])));
    assert_eq!(eq.hash(&(1, vec![2])), eq.hash(&(1, vec![2])));
}

#[test]
fn equality_resolution_routes() {
    assert!(matches!(
        default_equality::<Modern>(),
        DefaultEquality::Typed(_)
    ));
    assert!(matches!(
        default_equality::<Caseless>(),
        DefaultEquality::Object(_)
    ));
    assert!(matches!(
        default_equality::<Plain>(),
        DefaultEquality::Structural(_)
    ));
    assert!(matches!(
        default_equality::<Legacy>(),
        DefaultEquality::Structural(_)
    ));
}

#[test]
fn object_equality_is_used() {
    let eq = default_equality::<Caseless>();
    let a = Caseless("Hello".to_string());
    let b = Caseless("hELLO".to_string());
    let c = Caseless("world".to_string());
    assert!(eq.equals(&a, &b));
    assert_eq!(eq.hash(&a), eq.hash(&b));
    assert!(!eq.equals(&a, &c));
}

#[test]
fn structural_equality_is_consistent() {
    let eq = default_equality::<Plain>();
    let a = Plain(vec![1, 2, 3]);
    let b = Plain(vec![1, 2, 3]);
    assert!(eq.equals(&a, &b));
    assert_eq!(eq.hash(&a), eq.hash(&b));
    assert!(!eq.equals(&a, &Plain(vec![3, 2, 1])));
}

#[test]
fn float_equality_uses_bit_patterns() {
    let eq = default_equality::<f64>();
    assert!(eq.equals(&f64::NAN, &f64::NAN));
    assert!(!eq.equals(&0.0, &-0.0));
    assert!(eq.equals(&1.5, &1.5));
    assert_eq!(eq.hash(&2.25), eq.hash(&2.25));
}

#[test]
fn resolved_abstractions_are_shareable() {
    fn assert_send_sync_copy<T: Send + Sync + Copy>(_: &T) {}
    let ordering = default_ordering::<String>().unwrap();
    let equality = default_equality::<String>();
    assert_send_sync_copy(&ordering);
    assert_send_sync_copy(&equality);

    let handle = std::thread::spawn(move || {
        ordering.compare(&"a".to_string(), &"b".to_string())
            == Ordering::Less
            && equality.equals(&"x".to_string(), &"x".to_string())
    });
    assert!(handle.join().unwrap());
}
