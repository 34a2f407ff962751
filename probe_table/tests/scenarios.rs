#![allow(missing_docs)] // test only
use std::{
    cell::Cell,
    panic::{catch_unwind, AssertUnwindSafe},
    rc::Rc,
};

use collkit_caps::{default_equality, key_only, DefaultEquality, Equivalence, KeyOnly, Natural};
use collkit_probe_table::{DuplicatePolicy, Insertion, ProbeTable, DEFAULT_LOAD_FACTOR};
use collkit_util::hash::hash_ref;
use rand::prelude::*;

const LETTER_KEYS: [&str; 13] = [
    "m", "b", "t", "o", "z", "k", "g", "a5", "c", "a2", "a7", "i", "h",
];

#[test]
fn letter_keys_round_trip() {
    let _ = collkit_logger::try_setup();
    let mut rng = rand_pcg::Pcg64::seed_from_u64(13);
    for _ in 0..20 {
        let mut table: ProbeTable<(String, usize), KeyOnly<Natural>> = ProbeTable::new();
        for (index, key) in LETTER_KEYS.iter().enumerate() {
            let outcome = table.insert((key.to_string(), index), DuplicatePolicy::Preserve);
            assert!(outcome.is_new());
        }
        assert_eq!(table.len(), 13);
        assert_eq!(table.slot_count(), 32);
        table.check();

        let mut order: Vec<usize> = (0..LETTER_KEYS.len()).collect();
        order.shuffle(&mut rng);
        for index in order {
            let key = LETTER_KEYS[index].to_string();
            assert_eq!(
                table.remove(&(key.clone(), usize::MAX)),
                Some((key.clone(), index))
            );
            assert_eq!(table.find(&(key, 0)), None);
            table.check();
        }
        assert_eq!(table.len(), 0);
        assert_eq!(table.slot_count(), 0);
    }
}

#[test]
fn float_keys_drive_slot_count() {
    let _ = collkit_logger::try_setup();
    let mut table: ProbeTable<f64, DefaultEquality<f64>> =
        ProbeTable::with_equality(default_equality::<f64>());
    assert_eq!(table.load_factor(), DEFAULT_LOAD_FACTOR);
    assert_eq!(table.slot_count(), 0);

    let mut keys: Vec<f64> = (0..1000).map(|i| i as f64 * 0.37 - 50.0).collect();
    for &key in keys.iter() {
        assert!(table.insert(key, DuplicatePolicy::Preserve).is_new());
    }
    assert_eq!(table.len(), 1000);
    assert_eq!(table.slot_count(), 2048);
    table.check();

    keys.shuffle(&mut rand_pcg::Pcg64::seed_from_u64(1000));
    while table.len() > 400 {
        let key = keys.pop().unwrap();
        assert_eq!(table.remove(&key), Some(key));
    }
    assert_eq!(table.slot_count(), 1024);
    table.check();

    while table.len() > 20 {
        let key = keys.pop().unwrap();
        assert_eq!(table.remove(&key), Some(key));
    }
    assert_eq!(table.slot_count(), 64);
    table.check();

    while let Some(key) = keys.pop() {
        assert_eq!(table.remove(&key), Some(key));
    }
    assert!(table.is_empty());
    assert_eq!(table.slot_count(), 0);

    assert!(table.insert(0.5, DuplicatePolicy::Preserve).is_new());
    assert_eq!(table.slot_count(), 16);
    table.check();
}

#[test]
fn preserve_keeps_first_value() {
    let mut table = ProbeTable::with_equality(key_only(Natural));
    assert!(table.insert(("k", 1), DuplicatePolicy::Preserve).is_new());
    for value in 2..10 {
        match table.insert(("k", value), DuplicatePolicy::Preserve) {
            Insertion::Preserved { existing, rejected } => {
                assert_eq!(*existing, ("k", 1));
                assert_eq!(rejected, ("k", value));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!(table.find(&("k", 0)), Some(&("k", 1)));
    assert_eq!(table.len(), 1);
}

#[test]
fn replace_reports_previous_value() {
    let mut table = ProbeTable::with_equality(key_only(Natural));
    assert_eq!(table.insert(("k", 1), DuplicatePolicy::Replace), Insertion::New);
    assert_eq!(
        table.insert(("k", 2), DuplicatePolicy::Replace),
        Insertion::Replaced(("k", 1))
    );
    assert_eq!(table.find(&("k", 0)), Some(&("k", 2)));

    assert_eq!(table.replace(("k", 3)), Ok(("k", 2)));
    assert_eq!(table.replace(("missing", 3)), Err(("missing", 3)));
    assert_eq!(table.len(), 1);
    assert_eq!(table.find(&("k", 0)), Some(&("k", 3)));
}

#[test]
fn random_round_trips() {
    let mut rng = rand_pcg::Pcg64::seed_from_u64(7);
    let mut table: ProbeTable<u64, Natural> = ProbeTable::new();
    let values: Vec<u64> = (0..5000).map(|_| rng.gen()).collect();
    for &value in values.iter() {
        table.insert(value, DuplicatePolicy::Preserve);
        assert_eq!(table.find(&value), Some(&value));
    }
    table.check();
    for &value in values.iter() {
        assert!(table.contains(&value));
    }
}

#[test]
fn clones_are_independent() {
    let mut original: ProbeTable<u32, Natural> = (0..100).collect();
    let mut clone = original.clone();
    clone.check();

    for key in 0..50 {
        assert_eq!(original.remove(&key), Some(key));
    }
    clone.insert_all(100..200, DuplicatePolicy::Preserve);

    assert_eq!(original.len(), 50);
    assert_eq!(clone.len(), 200);
    assert!((0..50).all(|key| !original.contains(&key) && clone.contains(&key)));
    assert!((100..200).all(|key| !original.contains(&key)));

    let mut sorted: Vec<u32> = original.iter().copied().collect();
    sorted.sort_unstable();
    assert!(sorted.into_iter().eq(50..100));
    original.check();
    clone.check();
}

#[derive(Clone, Copy, Default)]
struct IgnoreCase;

impl Equivalence<String> for IgnoreCase {
    fn equals(&self, a: &String, b: &String) -> bool {
        a.eq_ignore_ascii_case(b)
    }
    fn hash(&self, value: &String) -> u64 {
        hash_ref(&value.to_ascii_lowercase())
    }
}

#[test]
fn clone_with_rehashes() {
    let words = ["apple", "Apple", "APPLE", "pear", "Pear", "plum"];
    let mut table: ProbeTable<String, Natural> =
        words.iter().map(|word| word.to_string()).collect();
    assert_eq!(table.len(), 6);

    let folded = table.clone_with(IgnoreCase);
    folded.check();
    assert_eq!(folded.len(), 3);
    assert!(folded.contains(&"aPPle".to_string()));
    assert!(!table.contains(&"aPPle".to_string()));

    table.clear();
    assert_eq!(table.slot_count(), 0);
    assert_eq!(folded.len(), 3);
}

#[test]
fn load_factor_changes_resize() {
    let mut table: ProbeTable<u32, Natural> = (0..100).collect();
    assert_eq!(table.slot_count(), 256);

    table.set_load_factor(0.25);
    assert_eq!(table.slot_count(), 512);
    table.check();

    table.set_load_factor(1.0);
    assert_eq!(table.slot_count(), 256);
    table.check();

    table.retain(|&key| key < 10);
    assert_eq!(table.len(), 10);
    assert_eq!(table.slot_count(), 16);
    table.check();

    table.retain(|_| false);
    assert_eq!(table.slot_count(), 0);
}

#[test]
#[should_panic(expected = "outside of (0, 1]")]
fn invalid_load_factor_panics() {
    let mut table: ProbeTable<u32, Natural> = ProbeTable::new();
    table.set_load_factor(1.5);
}

#[test]
fn drain_and_into_iter() {
    let mut table: ProbeTable<u32, Natural> = (0..40).collect();
    let drained = table.drain();
    assert_eq!(drained.len(), 40);
    let mut drained: Vec<u32> = drained.collect();
    drained.sort_unstable();
    assert!(drained.into_iter().eq(0..40));
    assert!(table.is_empty());
    assert_eq!(table.slot_count(), 0);

    table.extend(5..8);
    let mut owned: Vec<u32> = table.into_iter().collect();
    owned.sort_unstable();
    assert_eq!(owned, [5, 6, 7]);
}

#[test]
fn reserve_prevents_growth() {
    let mut table: ProbeTable<u32, Natural> = ProbeTable::with_capacity_and_equality(100, Natural);
    assert_eq!(table.slot_count(), 256);
    table.reserve(500);
    let slot_count = table.slot_count();
    assert_eq!(slot_count, 1024);
    table.insert_all(0..500, DuplicatePolicy::Preserve);
    assert_eq!(table.slot_count(), slot_count);
    table.check();
}

#[test]
fn reserved_slots_are_released() {
    let mut table: ProbeTable<u32, Natural> = ProbeTable::with_capacity_and_equality(100, Natural);
    assert_eq!(table.slot_count(), 256);
    table.set_load_factor(DEFAULT_LOAD_FACTOR);
    assert_eq!(table.slot_count(), 0);

    table.insert_all(0..5, DuplicatePolicy::Preserve);
    assert_eq!(table.slot_count(), 16);
    table.reserve(500);
    assert_eq!(table.slot_count(), 1024);
    table.set_load_factor(DEFAULT_LOAD_FACTOR);
    assert_eq!(table.slot_count(), 16);
    table.check();

    table.reserve(500);
    assert_eq!(table.slot_count(), 1024);
    assert_eq!(table.remove(&4), Some(4));
    assert_eq!(table.slot_count(), 16);
    assert_eq!(table.len(), 4);
    table.check();
}

/// Panics on comparisons while armed.
#[derive(Clone)]
struct Tripwire(Rc<Cell<bool>>);

impl Equivalence<(u32, u32)> for Tripwire {
    fn equals(&self, a: &(u32, u32), b: &(u32, u32)) -> bool {
        assert!(!self.0.get(), "tripwire");
        a.0 == b.0
    }
    fn hash(&self, value: &(u32, u32)) -> u64 {
        hash_ref(&value.0)
    }
}

#[test]
fn panicking_equality_leaves_table_unchanged() {
    let armed = Rc::new(Cell::new(false));
    let mut table = ProbeTable::with_equality(Tripwire(armed.clone()));
    for key in 0..11 {
        table.insert((key, key), DuplicatePolicy::Replace);
    }
    let slot_count = table.slot_count();
    let before: Vec<(u32, u32)> = table.iter().copied().collect();

    armed.set(true);
    let result = catch_unwind(AssertUnwindSafe(|| {
        table.insert((3, 99), DuplicatePolicy::Replace);
    }));
    assert!(result.is_err());
    let result = catch_unwind(AssertUnwindSafe(|| table.remove(&(4, 0))));
    assert!(result.is_err());
    armed.set(false);

    assert_eq!(table.len(), 11);
    assert_eq!(table.slot_count(), slot_count);
    assert!(table.iter().copied().eq(before));
    assert_eq!(table.find(&(3, 0)), Some(&(3, 3)));
    table.check();
}

#[test]
fn debug_formats_as_set() {
    let mut table: ProbeTable<u32, Natural> = ProbeTable::new();
    assert_eq!(format!("{table:?}"), "{}");
    table.insert(7, DuplicatePolicy::Preserve);
    assert_eq!(format!("{table:?}"), "{7}");
}
