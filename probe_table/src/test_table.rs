#![cfg(test)]
#![allow(missing_docs)]
use collkit_caps::{key_only, Equivalence, KeyOnly, Natural};
use collkit_util::hash::hash_ref;
use hashbrown::HashTable;
use rand::prelude::*;

use crate::{DuplicatePolicy, Insertion, ProbeTable, MIN_SLOT_COUNT};

// Forces long probe sequences by mapping all keys onto a handful of hashes.
#[derive(Clone, Copy, Debug, Default)]
struct FewHashes;

impl Equivalence<(u16, u32)> for FewHashes {
    fn equals(&self, a: &(u16, u32), b: &(u16, u32)) -> bool {
        a.0 == b.0
    }
    fn hash(&self, value: &(u16, u32)) -> u64 {
        (value.0 % 5) as u64
    }
}

/// Runs every operation against the table under test and against a hashbrown reference.
struct CheckedTable<E> {
    dut: ProbeTable<(u16, u32), E>,
    ref_table: HashTable<(u16, u32)>,
}

impl<E: Equivalence<(u16, u32)> + Clone> CheckedTable<E> {
    fn new(equality: E) -> Self {
        CheckedTable {
            dut: ProbeTable::with_equality(equality),
            ref_table: HashTable::new(),
        }
    }

    fn ref_find(&self, key: u16) -> Option<&(u16, u32)> {
        self.ref_table.find(hash_ref(&key), |entry| entry.0 == key)
    }

    fn insert(&mut self, item: (u16, u32), policy: DuplicatePolicy) -> bool {
        let expected_previous = self.ref_find(item.0).copied();
        let outcome = self.dut.insert(item, policy);
        assert_eq!(outcome.previous().copied(), expected_previous);
        let is_new = outcome.is_new();
        match outcome {
            Insertion::New => (),
            Insertion::Replaced(_) => assert_eq!(policy, DuplicatePolicy::Replace),
            Insertion::Preserved { rejected, .. } => {
                assert_eq!(policy, DuplicatePolicy::Preserve);
                assert_eq!(rejected, item);
            }
        }

        let key = item.0;
        match self.ref_table.entry(
            hash_ref(&key),
            |entry| entry.0 == key,
            |entry| hash_ref(&entry.0),
        ) {
            hashbrown::hash_table::Entry::Occupied(mut entry) => {
                if policy == DuplicatePolicy::Replace {
                    *entry.get_mut() = item;
                }
            }
            hashbrown::hash_table::Entry::Vacant(entry) => {
                entry.insert(item);
            }
        }
        assert_eq!(is_new, expected_previous.is_none());
        self.check_bounds();
        is_new
    }

    fn find(&self, key: u16) -> Option<(u16, u32)> {
        let probe = (key, u32::MAX);
        let result = self.dut.find(&probe).copied();
        assert_eq!(result, self.ref_find(key).copied());
        assert_eq!(self.dut.contains(&probe), result.is_some());
        result
    }

    fn replace(&mut self, item: (u16, u32)) -> Result<(u16, u32), (u16, u32)> {
        let result = self.dut.replace(item);
        let key = item.0;
        match self
            .ref_table
            .find_mut(hash_ref(&key), |entry| entry.0 == key)
        {
            Some(entry) => assert_eq!(result, Ok(std::mem::replace(entry, item))),
            None => assert_eq!(result, Err(item)),
        }
        result
    }

    fn remove(&mut self, key: u16) -> Option<(u16, u32)> {
        let result = self.dut.remove(&(key, 0));
        let ref_result = match self
            .ref_table
            .find_entry(hash_ref(&key), |entry| entry.0 == key)
        {
            Ok(entry) => Some(entry.remove().0),
            Err(_) => None,
        };
        assert_eq!(result, ref_result);
        self.check_bounds();
        result
    }

    fn retain(&mut self, keep: impl Fn(&(u16, u32)) -> bool) {
        self.dut.retain(&keep);
        self.ref_table.retain(|entry| keep(entry));
        self.check();
    }

    fn set_load_factor(&mut self, load_factor: f64) {
        self.dut.set_load_factor(load_factor);
        self.check();
    }

    fn check_bounds(&self) {
        let slot_count = self.dut.slot_count();
        assert!(
            slot_count == 0 || (slot_count.is_power_of_two() && slot_count >= MIN_SLOT_COUNT)
        );
        assert!(self.dut.len() as f64 <= self.dut.load_factor() * slot_count as f64);
        assert_eq!(self.dut.len(), self.ref_table.len());
    }

    fn check(&self) {
        self.dut.check();
        self.check_bounds();
        assert_eq!(self.dut.iter().len(), self.ref_table.len());
        for item in self.dut.iter() {
            assert_eq!(self.ref_find(item.0), Some(item));
        }
    }

    fn check_clone(&mut self) {
        let snapshot = self.dut.clone();
        snapshot.check();
        assert_eq!(snapshot.len(), self.dut.len());
        assert!(snapshot.iter().eq(self.dut.iter()));

        // mutating the clone must leave the original untouched
        let mut clone = self.dut.clone();
        clone.clear();
        clone.insert((u16::MAX, 0), DuplicatePolicy::Replace);
        self.check();
    }
}

macro_rules! weighted_choose {
    ($rng:expr, $($name:ident: $weight:expr => $body:expr),+) => {
        {
            enum Branches { $( $name,  )* }
            let weights = [$((Branches::$name, $weight)),+];
            match weights.choose_weighted($rng, |x| x.1).unwrap().0 {
                $(Branches::$name => $body),*
            }
        }
    }
}

fn test_suite<E: Equivalence<(u16, u32)> + Clone, R: Rng + SeedableRng>(
    equality: E,
    key_range: u16,
    steps: usize,
) {
    let _ = collkit_logger::try_setup();
    let mut table = CheckedTable::new(equality);
    let mut rng = R::seed_from_u64(25);
    let mut max_size = 0;
    let verbosity = 1;
    for _ in 0..steps {
        weighted_choose! {&mut rng,
            InsertReplace: 1.0 => {
                let item = (rng.gen_range(0..key_range), rng.gen());
                let result = table.insert(item, DuplicatePolicy::Replace);
                if verbosity > 0 {
                    println!("inserting (replace) {item:?} -> {result:?}");
                }
            },
            InsertPreserve: 1.0 => {
                let item = (rng.gen_range(0..key_range), rng.gen());
                let result = table.insert(item, DuplicatePolicy::Preserve);
                if verbosity > 0 {
                    println!("inserting (preserve) {item:?} -> {result:?}");
                }
            },
            FindPresent: 0.5 => {
                if let Some(&(key, _)) = table.ref_table.iter().choose(&mut rng) {
                    let result = table.find(key);
                    if verbosity > 0 {
                        println!("finding {key:?} -> {result:?}");
                    }
                }
            },
            FindRandom: 0.5 => {
                let key = rng.gen_range(0..key_range);
                let result = table.find(key);
                if verbosity > 0 {
                    println!("finding {key:?} -> {result:?}");
                }
            },
            Replace: 0.3 => {
                let item = (rng.gen_range(0..key_range), rng.gen());
                let result = table.replace(item);
                if verbosity > 0 {
                    println!("replacing {item:?} -> {result:?}");
                }
            },
            RemovePresent: 0.8 => {
                if let Some(&(key, _)) = table.ref_table.iter().choose(&mut rng) {
                    let result = table.remove(key);
                    if verbosity > 0 {
                        println!("removing {key:?} -> {result:?}");
                    }
                }
            },
            RemoveRandom: 0.5 => {
                let key = rng.gen_range(0..key_range);
                let result = table.remove(key);
                if verbosity > 0 {
                    println!("removing {key:?} -> {result:?}");
                }
            },
            Retain: 0.02 => {
                let modulus = rng.gen_range(2..6);
                let old_len = table.ref_table.len();
                table.retain(|item| item.1 % modulus != 0);
                if verbosity > 0 {
                    println!("retaining, {old_len} -> {}", table.ref_table.len());
                }
            },
            LoadFactor: 0.02 => {
                let load_factor = rng.gen_range(0.25..=1.0);
                table.set_load_factor(load_factor);
                if verbosity > 0 {
                    println!("load factor {load_factor} -> {} slots", table.dut.slot_count());
                }
            },
            CloneTable: 0.02 => {
                table.check_clone();
                if verbosity > 0 {
                    println!("clone");
                }
            },
            Check: 0.15 => {
                table.check();
                if verbosity > 0 {
                    println!("check");
                }
            }
        };
        max_size = std::cmp::max(max_size, table.ref_table.len());
    }
    table.check();
    println!("max size: {max_size}");
}

#[test]
fn test_suite_key_only() {
    test_suite::<KeyOnly<Natural>, rand_pcg::Pcg64>(key_only(Natural), 1000, 20000);
}

#[test]
fn test_suite_small_keys() {
    test_suite::<KeyOnly<Natural>, rand_pcg::Pcg64>(key_only(Natural), 40, 5000);
}

#[test]
fn test_suite_colliding_hashes() {
    test_suite::<FewHashes, rand_pcg::Pcg64>(FewHashes, 300, 5000);
}

#[test]
fn tombstones_do_not_accumulate() {
    let mut table: ProbeTable<u32, Natural> = ProbeTable::new();
    table.insert_all(0..10, DuplicatePolicy::Preserve);
    assert_eq!(table.slot_count(), 16);
    // alternate between inserting fresh keys and removing them without changing the size
    for key in 10..10_000 {
        assert!(table.insert(key, DuplicatePolicy::Preserve).is_new());
        assert_eq!(table.remove(&key), Some(key));
        assert_eq!(table.slot_count(), 16);
        assert!(table.len() + table.tombstone_count() < table.slot_count());
    }
    table.check();
    assert!((0..10).all(|key| table.contains(&key)));
}

#[test]
fn full_table_lookups_terminate() {
    let mut table: ProbeTable<u32, Natural> = ProbeTable::new();
    table.set_load_factor(1.0);
    table.insert_all(0..16, DuplicatePolicy::Preserve);
    assert_eq!(table.slot_count(), 16);
    assert_eq!(table.len(), 16);
    table.check();
    assert_eq!(table.find(&99), None);
    assert_eq!(table.remove(&99), None);
    assert!(table.insert(16, DuplicatePolicy::Preserve).is_new());
    assert_eq!(table.slot_count(), 32);
    table.check();
}

#[test]
#[should_panic(expected = "capacity overflow")]
fn reserve_beyond_usize_panics() {
    let mut table: ProbeTable<u32, Natural> = ProbeTable::new();
    table.reserve(usize::MAX);
}

#[test]
#[should_panic(expected = "capacity overflow")]
fn with_capacity_beyond_usize_panics() {
    let _table: ProbeTable<u32, Natural> =
        ProbeTable::with_capacity_and_equality(usize::MAX, Natural);
}

#[test]
fn failed_growth_leaves_table_intact() {
    let mut table: ProbeTable<u32, Natural> = (0..20).collect();
    let slot_count = table.slot_count();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        table.reserve(usize::MAX);
    }));
    assert!(result.is_err());
    assert_eq!(table.slot_count(), slot_count);
    assert_eq!(table.len(), 20);
    table.check();

    let mut empty: ProbeTable<u32, Natural> = ProbeTable::new();
    empty.set_load_factor(1e-300);
    assert_eq!(empty.slot_count(), 0);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        empty.insert(1, DuplicatePolicy::Preserve);
    }));
    assert!(result.is_err());
    assert!(empty.is_empty());
    assert_eq!(empty.slot_count(), 0);
}
