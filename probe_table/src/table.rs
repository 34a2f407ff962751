use std::{fmt, mem};

use collkit_caps::Equivalence;

use crate::{
    iter::{IntoIter, Iter},
    policy::{
        grown_slot_count, shrunk_slot_count, used_slot_limit, DuplicatePolicy, Insertion,
        DEFAULT_LOAD_FACTOR, MIN_SLOT_COUNT,
    },
};

#[derive(Clone)]
pub(crate) enum Slot<T> {
    Empty,
    Occupied { hash: u64, value: T },
    Tombstone,
}

fn empty_slots<T>(slot_count: usize) -> Box<[Slot<T>]> {
    std::iter::repeat_with(|| Slot::Empty)
        .take(slot_count)
        .collect()
}

/// Triangular probing: offsets 0, 1, 3, 6, ... which, modulo a power of two, cover every slot
/// within the first `slot_count` steps.
struct ProbeSeq {
    pos: usize,
    stride: usize,
    mask: usize,
}

impl ProbeSeq {
    #[inline(always)]
    fn new(hash: u64, slot_count: usize) -> Self {
        // User supplied hashes can be weak in the low bits, so spread the high bits down first.
        let mixed = hash.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        let mask = slot_count - 1;
        Self {
            pos: (mixed ^ (mixed >> 29)) as usize & mask,
            stride: 0,
            mask,
        }
    }

    #[inline(always)]
    fn advance(&mut self) {
        self.stride += 1;
        self.pos = (self.pos + self.stride) & self.mask;
    }
}

/// An open addressing hash table storing elements identified by an [`Equivalence`].
///
/// `E` decides which elements count as duplicates. With a key only equivalence such as
/// [`collkit_caps::KeyOnly`], a table of `(key, value)` pairs acts as a map.
///
/// The number of slots is always zero or a power of two that is at least [`MIN_SLOT_COUNT`], and
/// after every call `len() <= load_factor() * slot_count()` holds.
///
/// If the equivalence panics, the panic propagates to the caller and the table is left as it was
/// before the call.
pub struct ProbeTable<T, E> {
    slots: Box<[Slot<T>]>,
    len: usize,
    tombstones: usize,
    load_factor: f64,
    equality: E,
}

impl<T: Clone, E: Clone> Clone for ProbeTable<T, E> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            len: self.len,
            tombstones: self.tombstones,
            load_factor: self.load_factor,
            equality: self.equality.clone(),
        }
    }
}

impl<T: fmt::Debug, E> fmt::Debug for ProbeTable<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self).finish()
    }
}

impl<T, E: Default> Default for ProbeTable<T, E> {
    fn default() -> Self {
        Self::with_equality(E::default())
    }
}

impl<T, E: Default> ProbeTable<T, E> {
    /// Returns an empty table using the default value of the equivalence type.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, E> ProbeTable<T, E> {
    /// Returns an empty table without any slots.
    pub fn with_equality(equality: E) -> Self {
        Self {
            slots: empty_slots(0),
            len: 0,
            tombstones: 0,
            load_factor: DEFAULT_LOAD_FACTOR,
            equality,
        }
    }

    /// Returns an empty table with enough slots to hold `capacity` elements without growing.
    ///
    /// Panics with "capacity overflow" if the required slot count exceeds `usize`.
    pub fn with_capacity_and_equality(capacity: usize, equality: E) -> Self {
        Self {
            slots: empty_slots(grown_slot_count(0, capacity, DEFAULT_LOAD_FACTOR)),
            len: 0,
            tombstones: 0,
            load_factor: DEFAULT_LOAD_FACTOR,
            equality,
        }
    }

    /// Returns the equivalence identifying the table's elements.
    pub fn equality(&self) -> &E {
        &self.equality
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots, which is zero or a power of two.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of slots marked as removed.
    pub fn tombstone_count(&self) -> usize {
        self.tombstones
    }

    /// Returns the maximal ratio of elements to slots.
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Sets the maximal ratio of elements to slots and resizes the table to comply with it.
    ///
    /// This can grow as well as shrink the table, releasing all slots of an empty table.
    ///
    /// Panics unless `0.0 < load_factor <= 1.0`.
    pub fn set_load_factor(&mut self, load_factor: f64) {
        assert!(
            load_factor > 0.0 && load_factor <= 1.0,
            "load factor {load_factor} is outside of (0, 1]"
        );
        self.load_factor = load_factor;
        let slot_count = grown_slot_count(self.slots.len(), self.len, load_factor);
        let slot_count = shrunk_slot_count(slot_count, self.len, load_factor);
        if slot_count != self.slots.len() {
            self.rebuild(slot_count);
        }
    }

    /// Removes all elements and releases all slots.
    pub fn clear(&mut self) {
        self.slots = empty_slots(0);
        self.len = 0;
        self.tombstones = 0;
    }

    /// Returns an iterator over all elements, in no particular order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.slots, self.len)
    }

    /// Removes all elements, returning them as an iterator. Releases all slots.
    pub fn drain(&mut self) -> IntoIter<T> {
        let slots = mem::replace(&mut self.slots, empty_slots(0));
        let len = mem::take(&mut self.len);
        self.tombstones = 0;
        IntoIter::new(slots, len)
    }

    /// Reserves slots for `additional` more elements.
    ///
    /// Subsequent removals may shrink the table again.
    ///
    /// Panics with "capacity overflow" if the required slot count exceeds `usize`.
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.len.saturating_add(additional);
        let slot_count = grown_slot_count(self.slots.len(), needed, self.load_factor);
        if slot_count != self.slots.len() {
            self.rebuild(slot_count);
        }
    }

    /// Moves every element into a fresh slot array of the given size, discarding tombstones.
    ///
    /// Uses the cached hashes only, so this never calls into the equivalence.
    fn rebuild(&mut self, slot_count: usize) {
        log::trace!(
            "rebuilding table: {} -> {} slots for {} entries ({} tombstones)",
            self.slots.len(),
            slot_count,
            self.len,
            self.tombstones,
        );
        debug_assert!(slot_count == 0 || slot_count.is_power_of_two());
        debug_assert!(slot_count >= self.len);
        let old_slots = mem::replace(&mut self.slots, empty_slots(slot_count));
        self.tombstones = 0;
        for slot in old_slots.into_vec() {
            if let Slot::Occupied { hash, value } = slot {
                let index = self.find_empty(hash);
                self.slots[index] = Slot::Occupied { hash, value };
            }
        }
    }

    /// Returns the first empty slot along the probe sequence of `hash`.
    fn find_empty(&self, hash: u64) -> usize {
        let mut probe = ProbeSeq::new(hash, self.slots.len());
        while !matches!(self.slots[probe.pos], Slot::Empty) {
            probe.advance();
        }
        probe.pos
    }

    fn shrink_if_underfull(&mut self) {
        let slot_count = shrunk_slot_count(self.slots.len(), self.len, self.load_factor);
        if slot_count != self.slots.len() {
            self.rebuild(slot_count);
        }
    }
}

impl<T, E: Equivalence<T>> ProbeTable<T, E> {
    /// Follows the probe sequence of `item`, returning `Ok` with the index of an equivalent
    /// element or `Err` with the first reusable slot passed, if any.
    fn probe(&self, hash: u64, item: &T) -> Result<usize, Option<usize>> {
        if self.slots.is_empty() {
            return Err(None);
        }
        let mut reusable = None;
        let mut probe = ProbeSeq::new(hash, self.slots.len());
        for _ in 0..self.slots.len() {
            match &self.slots[probe.pos] {
                Slot::Empty => return Err(Some(reusable.unwrap_or(probe.pos))),
                Slot::Tombstone => {
                    reusable.get_or_insert(probe.pos);
                }
                Slot::Occupied {
                    hash: found_hash,
                    value,
                } => {
                    if *found_hash == hash && self.equality.equals(value, item) {
                        return Ok(probe.pos);
                    }
                }
            }
            probe.advance();
        }
        Err(reusable)
    }

    fn find_index(&self, item: &T) -> Option<usize> {
        self.probe(self.equality.hash(item), item).ok()
    }

    fn value_at(&self, index: usize) -> &T {
        match &self.slots[index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("slot {index} is not occupied"),
        }
    }

    fn value_at_mut(&mut self, index: usize) -> &mut T {
        match &mut self.slots[index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("slot {index} is not occupied"),
        }
    }

    /// Inserts an element, using `policy` to decide what happens if an equivalent element is
    /// already present.
    pub fn insert(&mut self, item: T, policy: DuplicatePolicy) -> Insertion<'_, T> {
        let hash = self.equality.hash(&item);
        match self.probe(hash, &item) {
            Ok(index) => match policy {
                DuplicatePolicy::Replace => {
                    Insertion::Replaced(mem::replace(self.value_at_mut(index), item))
                }
                DuplicatePolicy::Preserve => Insertion::Preserved {
                    existing: self.value_at(index),
                    rejected: item,
                },
            },
            Err(reusable) => {
                self.insert_new(hash, item, reusable);
                Insertion::New
            }
        }
    }

    fn insert_new(&mut self, hash: u64, item: T, mut reusable: Option<usize>) {
        let slot_count = grown_slot_count(self.slots.len(), self.len + 1, self.load_factor);
        if slot_count != self.slots.len() {
            self.rebuild(slot_count);
            reusable = None;
        } else if let Some(index) = reusable {
            let fills_empty = matches!(self.slots[index], Slot::Empty);
            if fills_empty
                && self.len + self.tombstones + 1 > used_slot_limit(slot_count, self.load_factor)
            {
                self.rebuild(slot_count);
                reusable = None;
            }
        }

        let index = reusable.unwrap_or_else(|| self.find_empty(hash));
        if matches!(self.slots[index], Slot::Tombstone) {
            self.tombstones -= 1;
        }
        self.slots[index] = Slot::Occupied { hash, value: item };
        self.len += 1;
    }

    /// Inserts all elements of an iterator with the same policy, returning how many were new.
    pub fn insert_all(
        &mut self,
        items: impl IntoIterator<Item = T>,
        policy: DuplicatePolicy,
    ) -> usize {
        let mut added = 0;
        for item in items {
            if self.insert(item, policy).is_new() {
                added += 1;
            }
        }
        added
    }

    /// Returns the stored element equivalent to `item`, if present.
    pub fn find(&self, item: &T) -> Option<&T> {
        self.find_index(item).map(|index| self.value_at(index))
    }

    /// Returns `true` if an element equivalent to `item` is present.
    pub fn contains(&self, item: &T) -> bool {
        self.find_index(item).is_some()
    }

    /// Overwrites the stored element equivalent to `item`, returning the previous element.
    ///
    /// If no equivalent element is present, nothing is inserted and `item` is returned as the
    /// error.
    pub fn replace(&mut self, item: T) -> Result<T, T> {
        match self.find_index(&item) {
            Some(index) => Ok(mem::replace(self.value_at_mut(index), item)),
            None => Err(item),
        }
    }

    /// Removes and returns the stored element equivalent to `item`, if present.
    pub fn remove(&mut self, item: &T) -> Option<T> {
        let index = self.find_index(item)?;
        let Slot::Occupied { value, .. } = mem::replace(&mut self.slots[index], Slot::Tombstone)
        else {
            unreachable!()
        };
        self.len -= 1;
        self.tombstones += 1;
        self.shrink_if_underfull();
        Some(value)
    }

    /// Removes all elements for which `keep` returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        for slot in self.slots.iter_mut() {
            if let Slot::Occupied { value, .. } = slot {
                if !keep(value) {
                    *slot = Slot::Tombstone;
                    self.len -= 1;
                    self.tombstones += 1;
                }
            }
        }
        self.shrink_if_underfull();
    }

    /// Returns a copy of this table that identifies elements using a different equivalence.
    ///
    /// Elements the new equivalence considers duplicates of each other are kept once, with the
    /// one visited first by [`iter`][Self::iter] winning.
    pub fn clone_with<E2: Equivalence<T>>(&self, equality: E2) -> ProbeTable<T, E2>
    where
        T: Clone,
    {
        let mut table = ProbeTable {
            slots: empty_slots(grown_slot_count(0, self.len, self.load_factor)),
            len: 0,
            tombstones: 0,
            load_factor: self.load_factor,
            equality,
        };
        table.insert_all(self.iter().cloned(), DuplicatePolicy::Preserve);
        table.shrink_if_underfull();
        table
    }

    /// Checks the table's internal invariants, panicking if one is violated.
    ///
    /// This is meant for tests and debugging. It runs in time linear in the number of slots and
    /// calls into the equivalence for every element.
    pub fn check(&self) {
        let slot_count = self.slots.len();
        assert!(
            slot_count == 0 || (slot_count.is_power_of_two() && slot_count >= MIN_SLOT_COUNT),
            "invalid slot count {slot_count}"
        );
        assert!(
            self.len as f64 <= self.load_factor * slot_count as f64,
            "{} entries exceed load factor {} for {slot_count} slots",
            self.len,
            self.load_factor,
        );
        let mut occupied = 0;
        let mut tombstones = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Slot::Empty => (),
                Slot::Tombstone => tombstones += 1,
                Slot::Occupied { hash, value } => {
                    occupied += 1;
                    assert_eq!(*hash, self.equality.hash(value), "stale hash in slot {index}");
                    // This also rules out equivalent elements earlier in the probe sequence.
                    assert_eq!(
                        self.probe(*hash, value).ok(),
                        Some(index),
                        "slot {index} is not found by its own probe sequence"
                    );
                }
            }
        }
        assert_eq!(occupied, self.len, "element count mismatch");
        assert_eq!(tombstones, self.tombstones, "tombstone count mismatch");
    }
}

impl<T, E: Equivalence<T>> Extend<T> for ProbeTable<T, E> {
    /// Inserts all elements, replacing equivalent elements already present.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_all(iter, DuplicatePolicy::Replace);
    }
}

impl<T, E: Equivalence<T> + Default> FromIterator<T> for ProbeTable<T, E> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<'a, T, E> IntoIterator for &'a ProbeTable<T, E> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, E> IntoIterator for ProbeTable<T, E> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.slots, self.len)
    }
}
