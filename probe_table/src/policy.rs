//! Duplicate handling and the resize policy.

/// The load factor of newly created tables.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.7;

/// The smallest non-zero slot count of a table.
pub const MIN_SLOT_COUNT: usize = 16;

// A table shrinks once it is less than a third as full as the load factor allows, so after
// halving it is still at most two thirds as full as allowed.
const SHRINK_DIVISOR: f64 = 3.0;

/// What [`insert`][crate::ProbeTable::insert] does when an equivalent element is already present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DuplicatePolicy {
    /// Overwrite the stored element with the inserted one.
    Replace,
    /// Keep the stored element and hand back the inserted one.
    Preserve,
}

/// The outcome of an [`insert`][crate::ProbeTable::insert].
#[derive(Debug, PartialEq, Eq)]
pub enum Insertion<'a, T> {
    /// No equivalent element was present, the element was added.
    New,
    /// An equivalent element was present and got overwritten. Contains the previous element.
    Replaced(T),
    /// An equivalent element was present and was kept.
    Preserved {
        /// The stored element.
        existing: &'a T,
        /// The element passed to `insert`.
        rejected: T,
    },
}

impl<T> Insertion<'_, T> {
    /// Returns `true` if the table gained a new entry.
    pub fn is_new(&self) -> bool {
        matches!(self, Insertion::New)
    }

    /// Returns the element that was stored before the insertion, if there was one.
    pub fn previous(&self) -> Option<&T> {
        match self {
            Insertion::New => None,
            Insertion::Replaced(previous) => Some(previous),
            Insertion::Preserved { existing, .. } => Some(*existing),
        }
    }
}

#[inline]
fn exceeds(len: usize, load_factor: f64, slot_count: usize) -> bool {
    len as f64 > load_factor * slot_count as f64
}

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

/// Returns the slot count needed to hold `len` elements, never going below `slot_count`.
///
/// Panics if that count is not representable.
pub(crate) fn grown_slot_count(slot_count: usize, len: usize, load_factor: f64) -> usize {
    if len == 0 {
        return slot_count;
    }
    let mut slot_count = slot_count.max(MIN_SLOT_COUNT);
    while exceeds(len, load_factor, slot_count) {
        slot_count = slot_count
            .checked_mul(2)
            .unwrap_or_else(|| capacity_overflow());
    }
    slot_count
}

/// Returns the slot count a table holding `len` elements should shrink to, never going above
/// `slot_count`.
pub(crate) fn shrunk_slot_count(slot_count: usize, len: usize, load_factor: f64) -> usize {
    if len == 0 {
        return 0;
    }
    let mut slot_count = slot_count;
    while slot_count > MIN_SLOT_COUNT
        && (len as f64) < load_factor * slot_count as f64 / SHRINK_DIVISOR
    {
        slot_count /= 2;
    }
    slot_count
}

/// Returns the number of occupied slots plus tombstones at which a table gets rebuilt in place.
pub(crate) fn used_slot_limit(slot_count: usize, load_factor: f64) -> usize {
    let limit = ((1.0 + load_factor) / 2.0 * slot_count as f64) as usize;
    limit.min(slot_count.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_doubles_from_minimum() {
        assert_eq!(grown_slot_count(0, 1, DEFAULT_LOAD_FACTOR), 16);
        assert_eq!(grown_slot_count(0, 11, DEFAULT_LOAD_FACTOR), 16);
        assert_eq!(grown_slot_count(16, 12, DEFAULT_LOAD_FACTOR), 32);
        assert_eq!(grown_slot_count(0, 1000, DEFAULT_LOAD_FACTOR), 2048);
        assert_eq!(grown_slot_count(1024, 717, DEFAULT_LOAD_FACTOR), 2048);
        assert_eq!(grown_slot_count(1024, 716, DEFAULT_LOAD_FACTOR), 1024);
        assert_eq!(grown_slot_count(64, 0, DEFAULT_LOAD_FACTOR), 64);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn growth_beyond_usize_panics() {
        grown_slot_count(0, usize::MAX, DEFAULT_LOAD_FACTOR);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn tiny_load_factor_growth_panics() {
        grown_slot_count(16, 1, 1e-300);
    }

    #[test]
    fn shrinking_keeps_hysteresis() {
        assert_eq!(shrunk_slot_count(2048, 477, DEFAULT_LOAD_FACTOR), 1024);
        assert_eq!(shrunk_slot_count(2048, 478, DEFAULT_LOAD_FACTOR), 2048);
        assert_eq!(shrunk_slot_count(1024, 400, DEFAULT_LOAD_FACTOR), 1024);
        assert_eq!(shrunk_slot_count(128, 20, DEFAULT_LOAD_FACTOR), 64);
        assert_eq!(shrunk_slot_count(64, 20, DEFAULT_LOAD_FACTOR), 64);
        assert_eq!(shrunk_slot_count(2048, 1, DEFAULT_LOAD_FACTOR), 16);
        assert_eq!(shrunk_slot_count(16, 0, DEFAULT_LOAD_FACTOR), 0);

        for load_factor in [0.25, 0.5, DEFAULT_LOAD_FACTOR, 0.9, 1.0] {
            for len in 1..5000 {
                let grown = grown_slot_count(0, len, load_factor);
                assert_eq!(shrunk_slot_count(grown, len, load_factor), grown);
            }
        }
    }

    #[test]
    fn used_slot_limit_leaves_room() {
        assert_eq!(used_slot_limit(16, DEFAULT_LOAD_FACTOR), 13);
        assert_eq!(used_slot_limit(16, 1.0), 15);
        assert_eq!(used_slot_limit(0, 1.0), 0);
        for slot_count in [16, 32, 1024] {
            for load_factor in [0.1, 0.5, DEFAULT_LOAD_FACTOR, 1.0] {
                let limit = used_slot_limit(slot_count, load_factor);
                assert!(limit < slot_count);
                assert!(limit as f64 >= load_factor * slot_count as f64 - 1.0);
            }
        }
    }
}
