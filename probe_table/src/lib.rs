//! [`ProbeTable`] is the open addressing hash table backing collkit's unordered containers.
//!
//! All entries live in a single flat array of slots whose length is zero or a power of two. A
//! lookup starts at a slot determined by the element's hash and follows a triangular probe
//! sequence, which visits every slot of a power of two sized array exactly once. Removed entries
//! leave tombstones behind, so that probe sequences passing through them keep working. Tombstones
//! are discarded whenever the table is rebuilt.
//!
//! Elements are identified by an [`Equivalence`] supplied when the table is constructed, usually
//! obtained from [`collkit_caps`]. The table caches each element's hash next to it, so growing or
//! shrinking never calls back into the equivalence.
//!
//! The table keeps `len / slot_count` at or below a configurable load factor, doubling the slot
//! array when an insertion would exceed it. Removals halve the slot array once the table is
//! sufficiently underfull, and the slot array is released entirely when the last element is
//! removed.
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

mod iter;
mod policy;
mod table;

mod test_table;

#[cfg(doc)]
use collkit_caps::Equivalence;

pub use iter::{IntoIter, Iter};
pub use policy::{DuplicatePolicy, Insertion, DEFAULT_LOAD_FACTOR, MIN_SLOT_COUNT};
pub use table::ProbeTable;
