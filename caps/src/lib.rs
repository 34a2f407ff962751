//! Ordering and equality abstractions for collkit's containers.
//!
//! Containers never call `Ord::cmp` or `Hash::hash` on their elements directly. Instead they hold
//! a [`Comparer`] or an [`Equivalence`] for the element type, chosen once when the container is
//! built. This crate provides:
//!
//! * the two abstraction traits, plus [`Natural`] which forwards to `Ord`, `Eq` and `Hash`,
//! * [`default_ordering`] and [`default_equality`], which resolve the abstractions a type
//!   declares through its [`Capabilities`] implementation,
//! * composers that build abstractions for compound keys from abstractions for their
//!   components: [`KeyOnly`], [`Lexicographic`], [`Lexicographic3`], [`Reversed`] and
//!   [`FnComparer`].
//!
//! All of these are plain values without interior state, so they can be cached and shared
//! freely.
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

mod abstraction;
mod compose;
mod resolve;

mod test_compose;
mod test_resolve;

pub use abstraction::{Comparer, Equivalence, Natural};
pub use compose::{
    from_fn, key_only, lexicographic, lexicographic3, FnComparer, KeyOnly, Lexicographic,
    Lexicographic3, Reversed,
};
pub use resolve::{
    default_equality, default_ordering, Capabilities, CompareFn, ConfigError, DefaultEquality,
    DefaultOrdering, EqualityFns, ObjectCompareFn, ObjectEqualityFns,
};
