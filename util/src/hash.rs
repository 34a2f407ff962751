//! Utilities for computing hashes.
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

use zwohash::ZwoHasher;

/// The [`BuildHasher`] used whenever collkit needs to hash a value without being told how.
pub type DefaultBuildHasher = BuildHasherDefault<ZwoHasher>;

/// Computes the hash of a value using collkit's default hasher.
#[inline]
pub fn hash_value<T: Hash>(value: T) -> u64 {
    DefaultBuildHasher::default().hash_one(value)
}

/// Computes the hash of a reference using collkit's default hasher.
///
/// This forwards to [`hash_value`]. Restricting the argument to be a reference is occasionally
/// useful for type inference or for avoiding warnings.
#[inline]
pub fn hash_ref<T: Hash + ?Sized>(value: &T) -> u64 {
    hash_value(value)
}

/// Combines two hashes into one, in an order dependent way.
///
/// Used for hashing compound keys from the hashes of their components.
#[inline]
pub fn combine_hashes(first: u64, second: u64) -> u64 {
    hash_value((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_is_order_dependent() {
        let a = hash_ref("a");
        let b = hash_ref("b");
        assert_ne!(combine_hashes(a, b), combine_hashes(b, a));
        assert_eq!(combine_hashes(a, b), combine_hashes(a, b));
    }

    #[test]
    fn ref_and_value_agree() {
        assert_eq!(hash_ref(&17u32), hash_value(17u32));
        assert_eq!(hash_ref("xyz"), hash_value("xyz"));
    }
}
