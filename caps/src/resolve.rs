//! Resolution of a type's default ordering and equality.
//!
//! Whether a type can be ordered or compared is declared once, through its [`Capabilities`]
//! implementation. [`default_ordering`] and [`default_equality`] turn such a declaration into a
//! [`Comparer`] or [`Equivalence`] by probing the declared capabilities in a fixed order. A
//! container performs this resolution when it is constructed and keeps the result, so no probing
//! happens per operation.
use std::{
    any::{type_name, Any},
    cmp::Ordering,
    fmt,
    hash::Hash,
};

use collkit_util::hash::{hash_ref, hash_value};

use crate::{Comparer, Equivalence};

/// A typed comparison function.
pub type CompareFn<T> = fn(&T, &T) -> Ordering;

/// An untyped comparison function, comparing a value against an arbitrary other value.
///
/// The second operand is type erased. When used through [`DefaultOrdering`] it is always a `T`,
/// but an implementation can also support comparisons against other types.
pub type ObjectCompareFn<T> = fn(&T, &dyn Any) -> Ordering;

/// A typed equality together with a compatible hash function.
pub struct EqualityFns<T> {
    /// Returns `true` when two values are equal.
    pub equals: fn(&T, &T) -> bool,
    /// Hashes a value. Equal values must have equal hashes.
    pub hash: fn(&T) -> u64,
}

/// An untyped equality together with a compatible hash function.
pub struct ObjectEqualityFns<T> {
    /// Returns `true` when a value is equal to an arbitrary, type erased, other value.
    pub equals: fn(&T, &dyn Any) -> bool,
    /// Hashes a value. Equal values must have equal hashes.
    pub hash: fn(&T) -> u64,
}

impl<T> Clone for EqualityFns<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EqualityFns<T> {}

impl<T> fmt::Debug for EqualityFns<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityFns").finish_non_exhaustive()
    }
}

impl<T> Clone for ObjectEqualityFns<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ObjectEqualityFns<T> {}

impl<T> fmt::Debug for ObjectEqualityFns<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectEqualityFns").finish_non_exhaustive()
    }
}

fn eq_natural<T: Eq>(a: &T, b: &T) -> bool {
    a == b
}

fn hash_natural<T: Hash>(value: &T) -> u64 {
    hash_ref(value)
}

impl<T: Eq + Hash> EqualityFns<T> {
    /// The equality given by `T`'s own [`Eq`] and [`Hash`] implementations.
    pub fn natural() -> Self {
        Self {
            equals: eq_natural::<T>,
            hash: hash_natural::<T>,
        }
    }
}

/// Declares which ordering and equality capabilities a type supports.
///
/// Every method except [`structural_equality`][Self::structural_equality] defaults to "not
/// supported". The [`capabilities!`][crate::capabilities] macro implements this trait for types
/// whose [`Ord`], [`Eq`] and [`Hash`] implementations should be used.
pub trait Capabilities: Sized + 'static {
    /// A total order on `Self`, if the type has one.
    fn typed_ordering() -> Option<CompareFn<Self>> {
        None
    }

    /// A total order comparing `Self` against type erased values, if the type has one.
    ///
    /// Only consulted when [`typed_ordering`][Self::typed_ordering] returns `None`.
    fn object_ordering() -> Option<ObjectCompareFn<Self>> {
        None
    }

    /// An equality and hash on `Self`, if the type has one.
    fn typed_equality() -> Option<EqualityFns<Self>> {
        None
    }

    /// An equality against type erased values and a hash, if the type has one.
    ///
    /// Only consulted when [`typed_equality`][Self::typed_equality] returns `None`.
    fn object_equality() -> Option<ObjectEqualityFns<Self>> {
        None
    }

    /// The equality used when the type declares no other equality.
    fn structural_equality() -> EqualityFns<Self>;
}

/// Error returned when a type's default ordering cannot be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The type declares neither a typed nor an untyped ordering.
    #[error("type `{type_name}` supports neither a typed nor an untyped ordering")]
    NoOrdering {
        /// Name of the type, as returned by [`std::any::type_name`].
        type_name: &'static str,
    },
}

impl ConfigError {
    /// Returns the name of the type that could not be resolved.
    pub fn type_name(&self) -> &'static str {
        match *self {
            ConfigError::NoOrdering { type_name } => type_name,
        }
    }
}

/// The default ordering of a type, as resolved by [`default_ordering`].
pub enum DefaultOrdering<T> {
    /// Uses the type's typed ordering.
    Typed(CompareFn<T>),
    /// Uses the type's untyped ordering, passing the second operand type erased.
    Object(ObjectCompareFn<T>),
}

impl<T> Clone for DefaultOrdering<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DefaultOrdering<T> {}

impl<T> fmt::Debug for DefaultOrdering<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route = match self {
            DefaultOrdering::Typed(_) => "Typed",
            DefaultOrdering::Object(_) => "Object",
        };
        write!(f, "DefaultOrdering::{route}<{}>", type_name::<T>())
    }
}

impl<T: 'static> Comparer<T> for DefaultOrdering<T> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        match *self {
            DefaultOrdering::Typed(compare) => compare(a, b),
            DefaultOrdering::Object(compare) => compare(a, b as &dyn Any),
        }
    }
}

/// The default equality of a type, as resolved by [`default_equality`].
pub enum DefaultEquality<T> {
    /// Uses the type's typed equality.
    Typed(EqualityFns<T>),
    /// Uses the type's untyped equality, passing the second operand type erased.
    Object(ObjectEqualityFns<T>),
    /// Uses the type's structural equality.
    Structural(EqualityFns<T>),
}

impl<T> Clone for DefaultEquality<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DefaultEquality<T> {}

impl<T> fmt::Debug for DefaultEquality<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route = match self {
            DefaultEquality::Typed(_) => "Typed",
            DefaultEquality::Object(_) => "Object",
            DefaultEquality::Structural(_) => "Structural",
        };
        write!(f, "DefaultEquality::{route}<{}>", type_name::<T>())
    }
}

impl<T: 'static> Equivalence<T> for DefaultEquality<T> {
    #[inline]
    fn equals(&self, a: &T, b: &T) -> bool {
        match *self {
            DefaultEquality::Typed(fns) | DefaultEquality::Structural(fns) => (fns.equals)(a, b),
            DefaultEquality::Object(fns) => (fns.equals)(a, b as &dyn Any),
        }
    }

    #[inline]
    fn hash(&self, value: &T) -> u64 {
        match *self {
            DefaultEquality::Typed(fns) | DefaultEquality::Structural(fns) => (fns.hash)(value),
            DefaultEquality::Object(fns) => (fns.hash)(value),
        }
    }
}

/// Resolves the default ordering of `T`.
///
/// Prefers the typed ordering and falls back to the untyped ordering. Fails with
/// [`ConfigError::NoOrdering`] if `T` declares neither.
pub fn default_ordering<T: Capabilities>() -> Result<DefaultOrdering<T>, ConfigError> {
    let ordering = if let Some(compare) = T::typed_ordering() {
        DefaultOrdering::Typed(compare)
    } else if let Some(compare) = T::object_ordering() {
        DefaultOrdering::Object(compare)
    } else {
        let error = ConfigError::NoOrdering {
            type_name: type_name::<T>(),
        };
        log::debug!("{error}");
        return Err(error);
    };
    log::debug!("resolved {ordering:?}");
    Ok(ordering)
}

/// Resolves the default equality of `T`.
///
/// Prefers the typed equality, then the untyped equality, and finally falls back to the
/// structural equality every [`Capabilities`] implementation provides.
pub fn default_equality<T: Capabilities>() -> DefaultEquality<T> {
    let equality = if let Some(fns) = T::typed_equality() {
        DefaultEquality::Typed(fns)
    } else if let Some(fns) = T::object_equality() {
        DefaultEquality::Object(fns)
    } else {
        DefaultEquality::Structural(T::structural_equality())
    };
    log::debug!("resolved {equality:?}");
    equality
}

/// Implements [`Capabilities`] for types.
///
/// * `ord: T, ...` declares `T`'s [`Ord`] as its typed ordering and its [`Eq`] and [`Hash`] as
///   its typed equality.
/// * `eq: T, ...` declares only the typed equality, leaving the type without an ordering.
///
/// In both cases [`Eq`] and [`Hash`] also serve as the structural equality.
#[macro_export]
macro_rules! capabilities {
    (ord: $($ty:ty),* $(,)?) => {$(
        impl $crate::Capabilities for $ty {
            fn typed_ordering() -> Option<$crate::CompareFn<Self>> {
                Some(<Self as Ord>::cmp)
            }
            fn typed_equality() -> Option<$crate::EqualityFns<Self>> {
                Some($crate::EqualityFns::natural())
            }
            fn structural_equality() -> $crate::EqualityFns<Self> {
                $crate::EqualityFns::natural()
            }
        }
    )*};
    (eq: $($ty:ty),* $(,)?) => {$(
        impl $crate::Capabilities for $ty {
            fn typed_equality() -> Option<$crate::EqualityFns<Self>> {
                Some($crate::EqualityFns::natural())
            }
            fn structural_equality() -> $crate::EqualityFns<Self> {
                $crate::EqualityFns::natural()
            }
        }
    )*};
}

capabilities!(ord:
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    bool, char, (), String, &'static str,
);

// Floats use the IEEE 754 total order and compare bit patterns, so `-0.0` and `0.0` are distinct
// and every NaN equals itself.
macro_rules! float_capabilities {
    ($($ty:ty),*) => {$(
        impl Capabilities for $ty {
            fn typed_ordering() -> Option<CompareFn<Self>> {
                Some(<$ty>::total_cmp)
            }
            fn typed_equality() -> Option<EqualityFns<Self>> {
                Some(Self::structural_equality())
            }
            fn structural_equality() -> EqualityFns<Self> {
                fn equals(a: &$ty, b: &$ty) -> bool {
                    a.to_bits() == b.to_bits()
                }
                fn hash(value: &$ty) -> u64 {
                    hash_value(value.to_bits())
                }
                EqualityFns { equals, hash }
            }
        }
    )*};
}

float_capabilities!(f32, f64);

// Containers of ordered, hashable components take their ordering and equality from std.
macro_rules! generic_capabilities {
    ($([$($param:ident),+] $ty:ty),* $(,)?) => {$(
        impl<$($param: Ord + Hash + 'static),+> Capabilities for $ty {
            fn typed_ordering() -> Option<CompareFn<Self>> {
                Some(<Self as Ord>::cmp)
            }
            fn typed_equality() -> Option<EqualityFns<Self>> {
                Some(EqualityFns::natural())
            }
            fn structural_equality() -> EqualityFns<Self> {
                EqualityFns::natural()
            }
        }
    )*};
}

generic_capabilities!(
    [T] Option<T>,
    [T] Vec<T>,
    [A, B] (A, B),
    [A, B, C] (A, B, C),
);
