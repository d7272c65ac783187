//! Comparer: the pluggable key-equality/hash strategy.
//!
//! A `Comparer<K>` pairs a deterministic 32-bit hash function with an
//! equality predicate for a key type. The map fixes its comparer at
//! construction time and never swaps it; every probe, insert, and delete
//! goes through the same strategy, so the usual hash/equals contract
//! applies: `equals(a, b)` must imply `hash(a) == hash(b)`. A comparer
//! that breaks the contract makes keys unfindable, which is a caller
//! error, not a container bug.

use core::fmt;

use crate::value::KeyKind;

/// Errors surfaced by comparers and, through them, by container
/// operations that need to hash a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Automatic comparer dispatch could not classify the key's kind.
    /// Raised for identity-only (opaque) keys, including ones nested
    /// inside a composite value. Not recoverable by the container; the
    /// caller must supply an explicit comparer.
    UnsupportedKeyKind(KeyKind),
    /// The comparer's hash function is undefined for the key it was
    /// handed, e.g. a typed comparer applied outside its kind. Fatal for
    /// the operation, not for the container.
    InvalidHash,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::UnsupportedKeyKind(kind) => {
                write!(f, "no comparer for key kind {kind}")
            }
            KeyError::InvalidHash => f.write_str("comparer hash undefined for key"),
        }
    }
}

impl std::error::Error for KeyError {}

/// Hash-plus-equality strategy for a key type.
///
/// `hash` is fallible: the dynamic-value comparers refuse keys outside
/// their domain rather than coercing them. `equals` is total; comparing
/// keys of mismatched kinds simply yields `false`.
pub trait Comparer<K> {
    /// Deterministic unsigned 32-bit hash of `key`.
    fn hash(&self, key: &K) -> Result<u32, KeyError>;

    /// Whether `a` and `b` denote the same key. The first operand is
    /// always the stored key, the second the probe key.
    fn equals(&self, a: &K, b: &K) -> bool;
}

impl<K, C: Comparer<K> + ?Sized> Comparer<K> for &C {
    fn hash(&self, key: &K) -> Result<u32, KeyError> {
        (**self).hash(key)
    }
    fn equals(&self, a: &K, b: &K) -> bool {
        (**self).equals(a, b)
    }
}

/// Capability trait for keys that carry their own hash and equality,
/// e.g. [`CachedKey`](crate::CachedKey). Implementing this trait is the
/// capability check: containers dispatch on the impl instead of probing
/// a value for suitably named members.
pub trait Equatable {
    /// The hash computed when the key was constructed.
    fn cached_hash(&self) -> u32;

    /// Equality consistent with `cached_hash`.
    fn eq_key(&self, other: &Self) -> bool;
}

/// Comparer over any [`Equatable`] key. Stateless; hashing never fails
/// because the key already paid the hashing cost at construction.
#[derive(Debug, Default, Clone, Copy)]
pub struct EquatableComparer;

impl<K: Equatable> Comparer<K> for EquatableComparer {
    fn hash(&self, key: &K) -> Result<u32, KeyError> {
        Ok(key.cached_hash())
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        a.eq_key(b)
    }
}
