//! CachedKey: a key bundled with its comparer and a hash computed once.
//!
//! Structural hashing walks the whole value; a key that participates in
//! many container operations (de-duplication across several sets, say)
//! pays that walk every time. `CachedKey` pays it once at construction
//! and is immutable afterward, so a map or set keyed by cached keys
//! never re-enters the structural hash.

use crate::comparer::{Comparer, Equatable, KeyError};

/// A raw key decorated with its comparer and precomputed hash.
pub struct CachedKey<K, C> {
    key: K,
    comparer: C,
    hash: u32,
}

impl<K, C> CachedKey<K, C>
where
    C: Comparer<K>,
{
    /// Hash `key` under `comparer` once and freeze the result. The only
    /// point where hashing can fail for a cached key.
    pub fn new(key: K, comparer: C) -> Result<Self, KeyError> {
        let hash = comparer.hash(&key)?;
        Ok(Self {
            key,
            comparer,
            hash,
        })
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// The hash computed at construction.
    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K, C> Equatable for CachedKey<K, C>
where
    C: Comparer<K>,
{
    fn cached_hash(&self) -> u32 {
        self.hash
    }

    /// Short-circuits on hash inequality before running the inner
    /// comparer's (possibly recursive) equality.
    fn eq_key(&self, other: &Self) -> bool {
        self.hash == other.hash && self.comparer.equals(&self.key, &other.key)
    }
}

/// Comparer over cached keys; an alias-by-intent for
/// [`EquatableComparer`](crate::comparer::EquatableComparer) scoped to
/// this module's type.
#[derive(Debug, Default, Clone, Copy)]
pub struct CachedComparer;

impl<K, C> Comparer<CachedKey<K, C>> for CachedComparer
where
    C: Comparer<K>,
{
    fn hash(&self, key: &CachedKey<K, C>) -> Result<u32, KeyError> {
        Ok(key.hash)
    }

    fn equals(&self, a: &CachedKey<K, C>, b: &CachedKey<K, C>) -> bool {
        a.eq_key(b)
    }
}
