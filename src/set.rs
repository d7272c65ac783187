//! ProbeSet: a set of keys over the same probing core.

use crate::comparer::{Comparer, KeyError};
use crate::map::{Keys, ProbeMap};
use crate::value::{Value, ValueComparer};

/// Open-addressing set of `K` under a fixed [`Comparer`]. Elements are
/// stored as map keys with a unit value; every invariant is the
/// underlying map's.
pub struct ProbeSet<K, C> {
    map: ProbeMap<K, (), C>,
}

impl ProbeSet<Value, ValueComparer> {
    /// A set over dynamic [`Value`] elements with per-kind comparer
    /// dispatch.
    pub fn new() -> Self {
        Self::with_comparer(ValueComparer)
    }

    /// Build a set from initial elements, deduplicating as it goes.
    pub fn from_elements<I>(elements: I) -> Result<Self, KeyError>
    where
        I: IntoIterator<Item = Value>,
    {
        Self::with_elements(ValueComparer, elements)
    }
}

impl Default for ProbeSet<Value, ValueComparer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> ProbeSet<K, C>
where
    C: Comparer<K>,
{
    pub fn with_comparer(comparer: C) -> Self {
        Self {
            map: ProbeMap::with_comparer(comparer),
        }
    }

    /// Build a set from initial elements under an explicit comparer.
    pub fn with_elements<I>(comparer: C, elements: I) -> Result<Self, KeyError>
    where
        I: IntoIterator<Item = K>,
    {
        let mut set = Self::with_comparer(comparer);
        for element in elements {
            set.insert(element)?;
        }
        Ok(set)
    }

    /// Add an element. Returns whether it was newly added; re-adding a
    /// present element leaves the set unchanged.
    pub fn insert(&mut self, element: K) -> Result<bool, KeyError> {
        Ok(self.map.set(element, ())?.is_none())
    }

    pub fn contains(&self, element: &K) -> Result<bool, KeyError> {
        self.map.contains_key(element)
    }

    /// Remove an element; `Ok(false)` when it was absent.
    pub fn remove(&mut self, element: &K) -> Result<bool, KeyError> {
        Ok(self.map.delete(element)?.is_some())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear()
    }

    /// Elements in table-slot order.
    pub fn iter(&self) -> Keys<'_, K, ()> {
        self.map.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: the set deduplicates by structural equality, not by
    /// instance identity.
    #[test]
    fn structural_dedup() {
        let mut s = ProbeSet::new();
        let a = Value::Record(vec![("x".into(), Value::Int(1))]);
        let b = Value::Record(vec![("x".into(), Value::Int(1))]);
        assert!(s.insert(a).unwrap());
        assert!(!s.insert(b).unwrap());
        assert_eq!(s.len(), 1);
    }

    /// Invariant: construction from elements deduplicates and preserves
    /// the remove/contains contract.
    #[test]
    fn from_elements_dedups() {
        let mut s = ProbeSet::from_elements(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(1),
            Value::Text("a".into()),
        ])
        .unwrap();
        assert_eq!(s.len(), 3);
        assert!(s.contains(&Value::Int(1)).unwrap());
        assert!(s.remove(&Value::Int(1)).unwrap());
        assert!(!s.remove(&Value::Int(1)).unwrap());
        assert_eq!(s.len(), 2);
    }
}
