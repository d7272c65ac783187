//! ProbeMap: the open-addressing core.
//!
//! Layout is a single slot array. A slot is `Empty` (never written since
//! the last rebuild), `Tombstone` (deleted; key, value, and hash already
//! dropped), or `Live`. Probing is linear with wrap-around: a lookup
//! walks from `hash % capacity`, skipping tombstones, and gives up at
//! the first `Empty` slot or after visiting every slot once.
//!
//! Invariants the rest of the crate leans on:
//! - `len < capacity` after every public mutation, so an insertion scan
//!   always finds a non-live slot and probing terminates.
//! - Every live entry carries the `u32` hash computed when it was
//!   inserted; a rebuild indexes by the stored hash and never
//!   re-enters the comparer, so a resize runs no user code.
//! - For every live key, the linear walk from its hash reaches its slot
//!   before reaching an `Empty` slot. Deletion preserves this by leaving
//!   a tombstone instead of emptying the slot; only a rebuild compacts.

use crate::comparer::{Comparer, KeyError};
use crate::value::{Value, ValueComparer};

pub(crate) const MIN_CAPACITY: usize = 2;

// Load factor 0.8, kept in integer math: grow when len/capacity >= 4/5.
const LOAD_NUM: usize = 4;
const LOAD_DEN: usize = 5;

#[derive(Debug)]
enum Slot<K, V> {
    Empty,
    Tombstone,
    Live(Entry<K, V>),
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u32,
}

fn alloc_slots<K, V>(capacity: usize) -> Box<[Slot<K, V>]> {
    (0..capacity).map(|_| Slot::Empty).collect()
}

/// Open-addressing map from `K` to `V` under a fixed [`Comparer`].
pub struct ProbeMap<K, V, C> {
    slots: Box<[Slot<K, V>]>,
    len: usize,
    comparer: C,
}

impl<V> ProbeMap<Value, V, ValueComparer> {
    /// A map over dynamic [`Value`] keys with per-kind comparer
    /// dispatch.
    pub fn new() -> Self {
        Self::with_comparer(ValueComparer)
    }
}

impl<V> Default for ProbeMap<Value, V, ValueComparer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> ProbeMap<K, V, C>
where
    C: Comparer<K>,
{
    pub fn with_comparer(comparer: C) -> Self {
        Self::with_comparer_and_capacity(comparer, MIN_CAPACITY)
    }

    /// `capacity` is rounded up to a power of two, never below the
    /// minimum of 2.
    pub fn with_comparer_and_capacity(comparer: C, capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY).next_power_of_two();
        Self {
            slots: alloc_slots(capacity),
            len: 0,
            comparer,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current slot count. Growth is contractual (doubling at load
    /// factor 0.8), so callers may observe it.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Linear probe for a live entry matching `key` under `hash`.
    /// Tombstones do not end the scan; an `Empty` slot or a full wrap
    /// of the table does.
    fn find_live(&self, hash: u32, key: &K) -> Option<usize> {
        let capacity = self.slots.len();
        let mut idx = hash as usize % capacity;
        for _ in 0..capacity {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Live(entry) => {
                    if entry.hash == hash && self.comparer.equals(&entry.key, key) {
                        return Some(idx);
                    }
                }
            }
            idx = (idx + 1) % capacity;
        }
        None
    }

    /// Look the key up; `Ok(None)` means absent.
    pub fn get(&self, key: &K) -> Result<Option<&V>, KeyError> {
        let hash = self.comparer.hash(key)?;
        Ok(self.find_live(hash, key).map(|idx| match &self.slots[idx] {
            Slot::Live(entry) => &entry.value,
            _ => unreachable!("find_live returned a non-live slot"),
        }))
    }

    /// `get` with only the found signal; no side effects.
    pub fn contains_key(&self, key: &K) -> Result<bool, KeyError> {
        let hash = self.comparer.hash(key)?;
        Ok(self.find_live(hash, key).is_some())
    }

    /// Insert or overwrite. Returns the previous value when the key was
    /// already live. New entries prefer the first tombstone seen during
    /// the scan, which bounds growth under delete/reinsert churn; the
    /// match scan still runs to its natural end first so a tombstone
    /// never shadows a live duplicate further down the chain.
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>, KeyError> {
        let hash = self.comparer.hash(&key)?;
        let capacity = self.slots.len();
        let mut idx = hash as usize % capacity;
        let mut matched = None;
        let mut first_tombstone = None;
        let mut virgin = None;
        for _ in 0..capacity {
            match &self.slots[idx] {
                Slot::Empty => {
                    virgin = Some(idx);
                    break;
                }
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(idx);
                    }
                }
                Slot::Live(entry) => {
                    if entry.hash == hash && self.comparer.equals(&entry.key, &key) {
                        matched = Some(idx);
                        break;
                    }
                }
            }
            idx = (idx + 1) % capacity;
        }

        if let Some(idx) = matched {
            if let Slot::Live(entry) = &mut self.slots[idx] {
                return Ok(Some(core::mem::replace(&mut entry.value, value)));
            }
            unreachable!("matched slot is live");
        }

        // len < capacity, so the scan saw a tombstone or an empty slot.
        let dst = match first_tombstone.or(virgin) {
            Some(idx) => idx,
            None => unreachable!("probe found no free slot"),
        };
        self.slots[dst] = Slot::Live(Entry { key, value, hash });
        self.len += 1;
        if self.len * LOAD_DEN >= self.slots.len() * LOAD_NUM {
            self.grow(self.slots.len() * 2);
        }
        Ok(None)
    }

    /// Delete the key. The slot becomes a tombstone; key, value, and
    /// hash are dropped immediately. Returns the removed value, or
    /// `Ok(None)` when no live entry matched. Capacity never shrinks and
    /// live entries are never back-shifted; the next rebuild compacts.
    pub fn delete(&mut self, key: &K) -> Result<Option<V>, KeyError> {
        let hash = self.comparer.hash(key)?;
        match self.find_live(hash, key) {
            Some(idx) => {
                let slot = core::mem::replace(&mut self.slots[idx], Slot::Tombstone);
                self.len -= 1;
                match slot {
                    Slot::Live(entry) => Ok(Some(entry.value)),
                    _ => unreachable!("find_live returned a non-live slot"),
                }
            }
            None => Ok(None),
        }
    }

    /// Drop every entry and reset to the minimum capacity.
    pub fn clear(&mut self) {
        self.slots = alloc_slots(MIN_CAPACITY);
        self.len = 0;
    }

    /// Rebuild into `new_capacity` slots. Re-places every live entry by
    /// its stored hash (the comparer is never consulted) and drops
    /// tombstones; this is the only operation that compacts the table.
    fn grow(&mut self, new_capacity: usize) {
        let old = core::mem::replace(&mut self.slots, alloc_slots(new_capacity));
        for slot in old.into_vec() {
            if let Slot::Live(entry) = slot {
                let mut idx = entry.hash as usize % new_capacity;
                while matches!(self.slots[idx], Slot::Live(_)) {
                    idx = (idx + 1) % new_capacity;
                }
                self.slots[idx] = Slot::Live(entry);
            }
        }
    }

    /// Live entries in table-slot order. Slot order is not insertion
    /// order and changes across rebuilds.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

/// Iterator over live `(key, value)` pairs in slot order.
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Live(entry) = slot {
                return Some((&entry.key, &entry.value));
            }
        }
        None
    }
}

/// Iterator over live keys in slot order.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// Iterator over live values in slot order.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}
