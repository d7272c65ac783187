//! probe-map: a single-threaded, open-addressing map with linear
//! probing, tombstone deletion, and a pluggable key-equality strategy.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the probing core small and auditable while letting
//!   callers decide what key equality means, down to structural
//!   comparison of composite values.
//! - Layers:
//!   - Comparer<K>: a hash-plus-equals strategy, fixed per container at
//!     construction. Built-in comparers cover numbers, text, booleans,
//!     and structural comparison of composite values; `ValueComparer`
//!     dispatches over the closed set of dynamic key kinds.
//!   - ProbeMap<K, V, C>: the table itself. One slot array, linear
//!     probing, tombstones on delete, rebuild on growth. This is the
//!     only layer with real invariants.
//!   - ProbeSet<K, C> and CachedKey<K, C>: thin adapters. The set
//!     stores elements as map keys with a unit value; the cached key
//!     precomputes a hash once for reuse across operations.
//!
//! Constraints
//! - Single-threaded: no locking, no atomics; callers serialize access.
//! - Load factor is a fixed 0.8; capacity starts at 2 and only ever
//!   doubles. `clear` resets to the minimum.
//! - Probing invariant: every live key is reachable from
//!   `hash % capacity` by linear scan before any never-written slot.
//!   Deletion preserves it with tombstones; only a rebuild compacts.
//!
//! Hashing and rehashing invariants
//! - Each live entry stores the `u32` hash computed when it was
//!   inserted. Lookups compare stored hashes before running the
//!   comparer's equality, and rebuilds index purely by stored hash, so
//!   no user code runs during a resize.
//! - Comparers must uphold the usual contract: equal keys hash equal.
//!   The built-ins do; a caller-supplied comparer that does not makes
//!   its keys unfindable, which is a caller error.
//!
//! Error surface
//! - Hashing is fallible: automatic dispatch reports
//!   `UnsupportedKeyKind` for identity-only (opaque) keys, and a typed
//!   comparer applied outside its kind reports `InvalidHash`. Failures
//!   surface synchronously from the triggering operation and never
//!   leave the table half-mutated.
//!
//! Notes and non-goals
//! - No persistence, no concurrent mutation, no iteration-order
//!   guarantee (iteration is table-slot order), no cryptographic hash
//!   strength.
//! - Structural comparison recurses without a cycle guard. `Value` is
//!   an owned tree, so cyclic keys cannot be constructed here.
//! - Record equality examines only the first operand's fields; a record
//!   can compare equal to a wider one. Kept deliberately; see
//!   DESIGN.md.

pub mod cached_key;
pub mod comparer;
pub mod map;
mod map_proptest;
pub mod set;
pub mod value;

// Public surface
pub use cached_key::{CachedComparer, CachedKey};
pub use comparer::{Comparer, Equatable, EquatableComparer, KeyError};
pub use map::ProbeMap;
pub use set::ProbeSet;
pub use value::{
    BoolComparer, KeyKind, NumberComparer, StructuralComparer, TextComparer, Value, ValueComparer,
};
