//! chained-table: a single-threaded hash table with separate chaining,
//! doubling growth, and range/sorted key listing.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a generic key/value table whose collision chains are easy to
//!   reason about and cannot dangle, behind a small associative-container
//!   trait (`Collection`).
//! - Layers:
//!   - Chains<K, V>: bucket heads (`Vec<Option<DefaultKey>>`) plus a
//!     `SlotMap` arena of entries. Each entry stores its key, value,
//!     cached hash, and the arena key of the next entry in its chain.
//!   - ChainedHashTable<K, V, S>: hashing, the load-factor policy, the
//!     public operations, value semantics (Clone/clone_from/try_clone)
//!     and a debug-only reentrancy guard.
//!   - Collection<K, V>: the abstract insert/remove/find/range/keys/sort/
//!     size contract, implemented by ChainedHashTable.
//!
//! Constraints
//! - Single-threaded: the table is `Send` but `!Sync`. Sharing it across
//!   threads is the caller's job (wrap it in a `Mutex`).
//! - Unique keys. Inserting an existing key replaces its value (upsert).
//! - `bucket == hash(key) % capacity` for every entry after every
//!   operation; the entry count equals the number of entries reachable
//!   through the chains.
//! - After an insert, `len / capacity <= threshold` (default 0.75).
//!   Capacity starts at 16 (configurable via `TableConfig`), only grows,
//!   and grows by doubling.
//!
//! Growth and rehashing
//! - The threshold check uses the count the table would have after the
//!   pending insert, and only inserts that add an entry can trigger it.
//! - The new bucket array is allocated before any entry is touched. Each
//!   entry is then relinked at `cached_hash % new_capacity`. Relinking
//!   calls no user code and cannot fail, so a table is never observed
//!   half-grown. `try_insert`/`try_clone` reserve the arena slots and the
//!   bucket array up front, surface a failed reservation as `TableError`
//!   and leave the table untouched.
//!
//! Removal
//! - Unlinking patches either the bucket head or the predecessor's `next`
//!   field, then removes the entry from the arena. Stale arena keys are
//!   generational and cannot alias a later entry.
//! - The removed key is dropped after the guard is released, so `Drop`
//!   for `K` may call back into the table.
//!
//! Range and sort
//! - `range_keys(low, high)` is a full scan of every bucket and chain;
//!   hashing gives no ordering. Inverted bounds return an empty list.
//! - `sorted_keys()` is `keys()` followed by a stable ascending sort.
//!
//! Copying
//! - `Clone` builds a fresh bucket array and arena and re-inserts every
//!   pair. Nothing is shared with the source.
//! - `clone_from` drops the destination's entries first. Passing a table
//!   as its own source is ruled out by the borrow checker.
//!
//! Reentrancy policy
//! - `K: Hash`, `K: Eq` and `K: Ord` run while chains are walked. In
//!   debug builds, re-entering the same table from that code panics.
//!   Release builds compile the guard away.
//!
//! Logging
//! - Growth is reported at `debug` level and clears/copies at `trace`
//!   level through the `log` facade. The crate installs no logger.

pub mod chained_table;
mod chained_table_proptest;
pub mod collection;
pub mod config;
pub mod error;
mod reentrancy;

// Public surface
pub use chained_table::{ChainedHashTable, Iter, IterMut};
pub use collection::Collection;
pub use config::{TableConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR};
pub use error::{ConfigError, TableError};
pub use reentrancy::{DebugReentrancy, ReentrancyGuard};
