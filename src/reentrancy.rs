//! Debug-only reentrancy guard for ChainedHashTable.
//!
//! The table runs caller code in the middle of its own bookkeeping:
//! - `K: Hash` and `K: Eq` while `find` walks a chain (get, insert, upsert)
//!   and while `unlink` holds a predecessor link it is about to patch;
//! - `K: Ord` for every key during the `range_keys` scan;
//! - `K: Clone`/`V: Clone` while `clone_from` refills a cleared table.
//!
//! If that code reaches back into the same table, debug builds panic at the
//! nested `enter` instead of letting it observe or modify a chain mid-walk.
//! `remove` releases its guard before dropping the removed key, so `Drop`
//! for `K` may use the table. Release builds compile the guard to nothing.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table depth counter. Every table method that walks chains or runs
/// key code takes `let _g = self.reentrancy.enter();` first.
#[derive(Debug)]
pub struct DebugReentrancy {
    #[cfg(debug_assertions)]
    depth: Cell<u32>,
    // !Sync in every build profile; Send is kept so callers can move a
    // table behind their own lock.
    _nosync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            depth: Cell::new(0),
            _nosync: PhantomData,
        }
    }

    /// Enter a guarded section. Panics in debug builds if already inside one.
    #[inline]
    pub fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            let d = self.depth.get();
            assert!(d == 0, "reentrancy detected: nested entry into hash table");
            self.depth.set(d + 1);
            ReentrancyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            ReentrancyGuard { _z: PhantomData }
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `DebugReentrancy::enter`.
pub struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let d = self.owner.depth.get();
            debug_assert!(d > 0);
            self.owner.depth.set(d - 1);
        }
    }
}
