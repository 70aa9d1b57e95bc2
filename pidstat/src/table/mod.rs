//! In-process stats tables
//!
//! Userspace implementations of [`StatsTable`](pidstat_common::StatsTable)
//! with the same observable behavior as the kernel maps behind the two probe
//! variants:
//!
//! - [`HashTable`] - `BPF_MAP_TYPE_HASH`: inserts of new pids fail with
//!   `-E2BIG` once full
//! - [`LruTable`] - `BPF_MAP_TYPE_LRU_HASH`: inserting a new pid into a full
//!   table evicts the least recently looked-up or inserted pid
//!
//! Both hand out pointers into a fixed slot array, like map value pointers,
//! so a pointer obtained before an eviction keeps pointing at the reused
//! slot. They are single-threaded (`!Sync`): they reproduce the map
//! semantics the aggregator relies on, not cross-CPU interleavings.
//!
//! Used to run the exact hook code from `pidstat-common` without loading
//! anything into the kernel.

mod hash;
mod lru;

pub use hash::HashTable;
pub use lru::LruTable;

use pidstat_common::Stats;
use std::cell::UnsafeCell;

/// Errno returned by a full kernel hash map on insert of a new key.
pub(crate) const FULL_TABLE_ERRNO: i64 = -(libc::E2BIG as i64);

/// Fixed array of records; slot addresses never move.
struct Slots {
    cells: Box<[UnsafeCell<Stats>]>,
}

#[allow(unsafe_code)]
impl Slots {
    fn new(capacity: usize) -> Self {
        Self { cells: (0..capacity).map(|_| UnsafeCell::new(Stats::ZERO)).collect() }
    }

    fn ptr(&self, slot: usize) -> *mut Stats {
        self.cells[slot].get()
    }

    fn read(&self, slot: usize) -> Stats {
        // SAFETY: single-threaded, and no reference into the cell outlives a call
        unsafe { *self.cells[slot].get() }
    }

    fn write(&self, slot: usize, stats: &Stats) {
        // SAFETY: see `read`
        unsafe { *self.cells[slot].get() = *stats }
    }
}
