//! Table capability shared by both eviction policies.

use crate::Stats;

/// A keyed store of [`Stats`] records indexed by pid
///
/// Mirrors the two map helpers an eBPF program gets: a lookup returning a
/// pointer into map memory, and an insert-or-overwrite. Neither is atomic
/// with the other, and writes through the returned pointer are plain stores.
///
/// Implemented for the kernel `HashMap` (reject new keys when full) and
/// `LruHashMap` (evict the least recently used key when full) behind the
/// `ebpf` feature.
pub trait StatsTable {
    /// Pointer to the record stored for `pid`, or `None` if there is none.
    ///
    /// A successful lookup counts as a use for LRU purposes.
    fn lookup(&self, pid: u32) -> Option<*mut Stats>;

    /// Store `stats` under `pid`, overwriting any existing record.
    ///
    /// # Errors
    /// Returns the negative errno reported by the map when the insert is
    /// rejected, e.g. `-E2BIG` for a full hash map.
    fn upsert(&self, pid: u32, stats: &Stats) -> Result<(), i64>;
}

#[cfg(feature = "ebpf")]
mod kernel {
    use aya_ebpf::maps::{HashMap, LruHashMap};

    use super::StatsTable;
    use crate::{Stats, BPF_ANY};

    impl StatsTable for HashMap<u32, Stats> {
        #[inline(always)]
        fn lookup(&self, pid: u32) -> Option<*mut Stats> {
            self.get_ptr_mut(&pid)
        }

        #[inline(always)]
        fn upsert(&self, pid: u32, stats: &Stats) -> Result<(), i64> {
            self.insert(&pid, stats, BPF_ANY).map_err(i64::from)
        }
    }

    impl StatsTable for LruHashMap<u32, Stats> {
        #[inline(always)]
        fn lookup(&self, pid: u32) -> Option<*mut Stats> {
            self.get_ptr_mut(&pid)
        }

        #[inline(always)]
        fn upsert(&self, pid: u32, stats: &Stats) -> Result<(), i64> {
            self.insert(&pid, stats, BPF_ANY).map_err(i64::from)
        }
    }
}
