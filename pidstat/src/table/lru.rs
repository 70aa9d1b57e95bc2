use pidstat_common::{Stats, StatsTable, MAX_TRACKED_PIDS};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::Slots;
use crate::domain::Pid;
use crate::stats::Snapshot;

struct Entry {
    slot: usize,
    last_used: u64,
}

/// Evict-on-full table, modelled on `BPF_MAP_TYPE_LRU_HASH`
///
/// Lookups and inserts from the probe side mark a pid as used. [`get`] and
/// [`snapshot`] are userspace reads and leave recency untouched.
///
/// [`get`]: LruTable::get
/// [`snapshot`]: LruTable::snapshot
pub struct LruTable {
    capacity: usize,
    slots: Slots,
    index: RefCell<HashMap<u32, Entry>>,
    clock: Cell<u64>,
}

impl LruTable {
    /// Table with the probe's capacity of [`MAX_TRACKED_PIDS`] entries.
    pub fn new() -> Self {
        Self::with_capacity(MAX_TRACKED_PIDS as usize)
    }

    /// # Panics
    /// Panics if `capacity` is zero; an LRU map always has room for one key.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "LRU table needs at least one slot");
        Self {
            capacity,
            slots: Slots::new(capacity),
            index: RefCell::new(HashMap::new()),
            clock: Cell::new(0),
        }
    }

    pub fn get(&self, pid: u32) -> Option<Stats> {
        self.index.borrow().get(&pid).map(|entry| self.slots.read(entry.slot))
    }

    pub fn len(&self) -> usize {
        self.index.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Snapshot {
        self.index
            .borrow()
            .iter()
            .map(|(&pid, entry)| (Pid(pid), self.slots.read(entry.slot)))
            .collect()
    }

    fn tick(&self) -> u64 {
        let now = self.clock.get() + 1;
        self.clock.set(now);
        now
    }

    /// Slot for a pid not yet in the table, evicting if full.
    fn claim_slot(&self, index: &mut HashMap<u32, Entry>) -> usize {
        if index.len() < self.capacity {
            // Evictions reuse the victim's slot, so occupied slots stay 0..len.
            return index.len();
        }

        let victim =
            index.iter().min_by_key(|(_, entry)| entry.last_used).map(|(&pid, e)| (pid, e.slot));
        match victim {
            Some((pid, slot)) => {
                index.remove(&pid);
                log::trace!("evicted {} from slot {slot}", Pid(pid));
                slot
            }
            // Capacity is at least one, so a full table is never empty
            None => 0,
        }
    }
}

impl Default for LruTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsTable for LruTable {
    fn lookup(&self, pid: u32) -> Option<*mut Stats> {
        let now = self.tick();
        let mut index = self.index.borrow_mut();
        let entry = index.get_mut(&pid)?;
        entry.last_used = now;
        Some(self.slots.ptr(entry.slot))
    }

    fn upsert(&self, pid: u32, stats: &Stats) -> Result<(), i64> {
        let now = self.tick();
        let mut index = self.index.borrow_mut();
        if let Some(entry) = index.get_mut(&pid) {
            entry.last_used = now;
            self.slots.write(entry.slot, stats);
            return Ok(());
        }

        let slot = self.claim_slot(&mut index);
        self.slots.write(slot, stats);
        index.insert(pid, Entry { slot, last_used: now });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_least_recently_inserted() {
        let table = LruTable::with_capacity(2);
        table.upsert(1, &Stats::ZERO).unwrap();
        table.upsert(2, &Stats::ZERO).unwrap();
        table.upsert(3, &Stats::ZERO).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.get(1).is_none());
        assert!(table.get(2).is_some());
        assert!(table.get(3).is_some());
    }

    #[test]
    fn test_lookup_refreshes_recency() {
        let table = LruTable::with_capacity(2);
        table.upsert(1, &Stats::ZERO).unwrap();
        table.upsert(2, &Stats::ZERO).unwrap();
        assert!(table.lookup(1).is_some());
        table.upsert(3, &Stats::ZERO).unwrap();

        assert!(table.get(1).is_some());
        assert!(table.get(2).is_none());
    }

    #[test]
    fn test_userspace_reads_do_not_refresh_recency() {
        let table = LruTable::with_capacity(2);
        table.upsert(1, &Stats::ZERO).unwrap();
        table.upsert(2, &Stats::ZERO).unwrap();
        assert!(table.get(1).is_some());
        let _ = table.snapshot();
        table.upsert(3, &Stats::ZERO).unwrap();

        assert!(table.get(1).is_none());
    }

    #[test]
    fn test_evicted_slot_is_reused() {
        let table = LruTable::with_capacity(1);
        table.upsert(1, &Stats { major_faults: 4, ..Stats::ZERO }).unwrap();
        let stale = table.lookup(1).unwrap();
        table.upsert(2, &Stats::ZERO).unwrap();

        // The old pointer now aliases pid 2's record
        assert_eq!(table.lookup(2), Some(stale));
        assert_eq!(table.get(2), Some(Stats::ZERO));
    }
}
