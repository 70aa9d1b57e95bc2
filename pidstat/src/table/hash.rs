use pidstat_common::{Stats, StatsTable, MAX_TRACKED_PIDS};
use std::cell::RefCell;
use std::collections::HashMap;

use super::{Slots, FULL_TABLE_ERRNO};
use crate::domain::Pid;
use crate::stats::Snapshot;

/// Reject-on-full table, modelled on `BPF_MAP_TYPE_HASH`
pub struct HashTable {
    capacity: usize,
    slots: Slots,
    index: RefCell<HashMap<u32, usize>>,
}

impl HashTable {
    /// Table with the probe's capacity of [`MAX_TRACKED_PIDS`] entries.
    pub fn new() -> Self {
        Self::with_capacity(MAX_TRACKED_PIDS as usize)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity, slots: Slots::new(capacity), index: RefCell::new(HashMap::new()) }
    }

    /// Copy of the record for `pid`, as a userspace map read would see it.
    pub fn get(&self, pid: u32) -> Option<Stats> {
        self.index.borrow().get(&pid).map(|&slot| self.slots.read(slot))
    }

    pub fn len(&self) -> usize {
        self.index.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Snapshot {
        self.index.borrow().iter().map(|(&pid, &slot)| (Pid(pid), self.slots.read(slot))).collect()
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsTable for HashTable {
    fn lookup(&self, pid: u32) -> Option<*mut Stats> {
        self.index.borrow().get(&pid).map(|&slot| self.slots.ptr(slot))
    }

    fn upsert(&self, pid: u32, stats: &Stats) -> Result<(), i64> {
        let mut index = self.index.borrow_mut();
        if let Some(&slot) = index.get(&pid) {
            self.slots.write(slot, stats);
            return Ok(());
        }
        if index.len() >= self.capacity {
            return Err(FULL_TABLE_ERRNO);
        }

        // Nothing is ever removed, so occupied slots are exactly 0..len.
        let slot = index.len();
        self.slots.write(slot, stats);
        index.insert(pid, slot);
        Ok(())
    }
}
