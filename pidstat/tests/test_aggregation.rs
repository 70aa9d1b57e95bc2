//! Drives the shared hook code against the in-process tables, covering the
//! counting rules both probe variants must follow.

#![allow(unsafe_code)]

use pidstat::domain::Pid;
use pidstat::table::{HashTable, LruTable};
use pidstat_common::{
    count_context_switch, count_page_fault, get_or_init, PageFaultUserArgs, SchedSwitchArgs,
    Stats, StatsTable, DEFAULT_MINOR_FAULT_MASK, MAX_TRACKED_PIDS,
};

const CAPACITY: u32 = MAX_TRACKED_PIDS;

fn switch(prev_pid: i32, next_pid: i32) -> SchedSwitchArgs {
    SchedSwitchArgs {
        __unused__: 0,
        prev_comm: [0; 16],
        prev_pid,
        prev_prio: 120,
        prev_state: 0,
        next_comm: [0; 16],
        next_pid,
        next_prio: 120,
    }
}

fn fault(error_code: u64) -> PageFaultUserArgs {
    PageFaultUserArgs { __unused__: 0, address: 0x7f00_dead_b000, ip: 0x5555_0000_1000, error_code }
}

fn context_switches<T: StatsTable>(table: &T, pid: u32) -> Option<u64> {
    table.lookup(pid).map(|stats| unsafe { (*stats).context_switches })
}

#[test]
fn test_unseen_pid_has_no_record() {
    let hash = HashTable::new();
    let lru = LruTable::new();
    count_context_switch(&hash, Some(&switch(1, 2)));
    count_context_switch(&lru, Some(&switch(1, 2)));

    assert!(hash.get(3).is_none());
    assert!(lru.get(3).is_none());
}

#[test]
fn test_missing_payload_is_a_noop() {
    let table = HashTable::new();
    count_context_switch(&table, None);
    count_page_fault(&table, 7, None, DEFAULT_MINOR_FAULT_MASK);
    assert!(table.is_empty());
}

#[test]
fn test_each_appearance_counts_once() {
    let table = LruTable::new();
    let events = [(1, 2), (2, 3), (3, 1), (1, 2), (4, 1)];
    for (prev, next) in events {
        count_context_switch(&table, Some(&switch(prev, next)));
    }

    // Appearances as outgoing or incoming
    assert_eq!(table.get(1).unwrap().context_switches, 4);
    assert_eq!(table.get(2).unwrap().context_switches, 3);
    assert_eq!(table.get(3).unwrap().context_switches, 2);
    assert_eq!(table.get(4).unwrap().context_switches, 1);
}

#[test]
fn test_self_switch_counts_twice() {
    let table = HashTable::new();
    count_context_switch(&table, Some(&switch(10, 10)));

    let stats = table.get(10).unwrap();
    assert_eq!(stats.context_switches, 2);
    assert_eq!(table.len(), 1);
}

#[test]
fn test_switch_does_not_touch_fault_counters() {
    let table = HashTable::new();
    count_context_switch(&table, Some(&switch(5, 6)));
    let stats = table.get(5).unwrap();
    assert_eq!(stats.major_faults, 0);
    assert_eq!(stats.minor_faults, 0);
}

#[test]
fn test_protection_fault_then_not_present_fault() {
    let table = LruTable::new();

    count_page_fault(&table, 7, Some(&fault(0b01)), DEFAULT_MINOR_FAULT_MASK);
    let stats = table.get(7).unwrap();
    assert_eq!(stats.minor_faults, 1);
    assert_eq!(stats.major_faults, 0);

    count_page_fault(&table, 7, Some(&fault(0b00)), DEFAULT_MINOR_FAULT_MASK);
    let stats = table.get(7).unwrap();
    assert_eq!(stats.minor_faults, 1);
    assert_eq!(stats.major_faults, 1);
    assert_eq!(stats.context_switches, 0);
}

#[test]
fn test_fault_is_charged_to_given_pid_only() {
    let table = HashTable::new();
    count_page_fault(&table, 7, Some(&fault(0b110)), DEFAULT_MINOR_FAULT_MASK);

    assert_eq!(table.len(), 1);
    assert_eq!(table.get(7).unwrap().major_faults, 1);
}

#[test]
fn test_custom_fault_mask() {
    let table = HashTable::new();
    count_page_fault(&table, 3, Some(&fault(0b01)), 0b10);
    count_page_fault(&table, 3, Some(&fault(0b10)), 0b10);

    assert_eq!(
        table.get(3).unwrap(),
        Stats { context_switches: 0, major_faults: 1, minor_faults: 1 }
    );
}

#[test]
fn test_get_or_init_is_idempotent() {
    let table = HashTable::new();
    let first = get_or_init(&table, 42).unwrap();
    unsafe {
        (*first).context_switches += 1;
    }
    let second = get_or_init(&table, 42).unwrap();

    assert_eq!(first, second);
    assert_eq!(table.len(), 1);
    assert_eq!(context_switches(&table, 42), Some(1));
}

#[test]
fn test_hash_table_rejects_pid_past_capacity() {
    let table = HashTable::new();
    for pid in 0..CAPACITY {
        count_page_fault(&table, pid, Some(&fault(0)), DEFAULT_MINOR_FAULT_MASK);
    }
    assert_eq!(table.len(), CAPACITY as usize);

    assert!(get_or_init(&table, CAPACITY).is_none());
    count_context_switch(&table, Some(&switch(CAPACITY as i32, 0)));

    assert!(table.get(CAPACITY).is_none());
    assert_eq!(table.len(), CAPACITY as usize);
    // The incoming pid of the same event still counts
    assert_eq!(table.get(0).unwrap().context_switches, 1);
    for pid in 0..CAPACITY {
        assert_eq!(table.get(pid).unwrap().major_faults, 1, "pid {pid}");
    }
}

#[test]
fn test_lru_table_evicts_least_recent_past_capacity() {
    let table = LruTable::new();
    for pid in 0..CAPACITY {
        count_context_switch(&table, Some(&switch(pid as i32, pid as i32)));
    }
    // Touch pid 0 so pid 1 becomes the least recently used
    count_page_fault(&table, 0, Some(&fault(1)), DEFAULT_MINOR_FAULT_MASK);

    let before = table.snapshot();
    assert!(get_or_init(&table, CAPACITY).is_some());
    let after = table.snapshot();

    assert_eq!(after.len(), CAPACITY as usize);
    assert!(after.get(Pid(CAPACITY)).is_some());
    let evicted: Vec<&Pid> =
        before.iter().map(|(pid, _)| pid).filter(|pid| after.get(**pid).is_none()).collect();
    assert_eq!(evicted, vec![&Pid(1)]);
    assert_eq!(table.get(0).unwrap().minor_faults, 1);
}

#[test]
fn test_lru_evicted_pid_restarts_from_zero() {
    let table = LruTable::with_capacity(2);
    count_context_switch(&table, Some(&switch(1, 1)));
    count_context_switch(&table, Some(&switch(2, 3)));
    assert!(table.get(1).is_none());

    count_context_switch(&table, Some(&switch(1, 1)));
    assert_eq!(table.get(1).unwrap().context_switches, 2);
}

#[test]
fn test_first_touch_overwrite_orphans_stale_pointer() {
    // Two handlers both miss on pid 5; the second insert resets the record
    // the first one already incremented.
    let table = HashTable::new();
    let stale = get_or_init(&table, 5).unwrap();
    unsafe {
        (*stale).context_switches += 1;
    }
    table.upsert(5, &Stats::ZERO).unwrap();
    let fresh = table.lookup(5).unwrap();
    unsafe {
        (*fresh).context_switches += 1;
    }

    assert_eq!(table.get(5).unwrap().context_switches, 1);
}
