//! # Shared Data Structures and Aggregation Logic (eBPF ↔ Userspace)
//!
//! Defines the per-process counter record, the tracepoint payload layouts and
//! the counting logic shared by both probe variants. All shared types use
//! `#[repr(C)]` for a stable layout across the kernel/userspace boundary.
//!
//! ## Layers
//!
//! 1. **Hooks** ([`count_context_switch`], [`count_page_fault`]) - pull pids out
//!    of an event payload and forward them to the aggregator
//! 2. **Aggregator** ([`get_or_init`]) - resolve-or-create a [`Stats`] record
//! 3. **Table** ([`StatsTable`]) - the keyed store, backed by a kernel hash map
//!    or LRU hash map (feature `ebpf`) or by an in-process double in userspace
//!
//! ## Key Types
//!
//! - [`Stats`] - counters stored per pid in `STATS_MAP`
//! - [`SchedSwitchArgs`] - tracepoint arguments from `sched/sched_switch`
//! - [`PageFaultUserArgs`] - tracepoint arguments from `exceptions/page_fault_user`

#![no_std]

mod aggregator;
mod hooks;
mod table;

pub use aggregator::get_or_init;
pub use hooks::{classify_fault, count_context_switch, count_page_fault, FaultKind};
pub use table::StatsTable;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of pids tracked at once, for both table variants.
pub const MAX_TRACKED_PIDS: u32 = 1024;

/// `BPF_ANY`: create a new element or overwrite an existing one.
pub const BPF_ANY: u64 = 0;

/// Name of the per-pid stats map in both eBPF objects.
pub const STATS_MAP_NAME: &str = "STATS_MAP";

/// Name of the runtime configuration map in both eBPF objects.
pub const CONFIG_MAP_NAME: &str = "CONFIG";

/// `CONFIG` key: mask applied to the page fault error code.
///
/// A fault whose error code intersects the mask is counted as minor
/// (protection violation), otherwise as major (page not present).
pub const CONFIG_MINOR_FAULT_MASK: u32 = 0;

/// Default minor fault mask: x86 `error_code` bit 0 (`X86_PF_PROT`).
pub const DEFAULT_MINOR_FAULT_MASK: u64 = 1;

/// Program name of the `sched/sched_switch` hook.
pub const CONTEXT_SWITCH_PROGRAM: &str = "count_context_switches";

/// Program name of the `exceptions/page_fault_user` hook.
pub const PAGE_FAULT_PROGRAM: &str = "count_page_faults";

// ============================================================================
// Shared Data Structures
// ============================================================================

/// Per-process counters
///
/// Created zeroed on the first event seen for a pid and only ever
/// incremented afterwards, until the record is evicted (LRU variant) or
/// overwritten by a racing first-touch insert.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of times the pid was switched out or switched in
    pub context_switches: u64,

    /// Faults on a non-present page
    pub major_faults: u64,

    /// Faults caused by a protection violation
    pub minor_faults: u64,
}

impl Stats {
    /// The record inserted on first touch.
    pub const ZERO: Self = Self { context_switches: 0, major_faults: 0, minor_faults: 0 };
}

/// Tracepoint arguments for `sched/sched_switch`
///
/// Layout defined by the Linux kernel tracepoint ABI:
/// `/sys/kernel/debug/tracing/events/sched/sched_switch/format`
///
/// - **prev_***: The thread being switched OUT
/// - **next_***: The thread being switched IN
#[repr(C)]
pub struct SchedSwitchArgs {
    /// Unused padding (kernel tracepoint common fields)
    #[allow(clippy::pub_underscore_fields)]
    pub __unused__: u64,

    /// Command name of the thread being switched out
    pub prev_comm: [u8; 16],

    /// Thread ID (PID) of the thread being switched out
    pub prev_pid: i32,

    /// Priority of the thread being switched out
    pub prev_prio: i32,

    /// State of the thread being switched out
    pub prev_state: i64,

    /// Command name of the thread being switched in
    pub next_comm: [u8; 16],

    /// Thread ID (PID) of the thread being switched in
    pub next_pid: i32,

    /// Priority of the thread being switched in
    pub next_prio: i32,
}

/// Tracepoint arguments for `exceptions/page_fault_user`
///
/// Layout from `/sys/kernel/debug/tracing/events/exceptions/page_fault_user/format`
/// (x86 only).
#[repr(C)]
pub struct PageFaultUserArgs {
    /// Unused padding (kernel tracepoint common fields)
    #[allow(clippy::pub_underscore_fields)]
    pub __unused__: u64,

    /// Faulting address
    pub address: u64,

    /// Instruction pointer at the time of the fault
    pub ip: u64,

    /// Hardware error code; see [`classify_fault`]
    pub error_code: u64,
}

#[cfg(feature = "user")]
use aya::Pod;

// Required to read `Stats` values out of the map from userspace
#[cfg(feature = "user")]
#[allow(unsafe_code)]
unsafe impl Pod for Stats {}
