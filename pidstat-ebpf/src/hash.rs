//! # Per-pid Counters, Hash Table Variant
//!
//! `STATS_MAP` is a plain hash map. Once 1024 pids are tracked, events for
//! new pids are dropped; existing pids keep counting forever.
//!
//! ## Programs
//!
//! - **Tracepoint**: `count_context_switches` on `sched/sched_switch`
//! - **Tracepoint**: `count_page_faults` on `exceptions/page_fault_user`
//!
//! ## Build
//!
//! ```bash
//! cargo xtask build-ebpf
//! ```

#![no_std]
#![no_main]
#![allow(unused_unsafe)]

mod probes;

use aya_ebpf::{
    macros::{map, tracepoint},
    maps::HashMap,
    programs::TracePointContext,
};
use pidstat_common::{count_context_switch, count_page_fault, Stats, MAX_TRACKED_PIDS};

/// Map: PID (TGID) → counters, rejects new pids when full
#[map]
static STATS_MAP: HashMap<u32, Stats> = HashMap::with_max_entries(MAX_TRACKED_PIDS, 0);

#[tracepoint]
pub fn count_context_switches(ctx: TracePointContext) -> u32 {
    let args = probes::sched_switch_args(&ctx);

    #[cfg(feature = "debug-log")]
    if let Some(args) = args {
        aya_log_ebpf::debug!(&ctx, "context switch {} -> {}", args.prev_pid, args.next_pid);
    }

    count_context_switch(&STATS_MAP, args);
    0
}

#[tracepoint]
pub fn count_page_faults(ctx: TracePointContext) -> u32 {
    let pid = probes::current_pid();

    #[cfg(feature = "debug-log")]
    aya_log_ebpf::debug!(&ctx, "page fault pid={}", pid);

    count_page_fault(&STATS_MAP, pid, probes::page_fault_args(&ctx), probes::minor_fault_mask());
    0
}
