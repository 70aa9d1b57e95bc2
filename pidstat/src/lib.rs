//! # pidstat - Per-process Context Switch and Page Fault Counters
//!
//! pidstat counts, for every process, how often it is switched in or out by
//! the scheduler and how many user page faults it takes. Counting happens in
//! the kernel via eBPF; this crate loads the probe, attaches it and reads the
//! resulting table.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    eBPF Programs (Kernel)                    │
//! │  • sched/sched_switch        → count_context_switches        │
//! │  • exceptions/page_fault_user → count_page_faults            │
//! │                          │                                   │
//! │                          ▼ get_or_init + increment           │
//! │            STATS_MAP: pid → Stats (1024 entries)             │
//! │            hash (drop when full) | LRU (evict when full)     │
//! └───────────────────────┬──────────────────────────────────────┘
//!                         │ map iteration (every --interval)
//!                         ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    pidstat (This Crate)                      │
//! │   probe ──▶ stats::snapshot ──▶ stats::delta ──▶ display     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`probe`]: load one of the two eBPF objects, configure and attach it,
//!   optionally pin the stats map
//! - [`stats`]: read the map into snapshots, diff consecutive snapshots and
//!   render the deltas or top views
//! - [`table`]: in-process tables with the same semantics as the two kernel
//!   maps, for driving the shared hook code without a kernel
//! - [`preflight`]: privilege, kernel version and bpffs checks
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: core types (`Pid`, `TableVariant`, `View`) and errors
//!
//! ## Counting Semantics
//!
//! Counting is lock-free and best effort. The hash variant silently stops
//! admitting new pids once 1024 are tracked; the LRU variant evicts the least
//! recently active pid instead, losing its history. Concurrent increments on
//! different CPUs may be lost. See `pidstat_common` for the exact rules.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Count with the LRU table and print per-pid deltas every 3s
//! sudo ./pidstat run
//!
//! # Top 10 by context switches, map pinned for other readers
//! sudo ./pidstat run --variant hash --view top --pin
//!
//! # Read a map pinned by another run
//! sudo ./pidstat watch --map /sys/fs/bpf/stats_map
//! ```

pub mod cli;
pub mod domain;
pub mod preflight;
pub mod probe;
pub mod stats;
pub mod table;
