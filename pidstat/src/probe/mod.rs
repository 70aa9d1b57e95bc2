//! Loading, configuring and attaching the kernel-side counters
//!
//! - `loader`: load one of the two eBPF objects, push runtime config, attach
//!   both tracepoints and optionally pin the stats map for other readers

pub mod loader;

pub use loader::{
    attach_probes, configure_fault_mask, default_object_path, init_ebpf_logger,
    load_ebpf_program, pin_stats_map, stats_map, AttachedProbes,
};
