//! CLI argument definitions

use clap::{Parser, Subcommand};
use pidstat_common::DEFAULT_MINOR_FAULT_MASK;
use std::path::PathBuf;

use crate::domain::{TableVariant, View};

/// Where the stats map is pinned unless told otherwise
pub const DEFAULT_PIN_PATH: &str = "/sys/fs/bpf/stats_map";

#[derive(Parser)]
#[command(
    name = "pidstat",
    about = "Count context switches and page faults per process with eBPF",
    after_help = "\
EXAMPLES:
    sudo pidstat run                               LRU table, deltas every 3s
    sudo pidstat run --variant hash --view top     Top 10 by context switches
    sudo pidstat run --pin /sys/fs/bpf/stats_map   Keep the map readable by others
    sudo pidstat watch                             Read a map pinned by another run"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the probe, attach it and report counters until interrupted
    Run(RunArgs),
    /// Report counters from a stats map pinned by a running probe
    Watch(WatchArgs),
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Table behavior once 1024 pids are tracked
    #[arg(long, value_enum, default_value_t = TableVariant::Lru)]
    pub variant: TableVariant,

    /// Error code bits that mark a page fault as minor (e.g. 0x1)
    #[arg(long, value_name = "MASK", value_parser = parse_mask, default_value_t = DEFAULT_MINOR_FAULT_MASK)]
    pub minor_fault_mask: u64,

    /// eBPF object to load instead of the one built by `cargo xtask build-ebpf`
    #[arg(long, value_name = "FILE")]
    pub object: Option<PathBuf>,

    /// Pin the stats map at PATH (on bpffs) while running
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = DEFAULT_PIN_PATH)]
    pub pin: Option<PathBuf>,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(clap::Args)]
pub struct WatchArgs {
    /// Path of the pinned stats map
    #[arg(long, value_name = "PATH", default_value = DEFAULT_PIN_PATH)]
    pub map: PathBuf,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(clap::Args)]
pub struct ReportArgs {
    /// Seconds between reports
    #[arg(short, long, default_value = "3", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Report format
    #[arg(long, value_enum, default_value_t = View::Deltas)]
    pub view: View,

    /// Rows shown by the top view
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Stop after N seconds (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub duration: u64,
}

/// Accept a mask as hex (`0x1`), binary (`0b1`) or decimal
fn parse_mask(value: &str) -> Result<u64, String> {
    let parsed = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else if let Some(bin) = value.strip_prefix("0b") {
        u64::from_str_radix(bin, 2)
    } else {
        value.parse()
    };
    parsed.map_err(|e| format!("invalid mask '{value}': {e}"))
}
