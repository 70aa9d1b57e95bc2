//! Domain types providing compile-time safety and self-documentation

use clap::ValueEnum;
use std::fmt;

/// Process ID (TGID), the key of the stats map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

impl From<u32> for Pid {
    fn from(pid: u32) -> Self {
        Pid(pid)
    }
}

/// Which eBPF object to load, i.e. how `STATS_MAP` behaves once full
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableVariant {
    /// Plain hash map: new pids are dropped once 1024 are tracked
    Hash,
    /// LRU hash map: the least recently active pid is evicted to make room
    Lru,
}

impl fmt::Display for TableVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableVariant::Hash => write!(f, "hash"),
            TableVariant::Lru => write!(f, "lru"),
        }
    }
}

/// How each polling interval is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// One line per pid with activity since the previous interval
    Deltas,
    /// Table of the busiest pids by context switches, redrawn in place
    Top,
}
