//! Userspace side of the stats map: snapshots, deltas and rendering
//!
//! - [`snapshot`]: read a loaded or pinned map into a [`Snapshot`]
//! - [`delta`]: compare consecutive snapshots
//! - [`display`]: text output for the two views

pub mod delta;
pub mod display;
pub mod snapshot;

pub use delta::{active, diff, top_by_context_switches, ProcessDelta};
pub use snapshot::{open_pinned, read_snapshot, Snapshot};

use crate::domain::View;

/// Turns a stream of snapshots into per-interval reports
pub struct Reporter {
    view: View,
    top: usize,
    interval_secs: u64,
    prev: Snapshot,
}

impl Reporter {
    pub fn new(view: View, top: usize, interval_secs: u64) -> Self {
        Self { view, top, interval_secs, prev: Snapshot::default() }
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Render `current` against the previous snapshot and remember it
    ///
    /// The deltas view only lists pids present last time, so the first
    /// report after start is just the separator. The top view ranks every
    /// pid, with first-seen pids counting their whole total.
    pub fn report(&mut self, current: Snapshot) -> String {
        let deltas = diff(&self.prev, &current);
        let rendered = match self.view {
            View::Deltas => display::format_deltas(&active(&deltas)),
            View::Top => {
                display::format_top(&top_by_context_switches(&deltas, self.top), self.interval_secs)
            }
        };
        self.prev = current;
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Pid;
    use pidstat_common::Stats;

    fn snapshot(entries: &[(u32, u64)]) -> Snapshot {
        entries
            .iter()
            .map(|&(pid, cs)| (Pid(pid), Stats { context_switches: cs, ..Stats::ZERO }))
            .collect()
    }

    #[test]
    fn test_first_deltas_report_is_empty() {
        let mut reporter = Reporter::new(View::Deltas, 10, 3);
        assert_eq!(reporter.report(snapshot(&[(1, 5)])), "---\n");
        assert_eq!(reporter.report(snapshot(&[(1, 8)])), "PID 1: +CS: 3, +MF: 0, +mF: 0\n---\n");
    }

    #[test]
    fn test_top_report_limits_rows() {
        let mut reporter = Reporter::new(View::Top, 1, 5);
        let out = reporter.report(snapshot(&[(1, 5), (2, 9)]));
        // title, header, rule, one row
        assert_eq!(out.lines().count(), 4);
        assert!(out.lines().nth(3).unwrap().starts_with('2'));
    }
}
