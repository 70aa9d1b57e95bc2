//! Per-interval changes between two snapshots

use pidstat_common::Stats;

use super::Snapshot;
use crate::domain::Pid;

/// One pid's counters and how much they moved since the previous snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessDelta {
    pub pid: Pid,
    /// Cumulative counters as currently stored in the table
    pub total: Stats,
    /// Increase since the previous snapshot
    pub delta: Stats,
    /// The pid was not in the previous snapshot; `delta` equals `total`
    pub is_new: bool,
}

impl ProcessDelta {
    pub fn has_activity(&self) -> bool {
        self.delta != Stats::ZERO
    }
}

/// Compare `current` against `prev` for every pid in `current`
///
/// Counters only grow while a record lives. A counter lower than before
/// means the pid was evicted and re-created (or its record overwritten by a
/// racing first insert), so the new value is reported as the whole delta.
pub fn diff(prev: &Snapshot, current: &Snapshot) -> Vec<ProcessDelta> {
    current
        .iter()
        .map(|(&pid, &total)| match prev.get(pid) {
            Some(before) => {
                ProcessDelta { pid, total, delta: counter_delta(before, &total), is_new: false }
            }
            None => ProcessDelta { pid, total, delta: total, is_new: true },
        })
        .collect()
}

fn counter_delta(before: &Stats, after: &Stats) -> Stats {
    let field = |b: u64, a: u64| a.checked_sub(b).unwrap_or(a);
    Stats {
        context_switches: field(before.context_switches, after.context_switches),
        major_faults: field(before.major_faults, after.major_faults),
        minor_faults: field(before.minor_faults, after.minor_faults),
    }
}

/// Pids seen in both snapshots whose counters moved
pub fn active(deltas: &[ProcessDelta]) -> Vec<ProcessDelta> {
    deltas.iter().filter(|d| !d.is_new && d.has_activity()).copied().collect()
}

/// The `n` pids with the most context switches in the interval
///
/// Ties are broken by pid so the output is stable between redraws.
pub fn top_by_context_switches(deltas: &[ProcessDelta], n: usize) -> Vec<ProcessDelta> {
    let mut ranked = deltas.to_vec();
    ranked.sort_by(|a, b| {
        b.delta.context_switches.cmp(&a.delta.context_switches).then(a.pid.cmp(&b.pid))
    });
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(context_switches: u64, major_faults: u64, minor_faults: u64) -> Stats {
        Stats { context_switches, major_faults, minor_faults }
    }

    fn snapshot(entries: &[(u32, Stats)]) -> Snapshot {
        entries.iter().map(|&(pid, s)| (Pid(pid), s)).collect()
    }

    #[test]
    fn test_diff_subtracts_previous() {
        let prev = snapshot(&[(1, stats(10, 1, 2))]);
        let current = snapshot(&[(1, stats(15, 1, 5))]);
        let deltas = diff(&prev, &current);

        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].delta, stats(5, 0, 3));
        assert_eq!(deltas[0].total, stats(15, 1, 5));
        assert!(!deltas[0].is_new);
    }

    #[test]
    fn test_new_pid_reports_full_totals() {
        let prev = snapshot(&[]);
        let current = snapshot(&[(4, stats(3, 0, 1))]);
        let deltas = diff(&prev, &current);

        assert!(deltas[0].is_new);
        assert_eq!(deltas[0].delta, stats(3, 0, 1));
    }

    #[test]
    fn test_recreated_record_is_a_reset() {
        let prev = snapshot(&[(8, stats(100, 5, 5))]);
        let current = snapshot(&[(8, stats(2, 5, 7))]);
        let deltas = diff(&prev, &current);

        assert_eq!(deltas[0].delta, stats(2, 0, 2));
    }

    #[test]
    fn test_vanished_pids_are_dropped() {
        let prev = snapshot(&[(1, stats(1, 0, 0)), (2, stats(1, 0, 0))]);
        let current = snapshot(&[(2, stats(1, 0, 0))]);
        let deltas = diff(&prev, &current);

        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].pid, Pid(2));
    }

    #[test]
    fn test_active_skips_idle_and_new() {
        let prev = snapshot(&[(1, stats(1, 0, 0)), (2, stats(1, 0, 0))]);
        let current = snapshot(&[(1, stats(1, 0, 0)), (2, stats(2, 0, 0)), (3, stats(9, 0, 0))]);
        let active = active(&diff(&prev, &current));

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].pid, Pid(2));
    }

    #[test]
    fn test_top_orders_by_context_switch_delta() {
        let prev = snapshot(&[(1, stats(0, 0, 0)), (2, stats(0, 0, 0)), (3, stats(0, 0, 0))]);
        let current = snapshot(&[(1, stats(5, 0, 0)), (2, stats(50, 0, 0)), (3, stats(5, 0, 0))]);
        let top = top_by_context_switches(&diff(&prev, &current), 2);

        let pids: Vec<u32> = top.iter().map(|d| d.pid.0).collect();
        assert_eq!(pids, vec![2, 1]);
    }
}
