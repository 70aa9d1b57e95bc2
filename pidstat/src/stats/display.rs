//! Text rendering of interval reports

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use std::fmt::Write as _;
use std::io::{self, Write};

use super::delta::ProcessDelta;

/// Printed after every deltas report
pub const SEPARATOR: &str = "---";

/// `PID <pid>: +CS: <n>, +MF: <n>, +mF: <n>`
pub fn format_delta_line(delta: &ProcessDelta) -> String {
    format!(
        "PID {}: +CS: {}, +MF: {}, +mF: {}",
        delta.pid.0, delta.delta.context_switches, delta.delta.major_faults, delta.delta.minor_faults
    )
}

/// One line per active pid followed by the separator
pub fn format_deltas(deltas: &[ProcessDelta]) -> String {
    let mut out = String::new();
    for delta in deltas {
        let _ = writeln!(out, "{}", format_delta_line(delta));
    }
    let _ = writeln!(out, "{SEPARATOR}");
    out
}

/// Table of the busiest pids: pid, cumulative switches, switches this interval
pub fn format_top(rows: &[ProcessDelta], interval_secs: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Top processes by context switches (last {interval_secs}s):");
    let _ = writeln!(out, "{:<10} {:<15} {:<15}", "PID", "Total CS", format!("CS/{interval_secs}s"));
    let _ = writeln!(out, "{}", "-".repeat(40));
    for row in rows {
        let _ = writeln!(
            out,
            "{:<10} {:<15} {:<15}",
            row.pid.0, row.total.context_switches, row.delta.context_switches
        );
    }
    out
}

/// Redraw the top view from the top-left corner of a cleared screen
///
/// # Errors
/// Returns an error if stdout cannot be written
pub fn print_top(rendered: &str) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
