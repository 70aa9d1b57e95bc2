//! Event dispatch shared by both probe variants
//!
//! The eBPF programs only turn the raw tracepoint context into an optional
//! payload reference; everything past that point lives here so userspace can
//! drive the exact same code against an in-process table.

#![allow(unsafe_code)]

use crate::{get_or_init, PageFaultUserArgs, SchedSwitchArgs, Stats, StatsTable};

/// Kind of a user page fault, decided from its error code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// Page not present
    Major,
    /// Protection violation on a present page
    Minor,
}

/// Classify a page fault error code
///
/// Any bit of `minor_mask` set in `error_code` means the page was present and
/// the access violated its protection, which is counted as a minor fault.
/// With the default mask this is x86 bit 0 (`X86_PF_PROT`).
#[inline(always)]
#[must_use]
pub fn classify_fault(error_code: u64, minor_mask: u64) -> FaultKind {
    if error_code & minor_mask != 0 {
        FaultKind::Minor
    } else {
        FaultKind::Major
    }
}

/// Count one context switch for both the outgoing and incoming pid
///
/// Both pids are counted independently, so a switch from a pid to itself
/// adds 2. A missing payload or a pid the table refuses to admit is skipped.
#[inline(always)]
pub fn count_context_switch<T: StatsTable + ?Sized>(table: &T, args: Option<&SchedSwitchArgs>) {
    let Some(args) = args else {
        return;
    };

    // Switched out
    bump(table, args.prev_pid as u32, |stats| stats.context_switches += 1);

    // Switched in
    bump(table, args.next_pid as u32, |stats| stats.context_switches += 1);
}

/// Count one user page fault for `pid`, the process currently on CPU
///
/// Exactly one of `minor_faults` / `major_faults` is incremented.
#[inline(always)]
pub fn count_page_fault<T: StatsTable + ?Sized>(
    table: &T,
    pid: u32,
    args: Option<&PageFaultUserArgs>,
    minor_mask: u64,
) {
    let Some(args) = args else {
        return;
    };

    match classify_fault(args.error_code, minor_mask) {
        FaultKind::Minor => bump(table, pid, |stats| stats.minor_faults += 1),
        FaultKind::Major => bump(table, pid, |stats| stats.major_faults += 1),
    }
}

#[inline(always)]
fn bump<T: StatsTable + ?Sized>(table: &T, pid: u32, update: impl FnOnce(&mut Stats)) {
    if let Some(stats) = get_or_init(table, pid) {
        // SAFETY: the pointer comes from the table and stays valid for the
        // duration of this handler. Concurrent writers on other CPUs may race
        // with this read-modify-write; lost increments are tolerated.
        update(unsafe { &mut *stats });
    }
}
