use crate::{Stats, StatsTable};

/// Resolve the record for `pid`, creating a zeroed one on first touch
///
/// 1. Look the pid up; return the record if present (the common case).
/// 2. Otherwise insert [`Stats::ZERO`] with overwrite semantics.
/// 3. Look the pid up again; `None` means the insert was rejected
///    (hash table at capacity) and the caller skips the event.
///
/// Another CPU may insert the same pid between steps 1 and 2. Its record is
/// then overwritten by ours and any increment it makes through its stale
/// pointer is lost. Counting is best effort and this window is accepted.
#[inline(always)]
pub fn get_or_init<T: StatsTable + ?Sized>(table: &T, pid: u32) -> Option<*mut Stats> {
    if let Some(stats) = table.lookup(pid) {
        return Some(stats);
    }

    // Ignored: a rejected insert shows up as a failed second lookup.
    let _ = table.upsert(pid, &Stats::ZERO);
    table.lookup(pid)
}
