//! Pieces shared by both probe variants: runtime config, payload access,
//! license and panic handler.

use aya_ebpf::{
    helpers::bpf_get_current_pid_tgid,
    macros::map,
    maps::HashMap,
    programs::TracePointContext,
    EbpfContext,
};
use pidstat_common::{
    PageFaultUserArgs, SchedSwitchArgs, CONFIG_MINOR_FAULT_MASK, DEFAULT_MINOR_FAULT_MASK,
};

/// Map: Config key → Config value
///
/// Written by userspace before the programs are attached.
/// - **Key 0**: minor fault mask for the page fault error code (default: 1)
#[map]
static CONFIG: HashMap<u32, u64> = HashMap::with_max_entries(16, 0);

#[link_section = "license"]
#[used]
pub static LICENSE: [u8; 4] = *b"GPL\0";

/// View the tracepoint context as a `sched_switch` payload
#[inline(always)]
pub fn sched_switch_args(ctx: &TracePointContext) -> Option<&SchedSwitchArgs> {
    // Layout from /sys/kernel/debug/tracing/events/sched/sched_switch/format
    unsafe { (ctx.as_ptr() as *const SchedSwitchArgs).as_ref() }
}

/// View the tracepoint context as a `page_fault_user` payload
#[inline(always)]
pub fn page_fault_args(ctx: &TracePointContext) -> Option<&PageFaultUserArgs> {
    unsafe { (ctx.as_ptr() as *const PageFaultUserArgs).as_ref() }
}

/// Process id (TGID) of the task currently on CPU
#[inline(always)]
pub fn current_pid() -> u32 {
    let pid_tgid = unsafe { bpf_get_current_pid_tgid() };
    (pid_tgid >> 32) as u32
}

#[inline(always)]
pub fn minor_fault_mask() -> u64 {
    unsafe { CONFIG.get(&CONFIG_MINOR_FAULT_MASK).copied().unwrap_or(DEFAULT_MINOR_FAULT_MASK) }
}

#[cfg(all(not(test), target_os = "none"))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}
