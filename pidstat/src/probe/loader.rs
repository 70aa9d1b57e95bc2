//! # eBPF Program Loading and Attachment
//!
//! Loads compiled eBPF bytecode and attaches programs to kernel hook points.
//!
//! ## Attachment Points
//!
//! - **Tracepoint**: `sched/sched_switch` → `count_context_switches`
//! - **Tracepoint**: `exceptions/page_fault_user` → `count_page_faults`
//!   (x86 only; missing elsewhere, in which case only switches are counted)

use anyhow::{bail, Context, Result};
use aya::{
    maps::{HashMap, MapData},
    programs::TracePoint,
    Ebpf,
};
use aya_log::EbpfLogger;
use log::{info, warn};
use pidstat_common::{
    Stats, CONFIG_MAP_NAME, CONFIG_MINOR_FAULT_MASK, CONTEXT_SWITCH_PROGRAM, PAGE_FAULT_PROGRAM,
    STATS_MAP_NAME,
};
use std::path::{Path, PathBuf};

use crate::domain::{ProbeError, TableVariant};

/// Which programs ended up attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachedProbes {
    pub context_switches: bool,
    pub page_faults: bool,
}

/// Directory `cargo xtask build-ebpf` writes both objects to
const EBPF_BUILD_DIR: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/../target/bpfel-unknown-none/release");

/// Path of the eBPF object built for `variant`
pub fn default_object_path(variant: TableVariant) -> PathBuf {
    let name = match variant {
        TableVariant::Hash => "pidstat-hash",
        TableVariant::Lru => "pidstat-lru",
    };
    Path::new(EBPF_BUILD_DIR).join(name)
}

/// Load the eBPF object for `variant`
///
/// Reads `object` if given, otherwise the release build from
/// `cargo xtask build-ebpf` (debug builds are never produced).
///
/// # Errors
/// Returns an error if the object is missing or the kernel rejects it
pub fn load_ebpf_program(variant: TableVariant, object: Option<&Path>) -> Result<Ebpf> {
    let path = object.map_or_else(|| default_object_path(variant), Path::to_path_buf);
    if !path.exists() {
        bail!(
            "eBPF object not found: {}\n\n\
             Build it with: cargo xtask build-ebpf",
            path.display()
        );
    }

    let bpf = Ebpf::load_file(&path)
        .with_context(|| format!("Failed to load {variant} eBPF object {}", path.display()))?;
    info!("✓ Loaded {}", path.display());
    Ok(bpf)
}

/// Initialize eBPF logger
///
/// Only objects built with the `debug-log` feature carry log output.
pub fn init_ebpf_logger(bpf: &mut Ebpf) {
    if let Err(e) = EbpfLogger::init(bpf) {
        warn!("Failed to initialize eBPF logger: {e}");
    }
}

/// Set the error code mask that marks a page fault as minor
///
/// # Errors
/// Returns an error if the `CONFIG` map is missing or cannot be written
pub fn configure_fault_mask(bpf: &mut Ebpf, mask: u64) -> Result<(), ProbeError> {
    let mut config: HashMap<_, u32, u64> = HashMap::try_from(
        bpf.map_mut(CONFIG_MAP_NAME).ok_or(ProbeError::MapNotFound(CONFIG_MAP_NAME))?,
    )?;
    config.insert(CONFIG_MINOR_FAULT_MASK, mask, 0)?;
    info!("✓ Set minor fault mask: {mask:#x}");
    Ok(())
}

/// Attach both counters
///
/// The context switch hook is required. The page fault tracepoint only
/// exists on some architectures, so failing to attach it is logged and
/// reported through [`AttachedProbes::page_faults`].
///
/// # Errors
/// Returns an error if the context switch hook cannot be loaded or attached
pub fn attach_probes(bpf: &mut Ebpf) -> Result<AttachedProbes, ProbeError> {
    attach_tracepoint(bpf, CONTEXT_SWITCH_PROGRAM, "sched", "sched_switch")?;

    let page_faults =
        match attach_tracepoint(bpf, PAGE_FAULT_PROGRAM, "exceptions", "page_fault_user") {
            Ok(()) => true,
            Err(e) => {
                warn!("⚠️  {e}");
                warn!("   Page faults will not be counted");
                false
            }
        };

    Ok(AttachedProbes { context_switches: true, page_faults })
}

fn attach_tracepoint(
    bpf: &mut Ebpf,
    program: &'static str,
    category: &'static str,
    name: &'static str,
) -> Result<(), ProbeError> {
    let tracepoint: &mut TracePoint =
        bpf.program_mut(program).ok_or(ProbeError::ProgramNotFound(program))?.try_into()?;
    tracepoint.load()?;
    tracepoint.attach(category, name).map_err(|e| ProbeError::AttachFailed {
        program,
        category,
        name,
        error: e.to_string(),
    })?;
    info!("✓ Attached tracepoint: {category}/{name}");
    Ok(())
}

/// Pin `STATS_MAP` on bpffs so `pidstat watch` and other tools can read it
///
/// A pin left behind by an earlier run is replaced.
///
/// # Errors
/// Returns an error if the map is missing or the pin cannot be created
pub fn pin_stats_map(bpf: &Ebpf, path: &Path) -> Result<(), ProbeError> {
    let map = bpf.map(STATS_MAP_NAME).ok_or(ProbeError::MapNotFound(STATS_MAP_NAME))?;

    if path.exists() {
        warn!("Replacing existing pin at {}", path.display());
        std::fs::remove_file(path)?;
    }

    map.pin(path).map_err(|e| ProbeError::PinFailed {
        map: STATS_MAP_NAME,
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    info!("✓ Pinned {STATS_MAP_NAME} at {}", path.display());
    Ok(())
}

/// Borrow `STATS_MAP` for reading
///
/// # Errors
/// Returns an error if the map is missing or has an unexpected key/value size
pub fn stats_map(bpf: &Ebpf) -> Result<HashMap<&MapData, u32, Stats>, ProbeError> {
    let map = HashMap::try_from(
        bpf.map(STATS_MAP_NAME).ok_or(ProbeError::MapNotFound(STATS_MAP_NAME))?,
    )?;
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_object_per_variant() {
        let hash = default_object_path(TableVariant::Hash);
        let lru = default_object_path(TableVariant::Lru);
        assert!(hash.ends_with("bpfel-unknown-none/release/pidstat-hash"));
        assert!(lru.ends_with("bpfel-unknown-none/release/pidstat-lru"));
    }

    #[test]
    fn test_missing_object_mentions_xtask() {
        let result =
            load_ebpf_program(TableVariant::Lru, Some(Path::new("/nonexistent/pidstat-lru")));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("eBPF object not found"));
        assert!(err.contains("cargo xtask build-ebpf"));
    }
}
