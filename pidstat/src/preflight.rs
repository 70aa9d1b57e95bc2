//! Pre-flight checks for pidstat
//!
//! Validates system requirements before attempting to load eBPF programs.
//! Provides clear, actionable error messages when requirements aren't met.

#![allow(unsafe_code)] // geteuid() and statfs() require unsafe

use anyhow::{bail, Context, Result};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Minimum kernel version for the eBPF features used by pidstat
const MIN_KERNEL_VERSION: (u32, u32) = (5, 8);

/// Filesystem magic of bpffs (`BPF_FS_MAGIC`)
const BPF_FS_MAGIC: i64 = 0xcafe_4a11;

/// Run all pre-flight checks before eBPF loading
///
/// # Errors
/// Returns an error describing the first unmet requirement
pub fn run_preflight_checks() -> Result<()> {
    check_privileges()?;
    check_kernel_version()?;
    Ok(())
}

/// Check if running with sufficient privileges for eBPF
///
/// # Errors
/// Returns an error unless running as root
pub fn check_privileges() -> Result<()> {
    if unsafe { libc::geteuid() } == 0 {
        return Ok(());
    }

    bail!(
        "Permission denied: pidstat requires root privileges to load eBPF programs \
         and read pinned maps.\n\n\
         Run with: sudo pidstat ..."
    );
}

/// Check if the kernel version is sufficient for eBPF features
fn check_kernel_version() -> Result<()> {
    let version_str = std::fs::read_to_string("/proc/version")
        .context("Failed to read kernel version from /proc/version")?;

    // "Linux version 6.1.0-arch1-1 ..."
    let release = version_str.split_whitespace().nth(2).unwrap_or("unknown");

    let Some((major, minor)) = parse_kernel_release(release) else {
        // Can't parse, assume it's fine
        return Ok(());
    };

    if (major, minor) < MIN_KERNEL_VERSION {
        bail!(
            "Kernel version {}.{} is too old.\n\n\
             pidstat requires Linux {}.{} or newer.\n\
             Current kernel: {}",
            major,
            minor,
            MIN_KERNEL_VERSION.0,
            MIN_KERNEL_VERSION.1,
            release
        );
    }

    Ok(())
}

/// Parse `major.minor` out of a release string like `5.15.0-generic`
fn parse_kernel_release(release: &str) -> Option<(u32, u32)> {
    let mut parts = release.split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()?;
    Some((major, minor))
}

/// Check that the directory holding `pin_path` is on a mounted bpffs
///
/// # Errors
/// Returns an error if the directory is missing or is not bpffs
pub fn check_bpffs(pin_path: &Path) -> Result<()> {
    let dir = pin_path.parent().unwrap_or(pin_path);
    let c_dir = CString::new(dir.as_os_str().as_bytes())
        .with_context(|| format!("Invalid path: {}", dir.display()))?;

    let mut stat: libc::statfs = unsafe { std::mem::zeroed() };
    if unsafe { libc::statfs(c_dir.as_ptr(), &mut stat) } != 0 {
        bail!(
            "Cannot access {}: {}\n\n\
             Make sure bpffs is mounted: mount -t bpf bpf /sys/fs/bpf",
            dir.display(),
            std::io::Error::last_os_error()
        );
    }

    // f_type is i64 or u32 depending on the libc target
    #[allow(clippy::unnecessary_cast, clippy::cast_lossless)]
    let f_type = stat.f_type as i64;
    if f_type != BPF_FS_MAGIC {
        bail!(
            "{} is not on a bpffs mount.\n\n\
             Pinned maps must live on bpffs, e.g. under /sys/fs/bpf",
            dir.display()
        );
    }

    Ok(())
}
