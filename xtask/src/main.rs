use anyhow::{Context, Result};
use clap::Parser;
use std::process::Command;

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Parser)]
enum Cmd {
    /// Build both probe objects (pidstat-hash, pidstat-lru)
    BuildEbpf {
        #[arg(long, default_value = "bpfel-unknown-none")]
        target: String,
        /// Compile in per-event aya-log output
        #[arg(long)]
        debug_log: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Cmd::BuildEbpf { target, debug_log } => build_ebpf(&target, debug_log)?,
    }

    Ok(())
}

fn build_ebpf(target: &str, debug_log: bool) -> Result<()> {
    // Always release: debug builds pull in formatting code the BPF linker rejects.
    let mut cmd = Command::new("cargo");
    cmd.arg("+nightly")
        .arg("build")
        .arg("--package")
        .arg("pidstat-ebpf")
        .arg("--bins")
        .arg("--target")
        .arg(target)
        .arg("-Z")
        .arg("build-std=core")
        .arg("--release");
    if debug_log {
        cmd.arg("--features").arg("debug-log");
    }

    let status = cmd.status().context("Failed to build eBPF programs")?;

    if !status.success() {
        anyhow::bail!("Failed to build eBPF programs");
    }

    println!("✓ eBPF programs built successfully");
    println!("  Target: {target}");
    println!("  Objects: target/{target}/release/pidstat-hash, target/{target}/release/pidstat-lru");
    if debug_log {
        println!("  Logging: per-event debug output enabled");
    }

    Ok(())
}
