//! # pidstat - Main Entry Point
//!
//! Two subcommands share one polling loop:
//! - **run**: load and attach the probe, then report from its map
//! - **watch**: report from a map pinned by another process

use anyhow::{Context, Result};
use aya::maps::{HashMap, MapData};
use clap::Parser;
use log::{debug, info};
use pidstat_common::Stats;
use std::borrow::Borrow;
use std::time::{Duration, Instant};

use pidstat::cli::{Args, Command, ReportArgs, RunArgs, WatchArgs};
use pidstat::domain::View;
use pidstat::preflight::{check_bpffs, check_privileges, run_preflight_checks};
use pidstat::probe::{
    attach_probes, configure_fault_mask, init_ebpf_logger, load_ebpf_program, pin_stats_map,
    stats_map,
};
use pidstat::stats::{display, open_pinned, read_snapshot, Reporter};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOPERM: i32 = 77;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("permission denied") || msg.contains("requires root") {
        EXIT_NOPERM
    } else {
        EXIT_ERROR
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Run(run) => run_probe(run, args.quiet).await,
        Command::Watch(watch) => watch_pinned(watch, args.quiet).await,
    }
}

async fn run_probe(args: RunArgs, quiet: bool) -> Result<()> {
    run_preflight_checks()?;
    if let Some(ref pin) = args.pin {
        check_bpffs(pin)?;
    }

    if !quiet {
        println!("pidstat v{}", env!("CARGO_PKG_VERSION"));
        println!("table: {}", args.variant);
    }

    let mut bpf = load_ebpf_program(args.variant, args.object.as_deref())?;
    init_ebpf_logger(&mut bpf);

    configure_fault_mask(&mut bpf, args.minor_fault_mask)?;
    let attached = attach_probes(&mut bpf)?;

    if let Some(ref pin) = args.pin {
        pin_stats_map(&bpf, pin)?;
    }

    if !quiet {
        println!("page faults: {}", if attached.page_faults { "counted" } else { "unavailable" });
        if let Some(ref pin) = args.pin {
            println!("pinned: {}", pin.display());
        }
        println!("Collecting statistics... (Ctrl+C to stop)");
    }

    let map = stats_map(&bpf)?;
    let exit_reason = poll(&map, &args.report).await?;

    if let Some(ref pin) = args.pin {
        // The map itself goes away with the program unless someone else holds the pin
        if let Err(e) = std::fs::remove_file(pin) {
            debug!("Could not remove pin {}: {e}", pin.display());
        }
    }

    if !quiet {
        eprintln!("\n{exit_reason}");
    }
    Ok(())
}

async fn watch_pinned(args: WatchArgs, quiet: bool) -> Result<()> {
    check_privileges()?;
    check_bpffs(&args.map)?;

    let map = open_pinned(&args.map)
        .context("Ensure the probe is running with --pin, or pin the map with bpftool")?;

    if !quiet {
        println!("Reading statistics from {}...", args.map.display());
    }

    let exit_reason = poll(&map, &args.report).await?;
    if !quiet {
        eprintln!("\n{exit_reason}");
    }
    Ok(())
}

/// Report every interval until Ctrl+C or the duration limit
///
/// Returns why polling stopped.
async fn poll<T: Borrow<MapData>>(
    map: &HashMap<T, u32, Stats>,
    args: &ReportArgs,
) -> Result<&'static str> {
    let mut reporter = Reporter::new(args.view, args.top, args.interval);
    let interval = Duration::from_secs(args.interval);

    // Setup Ctrl+C handler
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let started = Instant::now();
    let duration_limit =
        if args.duration > 0 { Some(Duration::from_secs(args.duration)) } else { None };

    loop {
        if let Some(limit) = duration_limit {
            if started.elapsed() >= limit {
                return Ok("duration limit reached");
            }
        }

        let snapshot = read_snapshot(map)?;
        debug!("read {} entries", snapshot.len());
        let rendered = reporter.report(snapshot);

        match reporter.view() {
            View::Deltas => print!("{rendered}"),
            View::Top => display::print_top(&rendered)?,
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            _ = &mut ctrl_c => {
                info!("Interrupted");
                return Ok("interrupted");
            }
        }
    }
}
