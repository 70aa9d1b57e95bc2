//! Structured error types for pidstat
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Program {0} not found in eBPF object")]
    ProgramNotFound(&'static str),

    #[error("Map {0} not found in eBPF object")]
    MapNotFound(&'static str),

    #[error("Failed to attach {program} to {category}/{name}: {error}")]
    AttachFailed { program: &'static str, category: &'static str, name: &'static str, error: String },

    #[error("Failed to pin {map} at {path}: {error}")]
    PinFailed { map: &'static str, path: PathBuf, error: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Aya(#[from] aya::EbpfError),

    #[error(transparent)]
    Program(#[from] aya::programs::ProgramError),

    #[error(transparent)]
    Map(#[from] aya::maps::MapError),
}

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("No pinned stats map at {path}: {error}")]
    PinnedMapUnavailable { path: PathBuf, error: String },

    #[error("Failed to read stats map: {0}")]
    ReadFailed(#[from] aya::maps::MapError),
}
