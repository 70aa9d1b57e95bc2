//! Command-line interface

pub mod args;

pub use args::{Args, Command, ReportArgs, RunArgs, WatchArgs, DEFAULT_PIN_PATH};
