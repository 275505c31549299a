// src/cli.rs

//! Command-line interface, parsed with `clap` derive.
//!
//! `clap` needs its `derive` feature for this module:
//! `clap = { version = "4.5.53", features = ["derive"] }`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `stylepipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stylepipe",
    version,
    about = "Compile style sources to CSS and recompile on change.",
    long_about = None
)]
pub struct CliArgs {
    /// Name of the pipeline to run, as declared in `[pipeline.<name>]`.
    ///
    /// Invoking with no name runs `default`.
    #[arg(value_name = "PIPELINE", default_value = "default")]
    pub pipeline: String,

    /// Path to the manifest file (TOML).
    ///
    /// Default: `Stylepipe.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Stylepipe.toml")]
    pub config: String,

    /// Run the pipeline once and exit, ignoring `watch` flags.
    #[arg(long)]
    pub once: bool,

    /// Log verbosity (error, warn, info, debug, trace).
    ///
    /// Falls back to `STYLEPIPE_LOG`, then `info`, when omitted.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print tasks and pipelines, but don't compile anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Verbosity levels accepted by `--log-level`.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Thin wrapper so `main.rs` does not need to import `clap::Parser`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
