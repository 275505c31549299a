// src/logging.rs

//! `tracing` + `tracing-subscriber` setup.
//!
//! The effective level is the first of: the `--log-level` flag, the
//! `STYLEPIPE_LOG` environment variable (an `EnvFilter` directive such
//! as "debug" or "stylepipe::watch=trace"), then `info`.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Install the global subscriber. Call exactly once, from `main`.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(level_str(lvl)),
        None => EnvFilter::try_from_env("STYLEPIPE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // init() panics on a second call rather than returning an error.
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}

fn level_str(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
