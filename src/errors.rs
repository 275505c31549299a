// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Wiring code (config loading, startup checks) generally uses `anyhow`
//! with context strings; the registry, pipeline resolution, and compile
//! layers return these structured variants so callers and tests can tell
//! configuration mistakes apart from compile failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StylepipeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("duplicate task definition '{0}'")]
    DuplicateTask(String),

    #[error("no task named '{0}' is registered")]
    TaskNotFound(String),

    #[error("no pipeline named '{0}' is defined")]
    PipelineNotFound(String),

    /// A style source was rejected by the compiler. `message` carries the
    /// compiler's own diagnostic text (source path, line, and column).
    #[error("compile error in task '{task}': {message}")]
    Compile { task: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StylepipeError>;
