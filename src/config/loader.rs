// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;
use crate::errors::Result;

/// Read a manifest file and deserialize it into a [`ConfigFile`].
///
/// Deserialization only. Semantic checks (pipeline task references,
/// directory resolution, ...) live in [`load_and_validate`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading manifest at {:?}", path))?;

    let config: ConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Read, deserialize and semantically validate a manifest.
///
/// Everything outside this module goes through here. After parsing (where
/// `serde` fills in the `[default]`-level fallbacks) it checks that:
///
/// - at least one task is defined,
/// - every task resolves a source and output directory,
/// - every pipeline references only defined tasks,
/// - concurrent pipelines do not write into a shared output directory.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Manifest path used when `--config` is not given.
///
/// Just `Stylepipe.toml` in the working directory for now; kept as a
/// function so upward manifest discovery can slot in later.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Stylepipe.toml")
}
