// src/config/mod.rs

//! The `Stylepipe.toml` manifest: its serde data model (`model.rs`),
//! reading it from disk (`loader.rs`), and the semantic checks that run
//! before anything executes (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    ConfigFile, DefaultSection, Environment, OutputStyle, PipelineConfig, ProjectSection,
    TaskConfig,
};
pub use validate::validate_config;
