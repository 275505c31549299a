// src/compile/mod.rs

//! Style compilation for stylepipe.
//!
//! This module owns everything between "a task should run now" and "its
//! stylesheets are on disk":
//! - entrypoint discovery under the task's source directory (`sass.rs`)
//! - compilation via `grass` and output writing (`sass.rs`)
//! - the background worker loop the runtime dispatches into (`worker.rs`)

pub mod sass;
pub mod worker;

pub use sass::{compile_task, discover_entrypoints, CompileStats};
pub use worker::spawn_compiler;
