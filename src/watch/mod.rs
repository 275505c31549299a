// src/watch/mod.rs

//! Turns filesystem changes into task-level triggers.
//!
//! Three pieces: per-task glob profiles over style sources (`patterns.rs`),
//! a cross-platform filesystem watcher via `notify` (`watcher.rs`), and
//! content hashing so a task only re-runs when its sources actually
//! changed (`hash.rs`).
//!
//! Nothing here knows about pipelines or output directories.

pub mod hash;
pub mod patterns;
pub mod watcher;

pub use hash::task_tree_hash;
pub use patterns::{
    build_task_watch_profiles, TaskWatchProfile, HIDDEN_EXCLUDE_PATTERNS, STYLE_SOURCE_PATTERNS,
};
pub use watcher::{spawn_watcher, WatcherHandle};
