// src/engine/mod.rs

//! Orchestration engine: the pipeline event loop (`runtime.rs`), which
//! reacts to file-watch triggers, compile completions and shutdown
//! signals, plus trigger coalescing for tasks that get retriggered
//! mid-compile (`queue.rs`).

pub mod queue;
pub mod runtime;

pub use queue::PendingTriggers;
pub use runtime::{
    PipelineOutcome, Runtime, RuntimeEvent, RuntimeOptions, TaskName, TaskOutcome, TriggerReason,
};
