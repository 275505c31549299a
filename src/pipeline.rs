// src/pipeline.rs

//! Aggregate commands: named, ordered groupings of tasks.
//!
//! A pipeline is what the user actually invokes. The conventional manifest
//! defines two: `default` (watching development compile) and `build`
//! (one-shot production compile), but any number may be declared.

use tracing::debug;

use crate::config::model::ConfigFile;
use crate::errors::{Result, StylepipeError};
use crate::registry::{TaskRegistry, TaskSpec};

/// A resolved aggregate command: every task reference has been looked up
/// in the registry and replaced by its spec.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub name: String,
    /// Tasks in declaration order.
    pub tasks: Vec<TaskSpec>,
    /// If true, all tasks are dispatched at once; otherwise they run in
    /// order and the pipeline stops at the first failure.
    pub concurrent: bool,
}

impl Pipeline {
    /// Resolve the pipeline `name` from the manifest against the registry.
    pub fn resolve(cfg: &ConfigFile, registry: &TaskRegistry, name: &str) -> Result<Self> {
        let pipeline_cfg = cfg
            .pipeline
            .get(name)
            .ok_or_else(|| StylepipeError::PipelineNotFound(name.to_string()))?;

        let mut tasks = Vec::with_capacity(pipeline_cfg.tasks.len());
        for task_name in pipeline_cfg.tasks.iter() {
            tasks.push(registry.lookup(task_name)?.clone());
        }

        debug!(
            pipeline = %name,
            tasks = tasks.len(),
            concurrent = pipeline_cfg.concurrent,
            "resolved pipeline"
        );

        Ok(Self {
            name: name.to_string(),
            tasks,
            concurrent: pipeline_cfg.concurrent,
        })
    }

    pub fn task(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Tasks that asked to be re-run on file changes.
    pub fn watch_tasks(&self) -> impl Iterator<Item = &TaskSpec> {
        self.tasks.iter().filter(|t| t.watch)
    }

    pub fn has_watch_tasks(&self) -> bool {
        self.tasks.iter().any(|t| t.watch)
    }
}
