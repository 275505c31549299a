// src/config/validate.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::model::{ConfigFile, PipelineConfig};
use crate::errors::{Result, StylepipeError};

/// Run all semantic checks on a parsed manifest.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_task_directories(cfg)?;
    validate_pipelines(cfg)?;
    validate_concurrent_outputs(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &ConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(StylepipeError::Config(
            "manifest must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

/// Every task must resolve both a source and an output directory, either
/// from its own section or from `[default]`.
fn validate_task_directories(cfg: &ConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if task.effective_src(&cfg.default).is_none() {
            return Err(StylepipeError::Config(format!(
                "task '{}' has no `src` directory and [default] does not provide one",
                name
            )));
        }
        if task.effective_out(&cfg.default).is_none() {
            return Err(StylepipeError::Config(format!(
                "task '{}' has no `out` directory and [default] does not provide one",
                name
            )));
        }
    }
    Ok(())
}

/// Pipelines must be non-empty and may only reference defined tasks.
///
/// Dangling references are rejected in *every* pipeline, not just the one
/// being run, so a broken manifest fails fast regardless of which command
/// the user asked for.
fn validate_pipelines(cfg: &ConfigFile) -> Result<()> {
    for (name, pipeline) in cfg.pipeline.iter() {
        if pipeline.tasks.is_empty() {
            return Err(StylepipeError::Config(format!(
                "pipeline '{}' lists no tasks",
                name
            )));
        }
        for task in pipeline.tasks.iter() {
            if !cfg.task.contains_key(task) {
                return Err(StylepipeError::Config(format!(
                    "pipeline '{}' references unknown task '{}'",
                    name, task
                )));
            }
        }
    }
    Ok(())
}

/// Tasks dispatched concurrently must not write into the same output
/// directory, otherwise their generated files could clobber each other.
fn validate_concurrent_outputs(cfg: &ConfigFile) -> Result<()> {
    for (name, pipeline) in cfg.pipeline.iter() {
        if !pipeline.concurrent {
            continue;
        }
        if let Some((a, b, out)) = find_shared_out_dir(cfg, pipeline) {
            return Err(StylepipeError::Config(format!(
                "concurrent pipeline '{}' runs tasks '{}' and '{}' with the same output directory '{}'",
                name,
                a,
                b,
                out.display()
            )));
        }
    }
    Ok(())
}

fn find_shared_out_dir<'a>(
    cfg: &'a ConfigFile,
    pipeline: &'a PipelineConfig,
) -> Option<(&'a str, &'a str, PathBuf)> {
    let mut seen: BTreeMap<PathBuf, &str> = BTreeMap::new();
    for task_name in pipeline.tasks.iter() {
        let task = cfg.task.get(task_name)?;
        let out = task.effective_out(&cfg.default)?;
        if let Some(&previous) = seen.get(&out) {
            return Some((previous, task_name.as_str(), out));
        }
        seen.insert(out, task_name.as_str());
    }
    None
}
