// src/registry.rs

//! Resolved task specifications keyed by name.
//!
//! The manifest's `[task.<name>]` sections are raw TOML shapes with
//! `[default]` fallbacks still unapplied. The registry flattens each of
//! them into a [`TaskSpec`] with every directory rebased onto the
//! manifest's own directory, so the rest of the crate never has to think
//! about inheritance or relative paths again.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, DefaultSection, Environment, OutputStyle, TaskConfig};
use crate::engine::TaskName;
use crate::errors::{Result, StylepipeError};

/// A fully resolved style-compilation task.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub name: TaskName,
    /// Directory of style sources, resolved against the manifest dir.
    pub src: PathBuf,
    /// Directory generated stylesheets are written to.
    pub out: PathBuf,
    /// Include paths handed to the compiler for `@use`/`@import` lookup.
    pub load_paths: Vec<PathBuf>,
    pub environment: Environment,
    pub style: OutputStyle,
    /// Whether this task participates in file watching.
    pub watch: bool,
}

impl TaskSpec {
    fn from_config(
        name: &str,
        cfg: &TaskConfig,
        default: &DefaultSection,
        root: &Path,
    ) -> Result<Self> {
        let src = cfg.effective_src(default).ok_or_else(|| {
            StylepipeError::Config(format!("task '{}' resolves no `src` directory", name))
        })?;
        let out = cfg.effective_out(default).ok_or_else(|| {
            StylepipeError::Config(format!("task '{}' resolves no `out` directory", name))
        })?;

        Ok(Self {
            name: name.to_string(),
            src: resolve_path(root, &src),
            out: resolve_path(root, &out),
            load_paths: cfg
                .effective_load_paths(default)
                .iter()
                .map(|p| resolve_path(root, p))
                .collect(),
            environment: cfg.effective_environment(default),
            style: cfg.effective_style(default),
            watch: cfg.watch,
        })
    }
}

/// Join a manifest-relative path onto the manifest's directory; absolute
/// paths pass through untouched.
fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Registry of resolved tasks.
///
/// The only algorithm here is name uniqueness enforcement; everything else
/// is a keyed lookup.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, TaskSpec>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
        }
    }

    /// Build a registry from a validated manifest.
    ///
    /// `root` is the directory containing the manifest; relative task
    /// directories are resolved against it.
    pub fn from_config(cfg: &ConfigFile, root: &Path) -> Result<Self> {
        let mut registry = Self::new();
        for (name, task_cfg) in cfg.task.iter() {
            let spec = TaskSpec::from_config(name, task_cfg, &cfg.default, root)?;
            registry.register(spec)?;
        }
        Ok(registry)
    }

    /// Register a task, rejecting duplicate names.
    pub fn register(&mut self, spec: TaskSpec) -> Result<()> {
        if self.tasks.contains_key(&spec.name) {
            return Err(StylepipeError::DuplicateTask(spec.name));
        }
        debug!(
            task = %spec.name,
            src = %spec.src.display(),
            out = %spec.out.display(),
            style = spec.style.as_str(),
            "registered task"
        );
        self.tasks.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Look up a task by name.
    pub fn lookup(&self, name: &str) -> Result<&TaskSpec> {
        self.tasks
            .get(name)
            .ok_or_else(|| StylepipeError::TaskNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskSpec> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
