// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level manifest as read from a TOML file.
///
/// A complete manifest for a typical front-end project looks like:
///
/// ```toml
/// [project]
/// name = "demo"
/// version = "0.1.0"
///
/// [default]
/// src = "demo/scss"
/// out = "demo/static/css"
/// load_paths = ["vendor/foundation/scss"]
///
/// [task.watch]
/// environment = "development"
/// watch = true
///
/// [task.prod]
/// environment = "production"
///
/// [pipeline.default]
/// tasks = ["watch"]
/// concurrent = true
///
/// [pipeline.build]
/// tasks = ["prod"]
/// ```
///
/// All sections are optional at the serde level; semantic requirements
/// (at least one task, resolvable directories, valid pipeline references)
/// are enforced by [`crate::config::validate::validate_config`].
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Descriptive metadata from `[project]`. Logged at startup, never
    /// consumed by compilation.
    #[serde(default)]
    pub project: ProjectSection,

    /// Shared task values from `[default]`.
    #[serde(default)]
    pub default: DefaultSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,

    /// All aggregate commands from `[pipeline.<name>]`, keyed by name.
    #[serde(default)]
    pub pipeline: BTreeMap<String, PipelineConfig>,
}

/// `[project]` section: descriptive metadata only.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectSection {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// `[default]` section.
///
/// Values here are inherited by every task that does not set its own,
/// mirroring how a shared options block avoids repeating the source and
/// output directories for each task.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    /// Default source directory of style files.
    #[serde(default)]
    pub src: Option<PathBuf>,

    /// Default output directory for generated stylesheets.
    #[serde(default)]
    pub out: Option<PathBuf>,

    /// Default include paths for resolving shared style imports.
    #[serde(default)]
    pub load_paths: Vec<PathBuf>,

    /// Default environment tag; tasks fall back to `development` when
    /// neither the task nor this section sets one.
    #[serde(default)]
    pub environment: Option<Environment>,
}

/// `[task.<name>]` section: one style-compilation task.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Source directory of style files. Falls back to `default.src`.
    #[serde(default)]
    pub src: Option<PathBuf>,

    /// Output directory for generated stylesheets. Falls back to
    /// `default.out`.
    #[serde(default)]
    pub out: Option<PathBuf>,

    /// Task-local include paths.
    ///
    /// If `None`, the task uses `default.load_paths`.
    #[serde(default)]
    pub load_paths: Option<Vec<PathBuf>>,

    /// If true, `default.load_paths` is appended to `task.load_paths`.
    ///
    /// Otherwise, `task.load_paths` replaces `default.load_paths`.
    #[serde(default)]
    pub append_default_load_paths: bool,

    /// Environment tag for this task.
    #[serde(default)]
    pub environment: Option<Environment>,

    /// Output style. If `None`, derived from the effective environment
    /// (development compiles expanded, production compressed).
    #[serde(default)]
    pub style: Option<OutputStyle>,

    /// Whether this task participates in file watching.
    #[serde(default)]
    pub watch: bool,
}

impl TaskConfig {
    /// Effective source directory given the `[default]` fallback.
    pub fn effective_src(&self, default: &DefaultSection) -> Option<PathBuf> {
        self.src.clone().or_else(|| default.src.clone())
    }

    /// Effective output directory given the `[default]` fallback.
    pub fn effective_out(&self, default: &DefaultSection) -> Option<PathBuf> {
        self.out.clone().or_else(|| default.out.clone())
    }

    /// Effective include paths.
    ///
    /// A task without its own `load_paths` inherits the defaults wholesale.
    /// A task with its own list replaces the defaults, unless
    /// `append_default_load_paths` is set, in which case the defaults are
    /// appended after the task's own entries.
    pub fn effective_load_paths(&self, default: &DefaultSection) -> Vec<PathBuf> {
        match &self.load_paths {
            Some(own) if self.append_default_load_paths => {
                let mut merged = own.clone();
                merged.extend(default.load_paths.iter().cloned());
                merged
            }
            Some(own) => own.clone(),
            None => default.load_paths.clone(),
        }
    }

    /// Effective environment given the `[default]` fallback.
    pub fn effective_environment(&self, default: &DefaultSection) -> Environment {
        self.environment
            .or(default.environment)
            .unwrap_or(Environment::Development)
    }

    /// Effective output style: an explicit `style` wins, otherwise the
    /// environment decides.
    pub fn effective_style(&self, default: &DefaultSection) -> OutputStyle {
        self.style
            .unwrap_or_else(|| self.effective_environment(default).default_style())
    }
}

/// `[pipeline.<name>]` section: one aggregate command.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Ordered list of task names this pipeline runs.
    pub tasks: Vec<String>,

    /// If true, all tasks are dispatched at once with interleaved output;
    /// otherwise they run in order, stopping at the first failure.
    #[serde(default)]
    pub concurrent: bool,
}

/// Environment tag carried by each task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// The output style implied by this environment when a task does not
    /// set one explicitly.
    pub fn default_style(self) -> OutputStyle {
        match self {
            Environment::Development => OutputStyle::Expanded,
            Environment::Production => OutputStyle::Compressed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Output style of the generated stylesheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Fully formatted CSS for development readability.
    Expanded,
    /// Whitespace- and comment-free CSS for production delivery.
    Compressed,
}

impl OutputStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputStyle::Expanded => "expanded",
            OutputStyle::Compressed => "compressed",
        }
    }
}
