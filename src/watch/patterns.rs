// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::engine::TaskName;
use crate::errors::Result;
use crate::registry::TaskSpec;

/// Glob patterns every watch task is interested in.
///
/// Partials are included on purpose: editing `_base.scss` must recompile
/// the entrypoints that import it, even though it never compiles on its own.
pub const STYLE_SOURCE_PATTERNS: [&str; 2] = ["**/*.scss", "**/*.sass"];

/// Hidden files and directories are never watched; editors park swap and
/// lock files there that would otherwise retrigger compiles.
pub const HIDDEN_EXCLUDE_PATTERNS: [&str; 2] = ["**/.*", "**/.*/**"];

/// Compiled glob patterns plus the source directory one task watches.
///
/// The watcher passes paths relative to `src` (e.g. `"site/_base.scss"`)
/// into `matches`.
#[derive(Clone)]
pub struct TaskWatchProfile {
    name: TaskName,
    src: PathBuf,
    watch_set: GlobSet,
    exclude_set: GlobSet,
}

impl fmt::Debug for TaskWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskWatchProfile")
            .field("name", &self.name)
            .field("src", &self.src)
            .finish_non_exhaustive()
    }
}

impl TaskWatchProfile {
    /// Build the profile for one watch-enabled task.
    pub fn for_task(spec: &TaskSpec) -> Result<Self> {
        let watch_set = build_globset(&STYLE_SOURCE_PATTERNS)
            .with_context(|| format!("compiling source globs for task {}", spec.name))?;
        let exclude_set = build_globset(&HIDDEN_EXCLUDE_PATTERNS)
            .with_context(|| format!("compiling hidden-file globs for task {}", spec.name))?;

        Ok(Self {
            name: spec.name.clone(),
            src: spec.src.clone(),
            watch_set,
            exclude_set,
        })
    }

    /// The owning task's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory this profile watches.
    pub fn src(&self) -> &Path {
        &self.src
    }

    /// Replace `src` with its canonical form, best-effort.
    ///
    /// The watcher needs this so notify's absolute event paths can be
    /// relativized against the watched directory.
    pub fn canonicalized(mut self) -> Self {
        self.src = self.src.canonicalize().unwrap_or(self.src);
        self
    }

    /// Whether a change at `rel_path` (relative to `src`) concerns this
    /// task.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.watch_set.is_match(rel_path) && !self.exclude_set.is_match(rel_path)
    }
}

/// Build a compiled watch profile for each watch-enabled task.
pub fn build_task_watch_profiles<'a>(
    tasks: impl IntoIterator<Item = &'a TaskSpec>,
) -> Result<Vec<TaskWatchProfile>> {
    tasks.into_iter().map(TaskWatchProfile::for_task).collect()
}

fn build_globset(patterns: &[&str]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
