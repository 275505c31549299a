// src/compile/sass.rs

//! One compile run of one task: discover entrypoints, compile them all in
//! memory, then write the generated stylesheets.
//!
//! The write phase only starts once every entrypoint compiled, so a broken
//! stylesheet never leaves a half-updated output directory behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::model::OutputStyle;
use crate::errors::{Result, StylepipeError};
use crate::registry::TaskSpec;

/// Extensions treated as compilable style sources.
const STYLE_EXTENSIONS: [&str; 2] = ["scss", "sass"];

/// Summary of one successful compile run.
#[derive(Debug, Clone, Copy)]
pub struct CompileStats {
    /// Number of stylesheets written.
    pub sheets: usize,
    pub elapsed: Duration,
}

/// Discover entrypoint style sources under `src`, in a stable order.
///
/// Partials (`_`-prefixed) stay importable but are never compiled on their
/// own; hidden files and directories are skipped entirely.
pub fn discover_entrypoints(src: &Path) -> Result<Vec<PathBuf>> {
    let mut entrypoints = Vec::new();

    let walker = WalkDir::new(src)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    for entry in walker.filter_entry(|e| !is_hidden(e)) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_partial(&entry) || !is_style_source(entry.path()) {
            continue;
        }
        entrypoints.push(entry.path().to_path_buf());
    }

    Ok(entrypoints)
}

pub(crate) fn is_hidden(entry: &DirEntry) -> bool {
    // depth 0 is the source directory itself, which may legitimately be ".".
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_partial(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('_')
}

pub(crate) fn is_style_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| STYLE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Compile every entrypoint of `task` and write the generated stylesheets
/// under `task.out`, mirroring the source subtree with a `.css` extension.
pub fn compile_task(task: &TaskSpec) -> Result<CompileStats> {
    let started = Instant::now();

    let entrypoints = discover_entrypoints(&task.src)?;
    if entrypoints.is_empty() {
        warn!(
            task = %task.name,
            src = %task.src.display(),
            "no style sources found; nothing to compile"
        );
        return Ok(CompileStats {
            sheets: 0,
            elapsed: started.elapsed(),
        });
    }

    let options = grass_options(task);

    // Phase one: compile everything in memory.
    let mut compiled: Vec<(PathBuf, String)> = Vec::with_capacity(entrypoints.len());
    for source in entrypoints.iter() {
        debug!(task = %task.name, source = %source.display(), "compiling entrypoint");
        let css = grass::from_path(source, &options).map_err(|err| StylepipeError::Compile {
            task: task.name.clone(),
            message: err.to_string(),
        })?;
        compiled.push((output_path(&task.src, &task.out, source)?, css));
    }

    // Phase two: write outputs.
    for (target, css) in compiled.iter() {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, css)?;
        debug!(task = %task.name, out = %target.display(), "wrote stylesheet");
    }

    Ok(CompileStats {
        sheets: compiled.len(),
        elapsed: started.elapsed(),
    })
}

fn grass_options(task: &TaskSpec) -> grass::Options<'static> {
    let mut options = grass::Options::default().style(grass_style(task.style));
    for path in task.load_paths.iter() {
        options = options.load_path(path);
    }
    options
}

fn grass_style(style: OutputStyle) -> grass::OutputStyle {
    match style {
        OutputStyle::Expanded => grass::OutputStyle::Expanded,
        OutputStyle::Compressed => grass::OutputStyle::Compressed,
    }
}

/// Map a source file to its output location: same position relative to the
/// output directory, `.css` extension.
fn output_path(src: &Path, out: &Path, source: &Path) -> Result<PathBuf> {
    let relative = source.strip_prefix(src).map_err(|_| {
        StylepipeError::Config(format!(
            "entrypoint '{}' is not under source directory '{}'",
            source.display(),
            src.display()
        ))
    })?;
    Ok(out.join(relative).with_extension("css"))
}
