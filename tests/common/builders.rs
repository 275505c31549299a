#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use stylepipe::cli::CliArgs;
use stylepipe::config::{Environment, OutputStyle};
use stylepipe::registry::TaskSpec;

/// Builder for a throwaway project: a manifest plus style sources under a
/// `TempDir`, so each test works against an isolated tree.
pub struct ProjectBuilder {
    dir: TempDir,
    manifest: String,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("creating temp project dir"),
            manifest: String::new(),
        }
    }

    /// Append a block of raw TOML to the manifest.
    pub fn manifest(mut self, toml: &str) -> Self {
        self.manifest.push_str(toml);
        if !toml.ends_with('\n') {
            self.manifest.push('\n');
        }
        self
    }

    /// Write a file relative to the project root, creating parent
    /// directories as needed.
    pub fn file(self, rel: &str, contents: &str) -> Self {
        write_file(&self.dir.path().join(rel), contents);
        self
    }

    /// Create an empty directory relative to the project root.
    pub fn dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.dir.path().join(rel)).expect("creating project dir");
        self
    }

    /// Persist the manifest as `Stylepipe.toml` and hand back the project.
    pub fn build(self) -> Project {
        let manifest_path = self.dir.path().join("Stylepipe.toml");
        fs::write(&manifest_path, &self.manifest).expect("writing manifest");
        Project {
            dir: self.dir,
            manifest_path,
        }
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built test project. Holds the `TempDir` so the tree lives as long as
/// the value does.
pub struct Project {
    dir: TempDir,
    manifest_path: PathBuf,
}

impl Project {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) {
        write_file(&self.path(rel), contents);
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }

    /// Replace a file's contents via a rename, so a watcher observes one
    /// consistent change instead of a truncate-then-write pair.
    pub fn replace(&self, rel: &str, contents: &str) {
        let target = self.path(rel);
        let staged = target.with_extension("staged");
        write_file(&staged, contents);
        fs::rename(&staged, &target).expect("renaming staged file into place");
    }

    /// CLI arguments that run `pipeline` against this project's manifest.
    pub fn args(&self, pipeline: &str) -> CliArgs {
        CliArgs {
            pipeline: pipeline.to_string(),
            config: self.manifest_path.to_string_lossy().into_owned(),
            once: false,
            log_level: None,
            dry_run: false,
        }
    }

    /// Names of files directly under `rel`, sorted. Empty if the directory
    /// does not exist.
    pub fn files_under(&self, rel: &str) -> Vec<String> {
        let dir = self.path(rel);
        if !dir.is_dir() {
            return Vec::new();
        }
        let mut names: Vec<String> = fs::read_dir(&dir)
            .expect("reading dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("creating parent dir");
    }
    fs::write(path, contents).expect("writing file");
}

/// Builder for `TaskSpec` values used by registry and engine tests.
pub struct TaskSpecBuilder {
    spec: TaskSpec,
}

impl TaskSpecBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            spec: TaskSpec {
                name: name.to_string(),
                src: PathBuf::from("scss"),
                out: PathBuf::from("css"),
                load_paths: Vec::new(),
                environment: Environment::Development,
                style: OutputStyle::Expanded,
                watch: false,
            },
        }
    }

    pub fn src(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec.src = path.into();
        self
    }

    pub fn out(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec.out = path.into();
        self
    }

    pub fn load_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec.load_paths.push(path.into());
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.spec.environment = environment;
        self
    }

    pub fn style(mut self, style: OutputStyle) -> Self {
        self.spec.style = style;
        self
    }

    pub fn watch(mut self, watch: bool) -> Self {
        self.spec.watch = watch;
        self
    }

    pub fn build(self) -> TaskSpec {
        self.spec
    }
}
