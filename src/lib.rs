// src/lib.rs

pub mod cli;
pub mod compile;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod registry;
pub mod watch;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::compile::spawn_compiler;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{PipelineOutcome, Runtime, RuntimeEvent, RuntimeOptions};
use crate::pipeline::Pipeline;
use crate::registry::TaskRegistry;
use crate::watch::build_task_watch_profiles;

/// Run a pipeline end to end; `main.rs` calls this and maps the outcome
/// to an exit code.
///
/// Wires together manifest loading, the task registry, pipeline
/// resolution, the compile worker, the optional file watcher and Ctrl-C
/// handling, then hands everything to the [`Runtime`].
pub async fn run(args: CliArgs) -> Result<PipelineOutcome> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    log_project_metadata(&cfg);

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(PipelineOutcome::Success);
    }

    // Registry + the pipeline the user asked for.
    let root_dir = config_root_dir(&config_path);
    let registry = TaskRegistry::from_config(&cfg, &root_dir)?;
    let pipeline = Pipeline::resolve(&cfg, &registry, &args.pipeline)?;

    check_task_directories(&pipeline)?;

    // Watch only when the pipeline asks for it (disabled in --once mode).
    let watch_mode = pipeline.has_watch_tasks() && !args.once;

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Compile worker.
    let compile_tx = spawn_compiler(rt_tx.clone());

    // Optional file watcher.
    let _watcher_handle = if watch_mode {
        let profiles = build_task_watch_profiles(pipeline.watch_tasks())?;
        Some(watch::spawn_watcher(profiles, rt_tx.clone())?)
    } else {
        None
    };

    // Ctrl-C asks the runtime to shut down instead of killing the process.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let options = RuntimeOptions {
        exit_when_idle: !watch_mode,
    };

    let runtime = Runtime::new(pipeline, options, rt_rx, compile_tx);
    Ok(runtime.run().await?)
}

/// Directory that relative task paths are resolved against: wherever the
/// manifest lives, falling back to `.`.
fn config_root_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Startup filesystem checks for the tasks about to run: every source
/// directory must exist, and every output directory must be creatable.
fn check_task_directories(pipeline: &Pipeline) -> Result<()> {
    for task in pipeline.tasks.iter() {
        if !task.src.is_dir() {
            bail!(
                "task '{}': source directory {:?} does not exist",
                task.name,
                task.src
            );
        }
        fs::create_dir_all(&task.out).with_context(|| {
            format!(
                "task '{}': creating output directory {:?}",
                task.name, task.out
            )
        })?;
    }
    Ok(())
}

/// Startup log line from `[project]`; descriptive metadata only.
fn log_project_metadata(cfg: &ConfigFile) {
    if let Some(name) = cfg.project.name.as_deref() {
        info!(
            project = name,
            version = cfg.project.version.as_deref().unwrap_or("unversioned"),
            "loaded manifest"
        );
    }
    if let Some(description) = cfg.project.description.as_deref() {
        debug!(description, "project description");
    }
}

/// Simple dry-run output: print tasks and pipelines with effective values.
fn print_dry_run(cfg: &ConfigFile) {
    println!("stylepipe dry-run");
    if let Some(name) = cfg.project.name.as_deref() {
        println!("  project: {name}");
    }
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        if let Some(src) = task.effective_src(&cfg.default) {
            println!("      src: {}", src.display());
        }
        if let Some(out) = task.effective_out(&cfg.default) {
            println!("      out: {}", out.display());
        }
        let load_paths = task.effective_load_paths(&cfg.default);
        if !load_paths.is_empty() {
            println!("      load_paths: {load_paths:?}");
        }
        println!(
            "      environment: {}",
            task.effective_environment(&cfg.default).as_str()
        );
        println!("      style: {}", task.effective_style(&cfg.default).as_str());
        if task.watch {
            println!("      watch: true");
        }
    }

    println!();
    println!("pipelines ({}):", cfg.pipeline.len());
    for (name, pipeline) in cfg.pipeline.iter() {
        println!("  - {name}");
        println!("      tasks: {:?}", pipeline.tasks);
        if pipeline.concurrent {
            println!("      concurrent: true");
        }
    }

    debug!("dry-run finished, nothing compiled");
}
