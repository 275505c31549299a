// src/engine/runtime.rs

use std::collections::{HashSet, VecDeque};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::queue::PendingTriggers;
use crate::errors::Result;
use crate::pipeline::Pipeline;
use crate::registry::TaskSpec;

/// Task names as they appear in the manifest; the engine keys everything
/// on these.
pub type TaskName = String;

/// What caused a task to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    FileWatch,
    Manual,
}

/// Result of a single compile run of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Overall result of running a pipeline to its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    Success,
    /// At least one task compile failed during the run.
    Failed,
}

/// Everything the runtime reacts to, funnelled through one channel:
/// `TaskTriggered` from the watcher, `TaskCompleted` from the compiler,
/// `ShutdownRequested` from the Ctrl-C handler.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    ShutdownRequested,
}

/// Knobs set by `lib.rs` before the runtime starts.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// If true, exit as soon as no task is compiling, none is queued for
    /// the initial pass, and no re-run is pending. In watch mode this
    /// should be `false`.
    pub exit_when_idle: bool,
}

/// Orchestrates one pipeline run.
///
/// Seeds the initial compile pass (all tasks at once when the pipeline is
/// concurrent, in declaration order otherwise), then loops over
/// `RuntimeEvent`s: sending [`TaskSpec`]s to the compiler when a task
/// should run and coalescing triggers for tasks already compiling.
pub struct Runtime {
    pipeline: Pipeline,
    pending: PendingTriggers,
    options: RuntimeOptions,

    /// Unified event stream from all producers.
    events_rx: mpsc::Receiver<RuntimeEvent>,

    /// Channel to the compiler; every send is one compile run.
    compile_tx: mpsc::Sender<TaskSpec>,

    /// Tasks currently being compiled.
    running: HashSet<TaskName>,

    /// Initial-pass tasks not yet dispatched (sequential pipelines only).
    queued: VecDeque<TaskName>,

    /// Latched once any task fails; decides the final [`PipelineOutcome`]
    /// when `exit_when_idle` ends the loop.
    any_failed: bool,
}

impl Runtime {
    pub fn new(
        pipeline: Pipeline,
        options: RuntimeOptions,
        events_rx: mpsc::Receiver<RuntimeEvent>,
        compile_tx: mpsc::Sender<TaskSpec>,
    ) -> Self {
        Self {
            pipeline,
            pending: PendingTriggers::new(),
            options,
            events_rx,
            compile_tx,
            running: HashSet::new(),
            queued: VecDeque::new(),
            any_failed: false,
        }
    }

    /// Event loop. Consumes the runtime; runs until the channel closes,
    /// shutdown is requested, or (`exit_when_idle`) all work drains.
    ///
    /// By the time this is called the pipeline must be resolved and the
    /// compiler (plus the watcher, in watch mode) must already hold a
    /// clone of the `mpsc::Sender<RuntimeEvent>`.
    pub async fn run(mut self) -> Result<PipelineOutcome> {
        info!(pipeline = %self.pipeline.name, "stylepipe runtime started");

        self.seed_initial_tasks().await?;

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "handling runtime event");

            let keep_running = match event {
                RuntimeEvent::TaskTriggered { task, reason } => {
                    self.handle_task_trigger(task, reason).await?
                }
                RuntimeEvent::TaskCompleted { task, outcome } => {
                    self.handle_task_completion(task, outcome).await?
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, ending watch session");
                    // A watch session ended by Ctrl-C is a normal exit,
                    // whatever individual compiles did along the way.
                    self.any_failed = false;
                    false
                }
            };

            if !keep_running {
                break;
            }
        }

        let outcome = if self.any_failed {
            PipelineOutcome::Failed
        } else {
            PipelineOutcome::Success
        };

        info!(pipeline = %self.pipeline.name, ?outcome, "stylepipe runtime exiting");
        Ok(outcome)
    }

    /// Dispatch the pipeline's initial compile pass.
    ///
    /// Concurrent pipelines send every task to the compiler immediately;
    /// sequential pipelines send the first and queue the rest, advancing
    /// one task per successful completion.
    async fn seed_initial_tasks(&mut self) -> Result<()> {
        let names: Vec<TaskName> = self.pipeline.tasks.iter().map(|t| t.name.clone()).collect();

        if self.pipeline.concurrent {
            info!(tasks = ?names, "dispatching all pipeline tasks concurrently");
            for name in names {
                self.dispatch(&name).await?;
            }
        } else {
            info!(tasks = ?names, "running pipeline tasks in order");
            self.queued = names.into();
            if let Some(first) = self.queued.pop_front() {
                self.dispatch(&first).await?;
            }
        }

        Ok(())
    }

    /// Handle a trigger (from file watching, or manual for the seed pass).
    async fn handle_task_trigger(&mut self, task: TaskName, reason: TriggerReason) -> Result<bool> {
        info!(task = %task, ?reason, "task triggered");

        if self.pipeline.task(&task).is_none() {
            warn!(task = %task, "trigger for task outside this pipeline; ignoring");
            return Ok(true);
        }

        if self.running.contains(&task) {
            // Compile in flight; remember to run once more when it ends.
            self.pending.record(&task);
        } else if self.queued.contains(&task) {
            debug!(task = %task, "task still queued for the initial pass; ignoring");
        } else {
            self.dispatch(&task).await?;
        }

        Ok(true)
    }

    /// Handle completion of a compile run.
    async fn handle_task_completion(
        &mut self,
        task: TaskName,
        outcome: TaskOutcome,
    ) -> Result<bool> {
        match outcome {
            TaskOutcome::Success => info!(task = %task, "task completed successfully"),
            TaskOutcome::Failed => {
                warn!(task = %task, "task failed");
                self.any_failed = true;
            }
        }

        self.running.remove(&task);

        // A trigger that arrived mid-compile re-runs the task now, with
        // whatever the files currently contain. This also retries after a
        // failed compile once the sources changed again.
        if self.pending.take(&task) {
            debug!(task = %task, "re-running task for coalesced trigger");
            self.dispatch(&task).await?;
        }

        self.advance_sequential(outcome).await?;

        if self.options.exit_when_idle && self.is_idle() {
            info!("all tasks drained, one-shot run complete");
            return Ok(false);
        }

        Ok(true)
    }

    /// In a sequential pipeline, a successful completion dispatches the
    /// next queued task; a failure abandons the rest of the pass.
    async fn advance_sequential(&mut self, outcome: TaskOutcome) -> Result<()> {
        if self.pipeline.concurrent || self.queued.is_empty() {
            return Ok(());
        }

        match outcome {
            TaskOutcome::Success => {
                if self.running.is_empty() {
                    if let Some(next) = self.queued.pop_front() {
                        self.dispatch(&next).await?;
                    }
                }
            }
            TaskOutcome::Failed => {
                let skipped: Vec<TaskName> = self.queued.drain(..).collect();
                warn!(
                    skipped = ?skipped,
                    "task failed; skipping the rest of the sequential pipeline"
                );
            }
        }

        Ok(())
    }

    fn is_idle(&self) -> bool {
        self.running.is_empty() && self.queued.is_empty() && self.pending.is_empty()
    }

    /// Send one task to the compiler.
    async fn dispatch(&mut self, task: &str) -> Result<()> {
        let spec = match self.pipeline.task(task) {
            Some(spec) => spec.clone(),
            None => {
                warn!(task = %task, "dispatch requested for task outside this pipeline; ignoring");
                return Ok(());
            }
        };

        debug!(task = %task, "dispatching task to compiler");
        self.running.insert(spec.name.clone());

        if let Err(err) = self.compile_tx.send(spec).await {
            error!(error = %err, "failed to send task to compiler");
            // A closed compiler channel means the worker died; give up.
            return Err(anyhow::anyhow!("compiler channel closed").into());
        }

        Ok(())
    }
}
