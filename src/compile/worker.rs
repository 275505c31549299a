// src/compile/worker.rs

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::compile::sass;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::registry::TaskSpec;

/// Spawn the background compiler loop.
///
/// The returned `mpsc::Sender<TaskSpec>` is what the runtime uses as
/// `compile_tx` in `engine::Runtime`. Each received task is compiled in its
/// own Tokio task on the blocking thread pool, so a concurrent pipeline's
/// tasks genuinely overlap.
pub fn spawn_compiler(runtime_tx: mpsc::Sender<RuntimeEvent>) -> mpsc::Sender<TaskSpec> {
    let (tx, mut rx) = mpsc::channel::<TaskSpec>(32);

    tokio::spawn(async move {
        info!("compiler loop started");
        while let Some(task) = rx.recv().await {
            let runtime_tx = runtime_tx.clone();
            tokio::spawn(async move {
                run_job(task, runtime_tx).await;
            });
        }
        info!("compiler loop finished (channel closed)");
    });

    tx
}

/// Compile one task and emit a `TaskCompleted` event.
///
/// All errors become a failed completion; the compiler's diagnostic text is
/// logged so a broken stylesheet reads as a compile error, not a crash.
async fn run_job(task: TaskSpec, runtime_tx: mpsc::Sender<RuntimeEvent>) {
    let name = task.name.clone();

    info!(
        task = %name,
        environment = task.environment.as_str(),
        style = task.style.as_str(),
        src = %task.src.display(),
        "starting compile"
    );

    let result = tokio::task::spawn_blocking(move || sass::compile_task(&task)).await;

    let outcome = match result {
        Ok(Ok(stats)) => {
            info!(
                task = %name,
                sheets = stats.sheets,
                elapsed_ms = stats.elapsed.as_millis() as u64,
                "compile finished"
            );
            TaskOutcome::Success
        }
        Ok(Err(err)) => {
            error!(task = %name, error = %err, "compile failed");
            TaskOutcome::Failed
        }
        Err(err) => {
            error!(task = %name, error = %err, "compile job panicked");
            TaskOutcome::Failed
        }
    };

    let _ = runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: name,
            outcome,
        })
        .await;
}
