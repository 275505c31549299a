// tests/engine.rs

mod common;
use crate::common::builders::TaskSpecBuilder;
use crate::common::init_tracing;

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use stylepipe::engine::{
    PendingTriggers, PipelineOutcome, Runtime, RuntimeEvent, RuntimeOptions, TaskOutcome,
    TriggerReason,
};
use stylepipe::pipeline::Pipeline;
use stylepipe::registry::TaskSpec;

type TestResult = Result<(), Box<dyn Error>>;

fn pipeline(names: &[&str], concurrent: bool) -> Pipeline {
    Pipeline {
        name: "test".to_string(),
        tasks: names
            .iter()
            .map(|name| TaskSpecBuilder::new(name).build())
            .collect(),
        concurrent,
    }
}

/// A compiler stand-in: records which tasks it was asked to compile and
/// immediately reports the outcome chosen by `outcome_for`.
fn spawn_fake_compiler<F>(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    outcome_for: F,
) -> (mpsc::Sender<TaskSpec>, Arc<Mutex<Vec<String>>>)
where
    F: Fn(&str) -> TaskOutcome + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<TaskSpec>(16);
    let compiled = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&compiled);

    tokio::spawn(async move {
        while let Some(spec) = rx.recv().await {
            record.lock().unwrap().push(spec.name.clone());
            let outcome = outcome_for(&spec.name);
            if runtime_tx
                .send(RuntimeEvent::TaskCompleted {
                    task: spec.name,
                    outcome,
                })
                .await
                .is_err()
            {
                break;
            }
        }
    });

    (tx, compiled)
}

#[tokio::test]
async fn concurrent_pipeline_dispatches_every_task_and_exits_when_idle() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let (compile_tx, compiled) = spawn_fake_compiler(rt_tx.clone(), |_| TaskOutcome::Success);

    let runtime = Runtime::new(
        pipeline(&["watch", "prod"], true),
        RuntimeOptions {
            exit_when_idle: true,
        },
        rt_rx,
        compile_tx,
    );

    let outcome = timeout(Duration::from_secs(3), runtime.run()).await??;
    assert_eq!(outcome, PipelineOutcome::Success);
    assert_eq!(
        *compiled.lock().unwrap(),
        vec!["watch".to_string(), "prod".to_string()]
    );

    Ok(())
}

#[tokio::test]
async fn sequential_pipeline_runs_tasks_in_declaration_order() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let (compile_tx, compiled) = spawn_fake_compiler(rt_tx.clone(), |_| TaskOutcome::Success);

    let runtime = Runtime::new(
        pipeline(&["a", "b", "c"], false),
        RuntimeOptions {
            exit_when_idle: true,
        },
        rt_rx,
        compile_tx,
    );

    let outcome = timeout(Duration::from_secs(3), runtime.run()).await??;
    assert_eq!(outcome, PipelineOutcome::Success);
    assert_eq!(
        *compiled.lock().unwrap(),
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );

    Ok(())
}

#[tokio::test]
async fn sequential_pipeline_stops_at_the_first_failure() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let (compile_tx, compiled) = spawn_fake_compiler(rt_tx.clone(), |name| {
        if name == "b" {
            TaskOutcome::Failed
        } else {
            TaskOutcome::Success
        }
    });

    let runtime = Runtime::new(
        pipeline(&["a", "b", "c"], false),
        RuntimeOptions {
            exit_when_idle: true,
        },
        rt_rx,
        compile_tx,
    );

    let outcome = timeout(Duration::from_secs(3), runtime.run()).await??;
    assert_eq!(outcome, PipelineOutcome::Failed);
    // "c" never ran: the failure of "b" abandons the rest of the pass.
    assert_eq!(
        *compiled.lock().unwrap(),
        vec!["a".to_string(), "b".to_string()]
    );

    Ok(())
}

#[tokio::test]
async fn triggers_during_a_compile_coalesce_into_one_rerun() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    // The test plays the compiler itself so completions can be delayed
    // until after the triggers land.
    let (compile_tx, mut compile_rx) = mpsc::channel::<TaskSpec>(16);

    let runtime = Runtime::new(
        pipeline(&["dev"], true),
        RuntimeOptions {
            exit_when_idle: false,
        },
        rt_rx,
        compile_tx,
    );
    let handle = tokio::spawn(runtime.run());

    // Initial pass dispatches the task once.
    let first = timeout(Duration::from_secs(3), compile_rx.recv())
        .await?
        .expect("initial dispatch");
    assert_eq!(first.name, "dev");

    // Several watch triggers land while the compile is still in flight.
    for _ in 0..3 {
        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task: "dev".to_string(),
                reason: TriggerReason::FileWatch,
            })
            .await?;
    }

    // Completing the compile releases exactly one coalesced re-run.
    rt_tx
        .send(RuntimeEvent::TaskCompleted {
            task: "dev".to_string(),
            outcome: TaskOutcome::Success,
        })
        .await?;

    let rerun = timeout(Duration::from_secs(3), compile_rx.recv())
        .await?
        .expect("coalesced re-run");
    assert_eq!(rerun.name, "dev");

    // ...and only one.
    assert!(
        timeout(Duration::from_millis(200), compile_rx.recv())
            .await
            .is_err(),
        "no further dispatch should follow"
    );

    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;
    let outcome = timeout(Duration::from_secs(3), handle).await???;
    assert_eq!(outcome, PipelineOutcome::Success);

    Ok(())
}

#[tokio::test]
async fn watch_mode_retries_after_a_failed_compile_on_the_next_trigger() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let (compile_tx, mut compile_rx) = mpsc::channel::<TaskSpec>(16);

    let runtime = Runtime::new(
        pipeline(&["dev"], true),
        RuntimeOptions {
            exit_when_idle: false,
        },
        rt_rx,
        compile_tx,
    );
    let handle = tokio::spawn(runtime.run());

    let first = timeout(Duration::from_secs(3), compile_rx.recv())
        .await?
        .expect("initial dispatch");
    assert_eq!(first.name, "dev");

    // The compile fails; under watch the runtime stays alive.
    rt_tx
        .send(RuntimeEvent::TaskCompleted {
            task: "dev".to_string(),
            outcome: TaskOutcome::Failed,
        })
        .await?;

    // The next edit triggers a fresh compile.
    rt_tx
        .send(RuntimeEvent::TaskTriggered {
            task: "dev".to_string(),
            reason: TriggerReason::FileWatch,
        })
        .await?;

    let retry = timeout(Duration::from_secs(3), compile_rx.recv())
        .await?
        .expect("retry dispatch");
    assert_eq!(retry.name, "dev");

    // Ending the watch session by request is a normal exit, whatever
    // individual compiles did along the way.
    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;
    let outcome = timeout(Duration::from_secs(3), handle).await???;
    assert_eq!(outcome, PipelineOutcome::Success);

    Ok(())
}

#[test]
fn pending_triggers_coalesce_per_task() {
    init_tracing();

    let mut pending = PendingTriggers::new();
    assert!(pending.is_empty());

    assert!(pending.record("a"));
    assert!(!pending.record("a"), "second trigger coalesces into the first");
    assert!(pending.record("b"));

    assert!(pending.take("a"));
    assert!(!pending.take("a"), "a pending re-run is consumed once");
    assert!(pending.contains("b"));
    assert!(pending.take("b"));
    assert!(pending.is_empty());
}
