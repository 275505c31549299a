// src/engine/queue.rs

use std::collections::BTreeSet;

use tracing::debug;

use super::runtime::TaskName;

/// Triggers that arrived while their task was already compiling.
///
/// Semantics:
/// - Each task holds at most one pending re-run, no matter how many
///   triggers arrive while it is busy. Editors routinely produce several
///   filesystem events per save; the corresponding task should recompile
///   once more, not once per event.
/// - When the runtime sees a task complete, it calls [`take`](Self::take)
///   and re-dispatches the task if a trigger was recorded in the meantime.
///   The re-run picks up the newest file contents, so collapsing triggers
///   loses nothing.
#[derive(Debug, Default)]
pub struct PendingTriggers {
    pending: BTreeSet<TaskName>,
}

impl PendingTriggers {
    pub fn new() -> Self {
        Self {
            pending: BTreeSet::new(),
        }
    }

    /// Returns true if no task has a pending re-run.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Record that a task was triggered while it was compiling.
    ///
    /// Returns `false` if the task already had a pending re-run (the
    /// trigger coalesces into it).
    pub fn record(&mut self, task: &str) -> bool {
        let inserted = self.pending.insert(task.to_string());
        debug!(
            task = %task,
            coalesced = !inserted,
            "recorded trigger for busy task"
        );
        inserted
    }

    /// Remove and report a pending re-run for `task`, if any.
    pub fn take(&mut self, task: &str) -> bool {
        self.pending.remove(task)
    }

    pub fn contains(&self, task: &str) -> bool {
        self.pending.contains(task)
    }
}
