// src/watch/watcher.rs

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TaskName, TriggerReason};
use crate::watch::hash::task_tree_hash;
use crate::watch::patterns::TaskWatchProfile;

/// Owns the `RecommendedWatcher`; file watching stops when this drops,
/// so `lib.rs` holds it for the whole session.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher over every profile's source directory and
/// send `RuntimeEvent::TaskTriggered` for tasks whose source tree actually
/// changed.
///
/// Editors routinely emit several filesystem events for a single save, so
/// a raw event is not enough to justify a recompile. Each matching event is
/// gated on a content hash of the task's source tree: only when the hash
/// moved does a trigger go out. Hashes live in memory for the duration of
/// the watch session; the initial values are taken at spawn time, so an
/// unchanged-content rewrite never retriggers a compile.
pub fn spawn_watcher(
    profiles: Vec<TaskWatchProfile>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    // Canonical source paths, so notify's absolute event paths relativize
    // cleanly against them.
    let profiles: Vec<TaskWatchProfile> =
        profiles.into_iter().map(|p| p.canonicalized()).collect();
    let profiles = Arc::new(profiles);

    // notify calls its handler on its own thread; bridge into tokio with an
    // unbounded channel so the handler never blocks.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        {
            let event_tx = event_tx.clone();
            move |res: notify::Result<Event>| {
                match res {
                    Ok(event) => {
                        if let Err(err) = event_tx.send(event) {
                            // Not on a tracing-subscriber thread; stderr it is.
                            eprintln!("stylepipe: failed to forward notify event: {err}");
                        }
                    }
                    Err(err) => {
                        eprintln!("stylepipe: file watch error: {err}");
                    }
                }
            }
        },
        Config::default(),
    )?;

    // Several tasks may watch the same tree; register each directory once.
    let mut watched: HashSet<PathBuf> = HashSet::new();
    for profile in profiles.iter() {
        if watched.insert(profile.src().to_path_buf()) {
            watcher.watch(profile.src(), RecursiveMode::Recursive)?;
            info!(task = %profile.name(), "watching {:?} for style changes", profile.src());
        }
    }

    // Consumer side: match events against profiles, gate on the tree hash,
    // forward triggers to the runtime.
    let async_profiles = Arc::clone(&profiles);
    tokio::spawn(async move {
        let mut last_hashes: HashMap<TaskName, String> = HashMap::new();
        for profile in async_profiles.iter() {
            match task_tree_hash(profile.src()) {
                Ok(hash) => {
                    last_hashes.insert(profile.name().to_string(), hash);
                }
                Err(err) => {
                    warn!(
                        task = %profile.name(),
                        error = %err,
                        "failed to hash source tree at startup"
                    );
                }
            }
        }

        while let Some(event) = event_rx.recv().await {
            debug!(?event, "filesystem event");

            for path in &event.paths {
                for profile in async_profiles.iter() {
                    // Paths under a different profile's tree are normal
                    // with several watch roots; just move on.
                    let Some(rel_str) = relative_str(profile.src(), path) else {
                        continue;
                    };
                    if !profile.matches(&rel_str) {
                        continue;
                    }

                    if !tree_changed(profile, &mut last_hashes) {
                        debug!(
                            task = %profile.name(),
                            path = %rel_str,
                            "content unchanged; skipping trigger"
                        );
                        continue;
                    }

                    debug!(
                        task = %profile.name(),
                        path = %rel_str,
                        "source tree changed, triggering recompile"
                    );
                    let send = runtime_tx
                        .send(RuntimeEvent::TaskTriggered {
                            task: profile.name().to_string(),
                            reason: TriggerReason::FileWatch,
                        })
                        .await;
                    if let Err(err) = send {
                        warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
                        // Runtime gone, nothing left to trigger.
                        return;
                    }
                }
            }
        }

        debug!("watch event loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Re-hash the profile's source tree and report whether it moved since the
/// last stored value, updating the store when it did. A hashing failure
/// counts as changed.
fn tree_changed(profile: &TaskWatchProfile, last_hashes: &mut HashMap<TaskName, String>) -> bool {
    match task_tree_hash(profile.src()) {
        Ok(hash) => {
            let changed = last_hashes
                .get(profile.name())
                .map(|previous| previous != &hash)
                .unwrap_or(true);
            if changed {
                last_hashes.insert(profile.name().to_string(), hash);
            }
            changed
        }
        Err(err) => {
            warn!(
                task = %profile.name(),
                error = %err,
                "failed to hash source tree; treating as changed"
            );
            true
        }
    }
}

/// Path relative to `base` as a forward-slash string, or `None` when the
/// path lives outside `base`.
fn relative_str(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let s = rel.to_string_lossy().replace('\\', "/");
    Some(s)
}
