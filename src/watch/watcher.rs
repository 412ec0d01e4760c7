// src/watch/watcher.rs

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::BuildEvent;
use crate::watch::targets::{WatchRole, WatchTarget};

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn filesystem watchers for the given targets and forward matching
/// change notifications as `BuildEvent::PathChanged` messages.
///
/// Each target's parent directory is watched non-recursively and events are
/// filtered down to the exact target paths. Events for the ROM are dropped
/// at this layer while `rom_armed` is false; that is how the orchestrator
/// disarms the ROM watcher for the duration of a pipeline run that rewrites
/// the ROM.
pub fn spawn_watchers(
    targets: Vec<WatchTarget>,
    events_tx: mpsc::Sender<BuildEvent>,
    rom_armed: Arc<AtomicBool>,
) -> Result<WatcherHandle> {
    let mut by_path: HashMap<PathBuf, WatchTarget> = HashMap::new();
    let mut dirs: HashSet<PathBuf> = HashSet::new();

    for target in targets {
        let path = normalize(&target.path);
        if let Some(dir) = path.parent() {
            dirs.insert(dir.to_path_buf());
        }
        by_path.insert(path, target);
    }

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        {
            let event_tx = event_tx.clone();
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(err) = event_tx.send(event) {
                        // We can't log via tracing here easily, so fallback to stderr.
                        eprintln!("smwbuild: failed to forward notify event: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("smwbuild: file watch error: {err}");
                }
            }
        },
        NotifyConfig::default(),
    )?;

    for dir in &dirs {
        if let Err(err) = watcher.watch(dir, RecursiveMode::NonRecursive) {
            // A misconfigured tool must not take down watch mode entirely.
            warn!(dir = %dir.display(), error = %err, "cannot watch directory; skipping");
        }
    }

    info!(
        directories = dirs.len(),
        targets = by_path.len(),
        "file watchers started"
    );

    // Async task that consumes notify events and forwards matching targets
    // to the orchestrator.
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!("received notify event: {:?}", event);

            for path in &event.paths {
                let Some(target) = by_path.get(&normalize(path)) else {
                    continue;
                };

                if matches!(target.role, WatchRole::Artifact)
                    && !rom_armed.load(Ordering::SeqCst)
                {
                    debug!(
                        path = %path.display(),
                        "ROM watcher disarmed; dropping self-inflicted event"
                    );
                    continue;
                }

                if events_tx
                    .send(BuildEvent::PathChanged(target.clone()))
                    .await
                    .is_err()
                {
                    // Orchestrator gone; no point keeping this loop alive.
                    return;
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Best-effort canonical form for path comparison.
///
/// The watched file itself may briefly not exist during an editor's
/// delete-and-rename save cycle, so the parent is canonicalized and the file
/// name re-attached.
fn normalize(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => dir
            .canonicalize()
            .map(|d| d.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}
