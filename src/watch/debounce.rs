// src/watch/debounce.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

/// Minimum elapsed time between two changes to the same path for the second
/// to count as a distinct, actionable change.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Per-path debounce state for the watch loop.
///
/// Editors and the insertion tools produce bursts of change notifications for
/// a single logical save; the gate collapses each burst to one accepted
/// change by remembering the last accepted write time per path. Entries are
/// created lazily on first observed change and live for the process lifetime.
#[derive(Debug)]
pub struct DebounceGate {
    window: Duration,
    rom: PathBuf,
    last_accepted: HashMap<PathBuf, SystemTime>,
}

impl DebounceGate {
    /// Gate with the standard 500 ms window. `rom` is the watched artifact.
    pub fn new(rom: impl Into<PathBuf>) -> Self {
        Self::with_window(rom, DEBOUNCE_WINDOW)
    }

    pub fn with_window(rom: impl Into<PathBuf>, window: Duration) -> Self {
        Self {
            window,
            rom: rom.into(),
            last_accepted: HashMap::new(),
        }
    }

    /// Decide whether an observed write is a real change.
    ///
    /// A path never seen before compares against the epoch and is always
    /// accepted. On acceptance the observed time is recorded for `path` and
    /// *also* stamped onto the ROM path: every accepted trigger-file change
    /// is about to be followed by a ROM rewrite, and the anticipatory stamp
    /// keeps the ROM's own watcher from re-firing when that rewrite lands
    /// inside the same window.
    pub fn should_accept(&mut self, path: &Path, observed: SystemTime) -> bool {
        let last = self
            .last_accepted
            .get(path)
            .copied()
            .unwrap_or(UNIX_EPOCH);
        let elapsed = observed.duration_since(last).unwrap_or(Duration::ZERO);

        if elapsed <= self.window {
            debug!(
                path = %path.display(),
                "change within debounce window; ignoring"
            );
            return false;
        }

        self.last_accepted.insert(path.to_path_buf(), observed);
        self.last_accepted.insert(self.rom.clone(), observed);
        true
    }

    /// Last accepted change time for a path, if any.
    pub fn last_accepted(&self, path: &Path) -> Option<SystemTime> {
        self.last_accepted.get(path).copied()
    }
}
