// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Resolving the fixed set of watched paths from config + selection
//!   (`targets`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) that forwards
//!   matching events into the orchestrator's channel (`watcher`).
//! - Deciding which raw notifications are real, debounced changes
//!   (`debounce`).
//!
//! It does **not** run any tools; it only turns filesystem changes into
//! build-level messages.

pub mod debounce;
pub mod targets;
pub mod watcher;

pub use debounce::{DEBOUNCE_WINDOW, DebounceGate};
pub use targets::{WatchRole, WatchTarget, collect_watch_targets};
pub use watcher::{WatcherHandle, spawn_watchers};
