// src/engine/orchestrator.rs

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::pipeline::Pipeline;
use crate::pipeline::step::StepKind;
use crate::watch::debounce::DebounceGate;
use crate::watch::targets::{WatchRole, WatchTarget};

/// Messages sent into the orchestrator from watchers and shutdown listeners.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    PathChanged(WatchTarget),
    ShutdownRequested,
}

/// The watch-mode orchestrator.
///
/// Owns the pipeline, the debounce state, and the ROM-armed flag; there are
/// no ambient globals. The main loop dequeues one message at a time and runs
/// any resulting pipeline to completion before looking at the next message,
/// so at most one run is ever in flight and the ROM is never written
/// concurrently.
pub struct Orchestrator {
    pipeline: Pipeline,
    gate: DebounceGate,
    rom_armed: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(pipeline: Pipeline, gate: DebounceGate, rom_armed: Arc<AtomicBool>) -> Self {
        Self {
            pipeline,
            gate,
            rom_armed,
        }
    }

    /// Main event loop. Returns when a shutdown message arrives or every
    /// sender has gone away.
    pub async fn run(mut self, mut events_rx: mpsc::Receiver<BuildEvent>) -> Result<()> {
        info!("watch loop started");
        print_watching_message();

        while let Some(event) = events_rx.recv().await {
            match event {
                BuildEvent::PathChanged(target) => {
                    // The notified path's mtime feeds the debounce decision.
                    // A path that can't be stat'ed is mid-save; the editor
                    // will produce another event for it.
                    let Some(observed) = modified_time(&target.path) else {
                        continue;
                    };
                    self.handle_change(&target, observed).await;
                }
                BuildEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping watch loop");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Apply the debounce gate to one observed change and, if accepted, run
    /// the sub-pipeline for the target's role. Returns whether a run
    /// happened.
    ///
    /// The ROM watcher is disarmed for the entire run and re-armed exactly
    /// once afterwards, whether the run succeeded or failed; a failed run is
    /// logged and the loop keeps watching.
    pub async fn handle_change(&mut self, target: &WatchTarget, observed: SystemTime) -> bool {
        if !self.gate.should_accept(&target.path, observed) {
            return false;
        }

        println!("{} has changed.", target.path.display());

        self.rom_armed.store(false, Ordering::SeqCst);
        let outcome = self.pipeline.run_steps(&self.steps_for(target.role)).await;
        self.rom_armed.store(true, Ordering::SeqCst);

        match outcome {
            Ok(results) => {
                debug!(steps = results.len(), "triggered run finished");
                print_finished_message();
            }
            Err(err) => {
                error!(error = %err, "triggered run failed; still watching");
            }
        }
        print_watching_message();

        true
    }

    /// Minimal sub-pipeline for a change to the given target.
    ///
    /// A trigger-file change re-runs its own tool's insertion, then patching
    /// and the emulator when selected. A direct ROM change (the operator
    /// saved from the editor, or another process wrote it) skips straight to
    /// patching.
    fn steps_for(&self, role: WatchRole) -> Vec<StepKind> {
        let selection = self.pipeline.selection();
        let mut steps = Vec::new();

        if let WatchRole::Trigger(kind) = role {
            if kind != StepKind::Patches {
                steps.push(kind);
            }
        }
        if selection.contains(StepKind::Patches) {
            steps.push(StepKind::Patches);
        }
        if selection.contains(StepKind::Emulator) {
            steps.push(StepKind::Emulator);
        }

        steps
    }

    /// Whether the ROM watcher is currently armed.
    pub fn rom_watch_armed(&self) -> bool {
        self.rom_armed.load(Ordering::SeqCst)
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(time) => Some(time),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "cannot read mtime");
            None
        }
    }
}

fn print_finished_message() {
    println!(
        "Finished running at {}.",
        chrono::Local::now().format("%H:%M:%S")
    );
}

fn print_watching_message() {
    println!("Watching for changes...");
    println!("Press enter to exit.");
}
