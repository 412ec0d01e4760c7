// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod watch;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use crate::cli::CliArgs;
use crate::config::Config;
use crate::engine::{BuildEvent, Orchestrator};
use crate::pipeline::Pipeline;
use crate::pipeline::step::{self, StepKind, StepSelection};
use crate::watch::debounce::DebounceGate;
use crate::watch::targets::collect_watch_targets;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - step selection from CLI flags
/// - the pipeline (one-shot mode)
/// - watchers + debounce gate + orchestrator (watch mode)
/// - Ctrl-C / enter-to-exit handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config = config::load_from_path(&args.config)?;
    let selection = StepSelection::from_args(&args);

    if args.dry_run {
        print_dry_run(&config, &selection, args.verbose);
        return Ok(());
    }

    if !args.watch {
        // One pass over the selected steps; the first fatal step error aborts
        // the rest and surfaces as a non-zero process exit.
        let pipeline = Pipeline::new(config, selection, args.verbose);
        pipeline.run_once().await?;
        return Ok(());
    }

    // Watch mode. Rebuilds triggered from the watcher always run the tools
    // verbose, independent of -v.
    let rom_armed = Arc::new(AtomicBool::new(true));
    let (events_tx, events_rx) = mpsc::channel::<BuildEvent>(64);

    let targets = collect_watch_targets(&config, &selection);
    let _watcher_handle =
        watch::spawn_watchers(targets, events_tx.clone(), Arc::clone(&rom_armed))?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = events_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(BuildEvent::ShutdownRequested).await;
        });
    }

    // Enter on stdin also exits, like the console tool this fronts.
    {
        let tx = events_tx.clone();
        tokio::spawn(async move {
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            let _ = lines.next_line().await;
            let _ = tx.send(BuildEvent::ShutdownRequested).await;
        });
    }

    let gate = DebounceGate::new(config.abs_input_rom());
    let pipeline = Pipeline::new(config, selection, true);
    let orchestrator = Orchestrator::new(pipeline, gate, rom_armed);
    orchestrator.run(events_rx).await
}

/// Print the resolved command for every selected step without executing.
fn print_dry_run(config: &Config, selection: &StepSelection, verbose: bool) {
    println!("smwbuild dry-run");
    println!("  project root: {}", config.project_root().display());
    println!("  input ROM:    {}", config.abs_input_rom().display());
    println!("  output ROM:   {}", config.abs_output_rom().display());
    println!();

    for kind in selection.ordered() {
        match kind {
            StepKind::Patches => {
                println!(
                    "  - asar: copy {} -> {}",
                    config.abs_input_rom().display(),
                    config.abs_output_rom().display()
                );
                let commands = step::asar_patch_commands(config, verbose);
                if commands.is_empty() {
                    println!("      (patch tool not configured; copy only)");
                }
                for cmd in commands {
                    println!("      {}", cmd.display_line());
                }
            }
            other => match step::command_for(config, other, verbose) {
                Some(cmd) => println!("  - {}: {}", cmd.tool, cmd.display_line()),
                None => println!("  - {}: skipped (not configured)", other.tool()),
            },
        }
    }
}
