// src/pipeline/mod.rs

//! Step sequencing.
//!
//! A [`Pipeline`] owns the immutable job config, the resolved step selection,
//! and the verbose flag, and runs any ordered list of steps strictly
//! sequentially; later steps depend on the ROM state produced by earlier
//! ones, so nothing here is parallel.
//!
//! - [`step`] holds the step identifiers, the selection set, and the per-tool
//!   command assembly.
//! - The patch step is special: it always copies the input ROM onto the
//!   output ROM first, then applies the configured patch list in order.

pub mod step;

use tracing::debug;

use crate::config::Config;
use crate::errors::StepError;
use crate::exec::runner::{self, StepResult};
use crate::pipeline::step::{StepKind, StepSelection};

/// The ordered build pipeline for one job.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    selection: StepSelection,
    verbose: bool,
}

impl Pipeline {
    pub fn new(config: Config, selection: StepSelection, verbose: bool) -> Self {
        Self {
            config,
            selection,
            verbose,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn selection(&self) -> &StepSelection {
        &self.selection
    }

    /// Run every selected step once, in canonical order.
    pub async fn run_once(&self) -> Result<Vec<StepResult>, StepError> {
        self.run_steps(&self.selection.ordered()).await
    }

    /// Run the given steps strictly sequentially.
    ///
    /// A step whose tool is absent or misconfigured is skipped silently; a
    /// step that fails aborts the remaining steps and surfaces the error to
    /// the caller, which decides whether that is fatal (one-shot mode) or
    /// just logged (watch mode).
    pub async fn run_steps(&self, kinds: &[StepKind]) -> Result<Vec<StepResult>, StepError> {
        let mut results = Vec::new();

        for kind in kinds {
            match kind {
                StepKind::Patches => self.run_patches(&mut results).await?,
                StepKind::Emulator => self.run_emulator()?,
                other => match step::command_for(&self.config, *other, self.verbose) {
                    Some(cmd) => results.push(runner::run_step(&cmd).await?),
                    None => {
                        debug!(step = other.tool(), "step not configured; skipping");
                    }
                },
            }
        }

        Ok(results)
    }

    /// Copy input ROM → output ROM, then apply the patch list in order.
    ///
    /// The copy happens even when the patch tool itself is unconfigured, so
    /// the output ROM always reflects the latest insertions. Patches are
    /// cumulative against the same output ROM.
    async fn run_patches(&self, results: &mut Vec<StepResult>) -> Result<(), StepError> {
        let from = self.config.abs_input_rom();
        let to = self.config.abs_output_rom();

        tokio::fs::copy(&from, &to)
            .await
            .map_err(|source| StepError::CopyRom {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
        println!(
            "Copied from {} to {}",
            self.config.input_rom, self.config.output_rom
        );

        let commands = step::asar_patch_commands(&self.config, self.verbose);
        if commands.is_empty() {
            debug!("patch tool not configured; copy only");
            return Ok(());
        }

        for cmd in &commands {
            results.push(runner::run_step(cmd).await?);
        }
        Ok(())
    }

    fn run_emulator(&self) -> Result<(), StepError> {
        match step::command_for(&self.config, StepKind::Emulator, self.verbose) {
            Some(cmd) => runner::spawn_detached(&cmd),
            None => {
                debug!("emulator not configured; skipping");
                Ok(())
            }
        }
    }
}
