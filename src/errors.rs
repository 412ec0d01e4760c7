// src/errors.rs

//! Typed errors for pipeline steps.
//!
//! Configuration gaps are deliberately *not* errors: a tool that is absent or
//! missing its executable/list file is skipped by the step builders, never
//! reported here. `StepError` only covers the cases where a step was supposed
//! to run and couldn't, plus the required ROM copy before patching. Startup
//! failures (config load, watcher registration) use `anyhow` instead.

use std::path::PathBuf;

use thiserror::Error;

/// A pipeline step that should have run, but failed.
#[derive(Debug, Error)]
pub enum StepError {
    /// The tool's executable could not be spawned (missing binary,
    /// permission denied, ...).
    #[error("failed to launch {tool} ({exe}): {source}")]
    Launch {
        tool: &'static str,
        exe: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure through its exit code.
    #[error("{tool} exited with code {code}")]
    Exited { tool: &'static str, code: i32 },

    /// Copying the input ROM onto the output ROM failed. No later step can
    /// do anything useful without the output ROM, so this is always fatal
    /// for the run.
    #[error("copying ROM {from} -> {to}: {source}")]
    CopyRom {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
