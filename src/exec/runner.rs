// src/exec/runner.rs

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::StepError;
use crate::pipeline::step::StepCommand;

/// Result of one executed step.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub tool: &'static str,
    pub exit_code: i32,
    pub duration: Duration,
}

// Command-line echo coloring, stylistic only.
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Run one tool to completion.
///
/// The working directory is the executable's own directory, not the project
/// root, so tools that resolve their own relative resources behave exactly as
/// if launched from a shell inside their folder. Stdout/stderr are inherited;
/// the tool's output is the build log.
///
/// For a confirmation-prompting tool (`needs_confirmation`), the child's
/// stdin is kept open and a single newline is written once the process has
/// finished its work; if the stream no longer accepts writes the tool already
/// exited on its own and the write is a no-op.
pub async fn run_step(cmd: &StepCommand) -> Result<StepResult, StepError> {
    announce(cmd);
    let started = Instant::now();

    let mut command = Command::new(&cmd.exe);
    command.args(&cmd.args);
    if let Some(dir) = cmd.exe.parent() {
        if !dir.as_os_str().is_empty() {
            command.current_dir(dir);
        }
    }
    if cmd.needs_confirmation {
        command.stdin(Stdio::piped());
    }

    let mut child = command.spawn().map_err(|source| StepError::Launch {
        tool: cmd.tool,
        exe: cmd.exe.clone(),
        source,
    })?;
    let stdin = child.stdin.take();

    let status = child.wait().await.map_err(|source| StepError::Launch {
        tool: cmd.tool,
        exe: cmd.exe.clone(),
        source,
    })?;

    if let Some(mut stdin) = stdin {
        match stdin.write_all(b"\n").await {
            Ok(()) => {
                let _ = stdin.flush().await;
                println!();
            }
            Err(err) => {
                debug!(tool = cmd.tool, error = %err, "confirmation stdin closed");
            }
        }
    }

    let code = status.code().unwrap_or(-1);
    if !status.success() {
        return Err(StepError::Exited {
            tool: cmd.tool,
            code,
        });
    }

    info!(
        tool = cmd.tool,
        exit_code = code,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "tool finished"
    );

    Ok(StepResult {
        tool: cmd.tool,
        exit_code: code,
        duration: started.elapsed(),
    })
}

/// Launch a tool without waiting for it (the emulator outlives the build).
pub fn spawn_detached(cmd: &StepCommand) -> Result<(), StepError> {
    announce(cmd);

    let mut command = Command::new(&cmd.exe);
    command.args(&cmd.args);
    if let Some(dir) = cmd.exe.parent() {
        if !dir.as_os_str().is_empty() {
            command.current_dir(dir);
        }
    }
    command.stdin(Stdio::null());

    command.spawn().map_err(|source| StepError::Launch {
        tool: cmd.tool,
        exe: cmd.exe.clone(),
        source,
    })?;

    Ok(())
}

fn announce(cmd: &StepCommand) {
    println!("Running command:");
    println!("{CYAN}{}{RESET}\n", cmd.display_line());
}
