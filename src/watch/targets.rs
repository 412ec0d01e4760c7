// src/watch/targets.rs

use std::path::PathBuf;

use crate::config::{Config, ToolConfig};
use crate::pipeline::step::{StepKind, StepSelection};

/// Why a path is being watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchRole {
    /// A tool's resource list (or one patch file); a change re-runs that
    /// tool's step plus the chained patch/emulator steps.
    Trigger(StepKind),
    /// The working ROM itself; a change re-runs patching only.
    Artifact,
}

/// One watched path. Multiple targets may map to the same step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub path: PathBuf,
    pub role: WatchRole,
}

/// Resolve the fixed set of watch targets from config + selection.
///
/// Addmusick/GPS/UberASM list files live next to their tool's executable;
/// the Pixi list file is project-relative; every configured patch file is
/// its own trigger for the patch step. A tool with no configured trigger
/// file registers no watcher and can only run via an explicit one-shot
/// invocation. The input ROM is always watched.
pub fn collect_watch_targets(config: &Config, selection: &StepSelection) -> Vec<WatchTarget> {
    let mut targets = Vec::new();

    if selection.contains(StepKind::Music) {
        targets.extend(exe_relative_list(
            config,
            config.addmusick.as_ref(),
            StepKind::Music,
        ));
    }
    if selection.contains(StepKind::Sprites) {
        targets.extend(project_relative_list(
            config,
            config.pixi.as_ref(),
            StepKind::Sprites,
        ));
    }
    if selection.contains(StepKind::Blocks) {
        targets.extend(exe_relative_list(
            config,
            config.gps.as_ref(),
            StepKind::Blocks,
        ));
    }
    if selection.contains(StepKind::UberAsm) {
        targets.extend(exe_relative_list(
            config,
            config.uberasm.as_ref(),
            StepKind::UberAsm,
        ));
    }
    if selection.contains(StepKind::Patches) {
        if let Some(asar) = config.asar.as_ref() {
            if !asar.exe.is_empty() {
                let patch_root = config.patch_root(asar);
                for asm in asar.asm_files.iter().filter(|f| !f.trim().is_empty()) {
                    targets.push(WatchTarget {
                        path: patch_root.join(asm),
                        role: WatchRole::Trigger(StepKind::Patches),
                    });
                }
            }
        }
    }

    targets.push(WatchTarget {
        path: config.abs_input_rom(),
        role: WatchRole::Artifact,
    });

    targets
}

/// List file resolved against the tool executable's directory.
fn exe_relative_list(
    config: &Config,
    tool: Option<&ToolConfig>,
    kind: StepKind,
) -> Option<WatchTarget> {
    let tool = tool?;
    if tool.exe.is_empty() || tool.list_file.is_empty() {
        return None;
    }
    let exe = config.project_root().join(&tool.exe);
    let dir = exe.parent()?;
    Some(WatchTarget {
        path: dir.join(&tool.list_file),
        role: WatchRole::Trigger(kind),
    })
}

/// List file resolved against the project root.
fn project_relative_list(
    config: &Config,
    tool: Option<&ToolConfig>,
    kind: StepKind,
) -> Option<WatchTarget> {
    let tool = tool?;
    if tool.exe.is_empty() || tool.list_file.is_empty() {
        return None;
    }
    Some(WatchTarget {
        path: config.project_root().join(&tool.list_file),
        role: WatchRole::Trigger(kind),
    })
}
