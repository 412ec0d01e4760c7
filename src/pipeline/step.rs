// src/pipeline/step.rs

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::cli::CliArgs;
use crate::config::Config;

/// Identifier for one pipeline step.
///
/// Variant order is the canonical execution order: insertions first, then
/// patching, then the emulator. `StepSelection::ordered` relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StepKind {
    /// Insert music via Addmusick.
    Music,
    /// Insert sprites via Pixi.
    Sprites,
    /// Insert blocks via GPS.
    Blocks,
    /// Insert level/overworld code via UberASM.
    UberAsm,
    /// Copy input ROM to output ROM and apply the Asar patch list.
    Patches,
    /// Launch the emulator on the output ROM.
    Emulator,
}

impl StepKind {
    /// The external tool behind this step.
    pub fn tool(self) -> &'static str {
        match self {
            StepKind::Music => "addmusick",
            StepKind::Sprites => "pixi",
            StepKind::Blocks => "gps",
            StepKind::UberAsm => "uberasm",
            StepKind::Patches => "asar",
            StepKind::Emulator => "emulator",
        }
    }
}

/// The set of steps enabled for this run, resolved once from CLI flags and
/// consumed read-only thereafter.
#[derive(Debug, Clone)]
pub struct StepSelection {
    enabled: BTreeSet<StepKind>,
}

impl StepSelection {
    /// Resolve the selection from parsed flags.
    ///
    /// A bare invocation with none of the five step flags enables all of
    /// them, so `smwbuild` with no arguments performs a full build.
    pub fn from_args(args: &CliArgs) -> Self {
        let mut enabled = BTreeSet::new();
        if args.music {
            enabled.insert(StepKind::Music);
        }
        if args.sprites {
            enabled.insert(StepKind::Sprites);
        }
        if args.blocks {
            enabled.insert(StepKind::Blocks);
        }
        if args.uberasm {
            enabled.insert(StepKind::UberAsm);
        }
        if args.patches {
            enabled.insert(StepKind::Patches);
        }
        if enabled.is_empty() {
            enabled.extend([
                StepKind::Music,
                StepKind::Sprites,
                StepKind::Blocks,
                StepKind::UberAsm,
                StepKind::Patches,
            ]);
        }
        if args.run {
            enabled.insert(StepKind::Emulator);
        }
        Self { enabled }
    }

    /// Build a selection from explicit step kinds.
    pub fn from_kinds(kinds: impl IntoIterator<Item = StepKind>) -> Self {
        Self {
            enabled: kinds.into_iter().collect(),
        }
    }

    pub fn contains(&self, kind: StepKind) -> bool {
        self.enabled.contains(&kind)
    }

    /// Enabled steps in canonical execution order.
    pub fn ordered(&self) -> Vec<StepKind> {
        self.enabled.iter().copied().collect()
    }
}

/// A fully-assembled command for one external tool invocation.
#[derive(Debug, Clone)]
pub struct StepCommand {
    pub tool: &'static str,
    pub exe: PathBuf,
    pub args: Vec<String>,
    /// The tool pauses for operator confirmation before exiting; the runner
    /// writes a newline to its stdin once it finishes.
    pub needs_confirmation: bool,
}

impl StepCommand {
    /// The command as the operator would type it.
    pub fn display_line(&self) -> String {
        if self.args.is_empty() {
            self.exe.display().to_string()
        } else {
            format!("{} {}", self.exe.display(), self.args.join(" "))
        }
    }
}

/// Assemble the command for a single-invocation step.
///
/// Returns `None` when the tool is absent from the config or missing its
/// executable or list file; the pipeline treats that as a silent skip.
/// `Patches` is multi-invocation and handled by [`asar_patch_commands`].
pub fn command_for(config: &Config, kind: StepKind, verbose: bool) -> Option<StepCommand> {
    let rom = config.abs_input_rom().display().to_string();

    match kind {
        StepKind::Music => {
            let tool = config.addmusick.as_ref()?;
            if tool.exe.is_empty() {
                return None;
            }
            let mut args = template_args(&tool.args);
            args.push(rom);
            Some(StepCommand {
                tool: kind.tool(),
                exe: config.project_root().join(&tool.exe),
                args,
                needs_confirmation: false,
            })
        }
        StepKind::Sprites => {
            let tool = config.pixi.as_ref()?;
            if tool.exe.is_empty() || tool.list_file.is_empty() {
                return None;
            }
            let mut args = template_args(&tool.args);
            if verbose {
                args.push("-d".into());
            }
            args.push("-l".into());
            args.push(tool.list_file.clone());
            args.push(rom);
            Some(StepCommand {
                tool: kind.tool(),
                exe: config.project_root().join(&tool.exe),
                args,
                needs_confirmation: false,
            })
        }
        StepKind::Blocks => {
            let tool = config.gps.as_ref()?;
            if tool.exe.is_empty() || tool.list_file.is_empty() {
                return None;
            }
            let mut args = template_args(&tool.args);
            args.push("-l".into());
            args.push(tool.list_file.clone());
            args.push(rom);
            Some(StepCommand {
                tool: kind.tool(),
                exe: config.project_root().join(&tool.exe),
                args,
                needs_confirmation: false,
            })
        }
        StepKind::UberAsm => {
            let tool = config.uberasm.as_ref()?;
            if tool.exe.is_empty() || tool.list_file.is_empty() {
                return None;
            }
            let mut args = template_args(&tool.args);
            args.push(tool.list_file.clone());
            args.push(rom);
            Some(StepCommand {
                tool: kind.tool(),
                exe: config.project_root().join(&tool.exe),
                args,
                needs_confirmation: true,
            })
        }
        StepKind::Emulator => {
            let tool = config.emulator.as_ref()?;
            if tool.exe.is_empty() {
                return None;
            }
            // Output ROM first, then the template; the emulator exe is used
            // as given rather than resolved against the project root.
            let mut args = vec![config.abs_output_rom().display().to_string()];
            args.extend(template_args(&tool.args));
            Some(StepCommand {
                tool: kind.tool(),
                exe: PathBuf::from(&tool.exe),
                args,
                needs_confirmation: false,
            })
        }
        StepKind::Patches => None,
    }
}

/// Assemble one patch-tool command per configured patch file, preserving the
/// configured order exactly. Empty when the patch tool is not configured.
pub fn asar_patch_commands(config: &Config, verbose: bool) -> Vec<StepCommand> {
    let Some(asar) = config.asar.as_ref() else {
        return Vec::new();
    };
    if asar.exe.is_empty() {
        return Vec::new();
    }

    let exe = config.project_root().join(&asar.exe);
    let patch_root = config.patch_root(asar);
    let out_rom = config.abs_output_rom().display().to_string();

    asar.asm_files
        .iter()
        .filter(|f| !f.trim().is_empty())
        .map(|f| {
            let mut args = template_args(&asar.args);
            if verbose {
                args.push("--verbose".into());
            }
            args.push(patch_root.join(f).display().to_string());
            args.push(out_rom.clone());
            StepCommand {
                tool: StepKind::Patches.tool(),
                exe: exe.clone(),
                args,
                needs_confirmation: false,
            }
        })
        .collect()
}

fn template_args(template: &str) -> Vec<String> {
    template.split_whitespace().map(str::to_string).collect()
}
