// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level build configuration as read from `config.json`.
///
/// This is a direct mapping of the expected file:
///
/// ```json
/// {
///     "projectPath": "C:/hacks/my-hack",
///     "inputRom": "work.smc",
///     "outputRom": "out/play.smc",
///     "addmusick": { "exe": "tools/amk/AddmusicK.exe", "args": "", "listFile": "Addmusic_list.txt" },
///     "asar": { "exe": "tools/asar/asar.exe", "args": "", "patchFolder": "patches", "asmFiles": ["a.asm", "b.asm"] }
/// }
/// ```
///
/// Every tool block is optional, and a block missing its executable or list
/// file simply disables that step. The config is immutable for the run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Directory all relative paths resolve against. Defaults to the current
    /// working directory when empty (filled in by the loader).
    pub project_path: String,

    /// Working ROM the insertion tools mutate in place, relative to the
    /// project root.
    pub input_rom: String,

    /// Patched ROM the emulator runs, relative to the project root.
    pub output_rom: String,

    pub addmusick: Option<ToolConfig>,
    pub gps: Option<ToolConfig>,
    pub pixi: Option<ToolConfig>,
    pub uberasm: Option<ToolConfig>,
    pub asar: Option<AsarConfig>,
    pub emulator: Option<EmulatorConfig>,
}

/// One insertion tool: executable, argument template, and the resource list
/// whose changes should re-run the tool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolConfig {
    /// Executable path, relative to the project root.
    pub exe: String,

    /// Extra arguments prepended to the generated ones, split on whitespace.
    pub args: String,

    /// The tool's list file (its trigger file for watch mode).
    pub list_file: String,
}

/// The patch tool. Unlike the insertion tools it takes an ordered list of
/// patch files instead of a single list file; order is the contract.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AsarConfig {
    pub exe: String,
    pub args: String,

    /// Folder the `asm_files` entries resolve against, relative to the
    /// project root. Empty means the project root itself.
    pub patch_folder: String,

    /// Ordered, cumulative patch list. Applied one invocation per entry,
    /// in exactly this order, against the output ROM.
    pub asm_files: Vec<String>,
}

/// Emulator to launch on the output ROM after a build.
///
/// The executable is used as given (usually absolute or on PATH), not
/// resolved against the project root.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmulatorConfig {
    pub exe: String,
    pub args: String,
}

impl Config {
    pub fn project_root(&self) -> &Path {
        Path::new(&self.project_path)
    }

    /// Absolute path of the working ROM (the watched artifact).
    pub fn abs_input_rom(&self) -> PathBuf {
        self.project_root().join(&self.input_rom)
    }

    /// Absolute path of the patched output ROM.
    pub fn abs_output_rom(&self) -> PathBuf {
        self.project_root().join(&self.output_rom)
    }

    /// Folder the patch list entries resolve against.
    pub fn patch_root(&self, asar: &AsarConfig) -> PathBuf {
        if asar.patch_folder.is_empty() {
            self.project_root().to_path_buf()
        } else {
            self.project_root().join(&asar.patch_folder)
        }
    }
}
