// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `smwbuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "smwbuild",
    version,
    about = "Insert resources into a SMW ROM and rebuild on file changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Insert music via Addmusick.
    #[arg(short = 'm', long)]
    pub music: bool,

    /// Insert sprites via Pixi.
    #[arg(short = 's', long)]
    pub sprites: bool,

    /// Insert blocks via GPS.
    #[arg(short = 'b', long)]
    pub blocks: bool,

    /// Insert level/overworld code via UberASM.
    #[arg(short = 'u', long)]
    pub uberasm: bool,

    /// Apply global patches via Asar.
    #[arg(short = 'p', long)]
    pub patches: bool,

    /// Pass each tool's verbose flag.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Watch list files and the ROM for changes and rebuild automatically.
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Launch the emulator on the output ROM after build steps.
    #[arg(short = 'r', long)]
    pub run: bool,

    /// Path to the build config (JSON).
    ///
    /// Default: `config.json` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "config.json")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SMWBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved commands for each step, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
