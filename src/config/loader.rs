// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::model::Config;

/// Load the build configuration from a given path.
///
/// An unreadable or unparsable file is a startup error; a structurally valid
/// but partially-populated config is fine and simply disables the affected
/// steps. When `projectPath` is empty, it defaults to the current working
/// directory so a config checked into the project root "just works".
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading config file at {path:?}"))?;

    let mut config: Config = serde_json::from_str(&contents)
        .with_context(|| format!("parsing JSON config from {path:?}"))?;

    if config.project_path.is_empty() {
        let cwd = std::env::current_dir().context("resolving current working directory")?;
        config.project_path = cwd.to_string_lossy().into_owned();
    }

    Ok(config)
}
