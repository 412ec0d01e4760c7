// src/config/mod.rs

//! Configuration loading for smwbuild.
//!
//! Responsibilities:
//! - Define the JSON-backed data model (`model.rs`).
//! - Load a config file from disk and resolve the project root (`loader.rs`).
//!
//! There is deliberately no semantic validation pass: a partially-populated
//! config is legal, and the pipeline skips the affected steps instead of
//! rejecting the file up front.

pub mod loader;
pub mod model;

pub use loader::load_from_path;
pub use model::{AsarConfig, Config, EmulatorConfig, ToolConfig};
