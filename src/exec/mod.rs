// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running one external tool at a
//! time, using `tokio::process::Command`, with the working directory pinned
//! to the tool's own folder. It knows nothing about step ordering or
//! watching; it takes an assembled [`crate::pipeline::step::StepCommand`]
//! and reports a [`StepResult`] or a typed error.

pub mod runner;

pub use runner::{StepResult, run_step, spawn_detached};
