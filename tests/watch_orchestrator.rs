use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, SystemTime};

use smwbuild::config::{AsarConfig, Config, ToolConfig};
use smwbuild::engine::Orchestrator;
use smwbuild::pipeline::Pipeline;
use smwbuild::pipeline::step::{StepKind, StepSelection};
use smwbuild::watch::debounce::DebounceGate;
use smwbuild::watch::targets::{WatchRole, WatchTarget};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn write_tool(dir: &Path, name: &str, body: &str) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    let mut perms = fs::metadata(&path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms)?;
    Ok(path)
}

fn logging_tool(dir: &Path, name: &str, log: &Path) -> Result<PathBuf, Box<dyn Error>> {
    write_tool(
        dir,
        name,
        &format!(r#"echo "{name} $@" >> "{log}""#, log = log.display()),
    )
}

fn read_log(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn base_config(root: &Path) -> Config {
    Config {
        project_path: root.display().to_string(),
        input_rom: "work.smc".into(),
        output_rom: "out.smc".into(),
        ..Config::default()
    }
}

fn orchestrator(
    config: &Config,
    selection: StepSelection,
) -> (Orchestrator, Arc<AtomicBool>) {
    let rom_armed = Arc::new(AtomicBool::new(true));
    let gate = DebounceGate::new(config.abs_input_rom());
    let pipeline = Pipeline::new(config.clone(), selection, true);
    (
        Orchestrator::new(pipeline, gate, Arc::clone(&rom_armed)),
        rom_armed,
    )
}

#[tokio::test]
async fn second_change_within_the_window_runs_nothing() -> TestResult {
    let dir = TempDir::new()?;
    let root = dir.path();
    let log = root.join("invocations.log");

    logging_tool(&root.join("tools/gps"), "gps", &log)?;

    let mut config = base_config(root);
    config.gps = Some(ToolConfig {
        exe: "tools/gps/gps".into(),
        args: String::new(),
        list_file: "blocks.txt".into(),
    });

    let (mut orch, _) = orchestrator(&config, StepSelection::from_kinds([StepKind::Blocks]));

    let target = WatchTarget {
        path: root.join("tools/gps/blocks.txt"),
        role: WatchRole::Trigger(StepKind::Blocks),
    };

    let t0 = SystemTime::now();
    assert!(orch.handle_change(&target, t0).await);
    assert!(!orch.handle_change(&target, t0 + Duration::from_millis(300)).await);

    assert_eq!(read_log(&log).len(), 1);
    // Patching was not selected, so no output ROM appeared either.
    assert!(!root.join("out.smc").exists());
    Ok(())
}

#[tokio::test]
async fn rom_change_runs_patching_only() -> TestResult {
    let dir = TempDir::new()?;
    let root = dir.path();
    let log = root.join("invocations.log");

    fs::write(root.join("work.smc"), "ROM")?;
    logging_tool(&root.join("tools/gps"), "gps", &log)?;
    logging_tool(&root.join("tools/asar"), "asar", &log)?;
    fs::create_dir_all(root.join("patches"))?;
    fs::write(root.join("patches/fix.asm"), "")?;

    let mut config = base_config(root);
    config.gps = Some(ToolConfig {
        exe: "tools/gps/gps".into(),
        args: String::new(),
        list_file: "blocks.txt".into(),
    });
    config.asar = Some(AsarConfig {
        exe: "tools/asar/asar".into(),
        args: String::new(),
        patch_folder: "patches".into(),
        asm_files: vec!["fix.asm".into()],
    });

    let (mut orch, _) = orchestrator(
        &config,
        StepSelection::from_kinds([StepKind::Blocks, StepKind::Patches]),
    );

    let rom_target = WatchTarget {
        path: config.abs_input_rom(),
        role: WatchRole::Artifact,
    };

    assert!(orch.handle_change(&rom_target, SystemTime::now()).await);

    // The insertion tool stays quiet; only the patch tool ran, on a fresh
    // copy of the ROM.
    let lines = read_log(&log);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("asar "));
    assert_eq!(fs::read_to_string(root.join("out.smc"))?, "ROM");
    Ok(())
}

#[tokio::test]
async fn trigger_change_preempts_the_rom_watchers_next_event() -> TestResult {
    let dir = TempDir::new()?;
    let root = dir.path();
    let log = root.join("invocations.log");

    fs::write(root.join("work.smc"), "ROM")?;
    logging_tool(&root.join("tools/gps"), "gps", &log)?;

    let mut config = base_config(root);
    config.gps = Some(ToolConfig {
        exe: "tools/gps/gps".into(),
        args: String::new(),
        list_file: "blocks.txt".into(),
    });

    let (mut orch, _) = orchestrator(
        &config,
        StepSelection::from_kinds([StepKind::Blocks, StepKind::Patches]),
    );

    let trigger = WatchTarget {
        path: root.join("tools/gps/blocks.txt"),
        role: WatchRole::Trigger(StepKind::Blocks),
    };
    let rom_target = WatchTarget {
        path: config.abs_input_rom(),
        role: WatchRole::Artifact,
    };

    let t0 = SystemTime::now();
    assert!(orch.handle_change(&trigger, t0).await);

    // The pipeline's own rewrite of the ROM lands inside the window thanks
    // to the anticipatory stamp, so it does not re-trigger...
    assert!(
        !orch
            .handle_change(&rom_target, t0 + Duration::from_millis(200))
            .await
    );
    // ...while a later, genuine ROM write does.
    assert!(
        orch.handle_change(&rom_target, t0 + Duration::from_millis(700))
            .await
    );
    Ok(())
}

#[tokio::test]
async fn failed_run_rearms_the_rom_watcher_and_keeps_watching() -> TestResult {
    let dir = TempDir::new()?;
    let root = dir.path();

    let mut config = base_config(root);
    config.gps = Some(ToolConfig {
        exe: "tools/gps/does-not-exist".into(),
        args: String::new(),
        list_file: "blocks.txt".into(),
    });

    let (mut orch, rom_armed) =
        orchestrator(&config, StepSelection::from_kinds([StepKind::Blocks]));

    let target = WatchTarget {
        path: root.join("tools/gps/blocks.txt"),
        role: WatchRole::Trigger(StepKind::Blocks),
    };

    let t0 = SystemTime::now();
    assert!(orch.handle_change(&target, t0).await);
    assert!(rom_armed.load(std::sync::atomic::Ordering::SeqCst));
    assert!(orch.rom_watch_armed());

    // The failure was contained at the run boundary; the next (debounced)
    // change still triggers a run attempt.
    assert!(orch.handle_change(&target, t0 + Duration::from_secs(1)).await);
    Ok(())
}
