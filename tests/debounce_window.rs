use std::error::Error;
use std::path::Path;
use std::time::{Duration, SystemTime};

use smwbuild::watch::debounce::{DEBOUNCE_WINDOW, DebounceGate};

type TestResult = Result<(), Box<dyn Error>>;

const ROM: &str = "/project/work.smc";
const LIST: &str = "/project/tools/gps/blocks_list.txt";

#[test]
fn first_change_is_always_accepted() -> TestResult {
    let mut gate = DebounceGate::new(ROM);
    assert!(gate.should_accept(Path::new(LIST), SystemTime::now()));
    Ok(())
}

#[test]
fn change_within_window_is_rejected_after_it_is_accepted() -> TestResult {
    let mut gate = DebounceGate::new(ROM);
    let t0 = SystemTime::now();

    assert!(gate.should_accept(Path::new(LIST), t0));
    assert!(!gate.should_accept(Path::new(LIST), t0 + Duration::from_millis(100)));

    // Exactly the window apart is still the same change.
    assert!(!gate.should_accept(Path::new(LIST), t0 + DEBOUNCE_WINDOW));

    // Strictly past the window is a new change.
    assert!(gate.should_accept(
        Path::new(LIST),
        t0 + DEBOUNCE_WINDOW + Duration::from_millis(1)
    ));
    Ok(())
}

#[test]
fn rejection_does_not_advance_the_record() -> TestResult {
    let mut gate = DebounceGate::new(ROM);
    let t0 = SystemTime::now();

    assert!(gate.should_accept(Path::new(LIST), t0));
    assert!(!gate.should_accept(Path::new(LIST), t0 + Duration::from_millis(400)));
    assert_eq!(gate.last_accepted(Path::new(LIST)), Some(t0));
    Ok(())
}

#[test]
fn accepted_trigger_change_stamps_the_rom_record() -> TestResult {
    let mut gate = DebounceGate::new(ROM);
    let t0 = SystemTime::now();

    assert!(gate.should_accept(Path::new(LIST), t0));
    // The ROM has not been touched yet, but its record already carries the
    // trigger's timestamp so the imminent rewrite stays inside the window.
    assert_eq!(gate.last_accepted(Path::new(ROM)), Some(t0));
    assert!(!gate.should_accept(Path::new(ROM), t0 + Duration::from_millis(200)));

    assert!(gate.should_accept(Path::new(ROM), t0 + Duration::from_millis(600)));
    Ok(())
}

#[test]
fn distinct_paths_pass_the_gate_independently() -> TestResult {
    let mut gate = DebounceGate::new(ROM);
    let t0 = SystemTime::now();
    let other = "/project/sprites/sprite_list.txt";

    assert!(gate.should_accept(Path::new(LIST), t0));
    // A different trigger inside the same window is its own change; bursts
    // across files are not coalesced.
    assert!(gate.should_accept(Path::new(other), t0 + Duration::from_millis(100)));
    Ok(())
}
