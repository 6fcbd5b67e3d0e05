use std::io::Write;
use std::process::{Command, Stdio};

#[test]
fn ai_match_runs_to_completion() {
    let output = Command::new(env!("CARGO_BIN_EXE_skirmish"))
        .args([
            "--map",
            "small",
            "--a",
            "ai",
            "--b",
            "ai",
            "--random-rosters",
            "--seed",
            "11",
            "--max-rounds",
            "40",
        ])
        .stdin(Stdio::null())
        .output()
        .expect("failed to run skirmish binary");

    assert!(output.status.success(), "skirmish exited with {:?}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Welcome to Skirmish."));
    assert!(stdout.contains("units standing"));
}

#[test]
fn closed_input_abandons_a_human_match() {
    let output = Command::new(env!("CARGO_BIN_EXE_skirmish"))
        .args(["--map", "small", "--a", "human", "--b", "ai"])
        .stdin(Stdio::null())
        .output()
        .expect("failed to run skirmish binary");

    assert!(output.status.success(), "skirmish exited with {:?}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("the match was abandoned"));
}

#[test]
fn unknown_unit_names_are_reported() {
    let output = Command::new(env!("CARGO_BIN_EXE_skirmish"))
        .args(["--team-a", "archer,dragon"])
        .stdin(Stdio::null())
        .output()
        .expect("failed to run skirmish binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dragon"));
}

#[test]
fn repeated_unit_kinds_are_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_skirmish"))
        .args(["--team-b", "bomber,bomber,archer"])
        .stdin(Stdio::null())
        .output()
        .expect("failed to run skirmish binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--team-b"));
    assert!(stderr.contains("more than once"));
}

#[test]
fn unknown_keys_print_help_and_quit_aborts() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_skirmish"))
        .args(["--map", "small", "--a", "human", "--b", "ai"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to run skirmish binary");
    child
        .stdin
        .take()
        .expect("piped stdin")
        .write_all(b"jump\nq\n")
        .expect("failed to write player input");

    let output = child.wait_with_output().expect("skirmish did not exit");

    assert!(output.status.success(), "skirmish exited with {:?}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("actions: enter or v to validate"));
    assert!(stdout.contains("the match was abandoned"));
    assert!(stdout.contains("team A: 3 units standing"));
}
