use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn slicer_replay(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_slicer-replay"))
        .args(args)
        .output()
        .expect("run slicer-replay")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn validate_reports_view_shape() {
    let output = slicer_replay(&["validate", "--shape", "3,4,5,6", "[0, :, 1:3, -1]"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "ok: view shape [4, 2]\n");
}

#[test]
fn validate_fails_on_invalid_expression() {
    let output = slicer_replay(&[
        "validate",
        "--shape",
        "[5, 6]",
        "[0, :, :]",
        "--format",
        "json",
    ]);
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["kind"], "arity");
    assert_eq!(report["message"], "expected 2 components, got 3");
}

#[test]
fn defaults_prints_preselection() {
    let output = slicer_replay(&["defaults", "--shape", "3,4,5,6", "--format", "json"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        report,
        serde_json::json!({
            "shape": [3, 4, 5, 6],
            "full": "[:, :, :, :]",
            "preselected": "[0, 0, :, :]",
            "slots": 2
        })
    );
}

#[test]
fn run_script_file_as_json() {
    let path = fixture("four_axes.json");
    let output = slicer_replay(&["run", path.to_str().unwrap(), "--format", "json"]);
    assert!(
        output.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["requests"].as_array().map(Vec::len), Some(4));
    assert_eq!(report["requests"][3]["slice"], serde_json::Value::Null);
    assert_eq!(report["finalState"]["enabled"], false);
}

#[test]
fn run_reads_stdin_and_settings_override() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    std::fs::write(&settings, r#"{ "displayedAxes": 1 }"#).unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_slicer-replay"))
        .args(["run", "--settings", settings.to_str().unwrap()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn slicer-replay");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(br#"{ "shape": [2, 3, 4], "events": [{ "type": "toggle", "enable": true }] }"#)
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("initial text `[0, 0, :]`"), "{text}");
    assert!(text.contains("slots [0=0 1=0]"), "{text}");
}

#[test]
fn run_fails_on_rejected_event() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.json");
    std::fs::write(
        &script,
        r#"{
            "shape": [5, 6],
            "events": [
                { "type": "toggle", "enable": true },
                { "type": "selectIndex", "slot": 0, "index": 1 }
            ]
        }"#,
    )
    .unwrap();

    let output = slicer_replay(&["run", script.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("error: slot 0 has no axis selected"));
}

#[test]
fn verbose_logs_session_decisions_to_stderr() {
    let path = fixture("four_axes.json");
    let path = path.to_str().unwrap();

    let output = slicer_replay(&["--verbose", "run", path]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DEBUG"), "{stderr}");
    assert!(stderr.contains("requesting slice `[0, 0, :, :]`"), "{stderr}");
    assert!(stderr.contains("requesting no slicing"), "{stderr}");

    let quiet = slicer_replay(&["run", path]);
    assert!(quiet.status.success());
    assert_eq!(String::from_utf8_lossy(&quiet.stderr), "");
}

#[test]
fn run_reports_missing_script() {
    let output = slicer_replay(&["run", "does-not-exist.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("read script"));
}

#[test]
fn json_output_does_not_panic_on_broken_pipe() {
    let path = fixture("four_axes.json");
    let mut child = Command::new(env!("CARGO_BIN_EXE_slicer-replay"))
        .arg("run")
        .arg(&path)
        .arg("--format")
        .arg("json")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn slicer-replay");

    drop(child.stdout.take());

    let output = child.wait_with_output().expect("wait for slicer-replay");
    assert!(
        output.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
}
