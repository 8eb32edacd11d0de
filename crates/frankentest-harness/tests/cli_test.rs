//! Integration test: `frankentest run` writes a log and a ledger the other subcommands
//! accept, and the exit status follows the run outcome.

use std::path::PathBuf;
use std::process::{Command, Output};

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("frankentest-cli-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}

fn frankentest(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_frankentest"))
        .args(args)
        .output()
        .expect("failed to run frankentest binary")
}

fn describe(output: &Output) -> String {
    format!(
        "status={:?}\nstdout={}\nstderr={}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn smoke_run_succeeds_and_artifacts_verify() {
    let dir = scratch_dir("smoke");
    let log = dir.join("run.jsonl");
    let ledger = dir.join("ledger.json");
    let output = frankentest(&[
        "run",
        "--color",
        "never",
        "--log",
        log.to_str().unwrap(),
        "--ledger-out",
        ledger.to_str().unwrap(),
        "--timestamp",
        "1767225600",
        "--run-id",
        "cli-smoke",
    ]);
    assert!(output.status.success(), "{}", describe(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Perfect run!"), "{stdout}");
    assert!(!stdout.contains('\x1b'), "color was disabled");

    let validated = frankentest(&["validate-log", "--log", log.to_str().unwrap()]);
    assert!(validated.status.success(), "{}", describe(&validated));

    let report_path = dir.join("audit.json");
    let verified = frankentest(&[
        "verify-ledger",
        "--input",
        ledger.to_str().unwrap(),
        "--output",
        report_path.to_str().unwrap(),
    ]);
    assert!(verified.status.success(), "{}", describe(&verified));
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["ok"], true);
    assert_eq!(report["run_id"], "cli-smoke");
    assert_eq!(report["export_sha256"].as_str().map(str::len), Some(64));
}

#[test]
fn failing_run_exits_non_zero_with_json_summary() {
    let output = frankentest(&["run", "--demo", "math", "--json", "--seed", "0x2A"]);
    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|err| panic!("stdout should be JSON ({err}): {}", describe(&output)));
    assert_eq!(summary["score"]["passed"], 1);
    assert_eq!(summary["score"]["failed"], 1);
    assert_eq!(summary["score"]["empty"], 1);
    assert_eq!(summary["score_possible"], 3);
    assert_eq!(summary["shuffle_seed"], 42);
}

#[test]
fn tampered_ledger_fails_verification() {
    let dir = scratch_dir("tamper");
    let ledger = dir.join("ledger.json");
    let output = frankentest(&[
        "run",
        "--color",
        "never",
        "--ledger-out",
        ledger.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", describe(&output));

    let mut export: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&ledger).unwrap()).unwrap();
    export["engine"]["records"][1]["prev_hash"] = serde_json::Value::String("f".repeat(64));
    std::fs::write(&ledger, serde_json::to_string(&export).unwrap()).unwrap();

    let verified = frankentest(&["verify-ledger", "--input", ledger.to_str().unwrap()]);
    assert!(!verified.status.success(), "{}", describe(&verified));
    let stdout = String::from_utf8_lossy(&verified.stdout);
    assert!(stdout.contains("chain.broken_link"), "{stdout}");
}

#[test]
fn invalid_repeat_is_rejected() {
    let output = frankentest(&["run", "--repeat", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("run.repeat"), "{stderr}");
}
