//! Integration tests: `threshold-report` CLI
//!
//! Validates:
//! 1. `render --output` writes markdown, report JSON, Vega-Lite and an artifact index
//!    whose digests match the files on disk.
//! 2. The `--log` run log passes schema validation and records every stage.
//! 3. A report that cannot be built writes no artifacts, logs a fail event and exits non-zero.
//! 4. A write failure while staging artifacts leaves no partial output behind.
//! 5. `compose` and `speedup` print the core pipeline's rows as JSON; a metric no
//!    scenario reports prints an empty list.
//! 6. `validate` rejects malformed datasets and logs one validate event per scenario.
//!
//! Run: cargo test -p threshold-report-harness --test report_cli_test

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::Digest;
use threshold_report_harness::ThresholdReport;
use threshold_report_harness::structured_log::validate_log_file;

const TIMESTAMP: &str = "2026-01-01T00:00:00Z";

fn workspace_root() -> PathBuf {
    let manifest = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest)
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn unique_tmp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after UNIX_EPOCH")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_threshold-report"))
        .args(args)
        .output()
        .expect("threshold-report should execute")
}

fn sha256_hex(path: &Path) -> String {
    let bytes = std::fs::read(path).expect("read artifact for sha");
    let digest = sha2::Sha256::digest(&bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn render_writes_all_artifacts_with_matching_digests() {
    let dir = unique_tmp_dir("threshold-report-render");
    let md_path = dir.join("report.md");
    let log_path = dir.join("run.log.jsonl");
    let dataset = workspace_root().join("data/allocator_thresholds.v1.json");

    let output = run(&[
        "render",
        "--dataset",
        dataset.to_str().unwrap(),
        "--output",
        md_path.to_str().unwrap(),
        "--log",
        log_path.to_str().unwrap(),
        "--timestamp",
        TIMESTAMP,
    ]);
    assert!(
        output.status.success(),
        "render failed\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let markdown = std::fs::read_to_string(&md_path).expect("markdown written");
    assert!(markdown.contains("## Memory Usage for Small Range"));
    assert!(markdown.contains(&format!("- Generated: {TIMESTAMP}")));

    let json = std::fs::read_to_string(dir.join("report.json")).expect("report json written");
    let report = ThresholdReport::from_json(&json).expect("report json parses");
    assert_eq!(report.row_count(), 35);
    assert_eq!(report.generated_at, TIMESTAMP);

    let vega: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.join("report.vl.json")).expect("vega-lite written"),
    )
    .expect("vega-lite parses");
    assert_eq!(vega["charts"].as_object().unwrap().len(), 4);

    let index: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.join("report.artifacts.json")).expect("index written"),
    )
    .expect("index parses");
    let artifacts = index["artifacts"].as_array().unwrap();
    assert_eq!(artifacts.len(), 3);
    for artifact in artifacts {
        let path = PathBuf::from(artifact["path"].as_str().unwrap());
        assert_eq!(
            artifact["sha256"].as_str().unwrap(),
            sha256_hex(&path),
            "digest mismatch for {}",
            path.display()
        );
    }

    let (lines, errors) = validate_log_file(&log_path).expect("log readable");
    assert!(errors.is_empty(), "log schema errors: {errors:?}");
    // load, 4 charts, render, write
    assert_eq!(lines, 7);
    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("\"event\":\"artifacts_written\""));
    assert!(log.contains("render::run-"));
}

#[test]
fn render_to_stdout_honours_format() {
    let output = run(&["render", "--format", "json", "--timestamp", TIMESTAMP]);
    assert!(output.status.success());
    let report = ThresholdReport::from_json(&String::from_utf8_lossy(&output.stdout))
        .expect("stdout is report JSON");
    assert_eq!(report.speedup.rows.len(), 3);

    let output = run(&["render", "--format", "plain", "--scenario", "large_range"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l.starts_with("Large Range") && l.ends_with("10.76")));
    assert!(!stdout.contains("Equal Size"));
}

#[test]
fn failed_render_writes_nothing_and_logs_failure() {
    let dir = unique_tmp_dir("threshold-report-fail");
    let md_path = dir.join("report.md");
    let log_path = dir.join("run.log.jsonl");

    let output = run(&[
        "render",
        "--memory-scenario",
        "equal_size",
        "--output",
        md_path.to_str().unwrap(),
        "--log",
        log_path.to_str().unwrap(),
    ]);
    assert!(!output.status.success(), "missing byte sequences must fail");
    assert!(String::from_utf8_lossy(&output.stderr).contains("data_segment_bytes"));
    assert!(!md_path.exists());
    assert!(!dir.join("report.json").exists());

    let (_, errors) = validate_log_file(&log_path).expect("log readable");
    assert!(errors.is_empty(), "log schema errors: {errors:?}");
    let log = std::fs::read_to_string(&log_path).unwrap();
    let last: serde_json::Value =
        serde_json::from_str(log.lines().last().expect("log has lines")).unwrap();
    assert_eq!(last["event"], "report_failed");
    assert_eq!(last["outcome"], "fail");
    assert!(last["details"]["error"].as_str().unwrap().contains("equal_size"));
}

#[test]
fn compose_prints_long_form_rows() {
    let output = run(&["compose", "--metric", "frag", "--scenario", "equal_size"]);
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r["metric"] == "fragmentation_ratio"));
    assert!(rows.iter().all(|r| r["value"].as_f64() == Some(0.45)));
    assert_eq!(rows[3]["threshold"], 2048);

    let output = run(&[
        "compose",
        "--metric",
        "data_segment_bytes",
        "--unit-divisor",
        "1000000",
    ]);
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 4);
    assert_eq!(rows[0]["value"].as_f64(), Some(3.642432));
}

#[test]
fn failed_staging_write_leaves_no_partial_report() {
    let dir = unique_tmp_dir("threshold-report-staging");
    let md_path = dir.join("report.md");
    // A directory squatting on the Vega-Lite staging name makes that write fail.
    std::fs::create_dir_all(dir.join("report.vl.json.tmp")).unwrap();

    let output = run(&["render", "--output", md_path.to_str().unwrap()]);
    assert!(!output.status.success());
    for name in [
        "report.md",
        "report.md.tmp",
        "report.json",
        "report.json.tmp",
        "report.vl.json",
        "report.artifacts.json",
    ] {
        assert!(!dir.join(name).exists(), "{name} should not exist");
    }
}

#[test]
fn repeated_scenario_flag_renders_one_column() {
    let output = run(&[
        "render",
        "--scenario",
        "small_alloc",
        "--scenario",
        "small_alloc",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("| Threshold Size | Small Range |\n"));
    assert!(!stdout.contains("| Small Range | Small Range |"));
}

#[test]
fn compose_unreported_metric_is_empty_but_unknown_scenario_fails() {
    let output = run(&["compose", "--metric", "latency"]);
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows, serde_json::json!([]));

    let output = run(&["compose", "--metric", "free_space", "--scenario", "equal_size"]);
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows, serde_json::json!([]));

    let output = run(&["compose", "--metric", "time", "--scenario", "huge"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("huge"));
}

#[test]
fn speedup_prints_summary_rows() {
    let output = run(&["speedup"]);
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["scenario"], "small_alloc");
    assert_eq!(rows[0]["value"].as_f64(), Some(0.411901 / 0.103144));
}

#[test]
fn validate_rejects_mismatched_sequences() {
    let dir = unique_tmp_dir("threshold-report-validate");
    let path = dir.join("bad.json");
    std::fs::write(
        &path,
        r#"{"schema_version":1,"title":"t","thresholds":[32,256],
            "scenarios":[{"name":"s","execution_time":[1.0,0.5,0.25]}]}"#,
    )
    .unwrap();

    let output = run(&["validate", "--dataset", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Validation"));

    let output = run(&["validate"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("3 scenarios"));
}

#[test]
fn validate_logs_each_scenario() {
    let dir = unique_tmp_dir("threshold-report-validate-log");
    let log_path = dir.join("validate.log.jsonl");

    let output = run(&["validate", "--log", log_path.to_str().unwrap()]);
    assert!(output.status.success());

    let (lines, errors) = validate_log_file(&log_path).expect("log readable");
    assert!(errors.is_empty(), "log schema errors: {errors:?}");
    assert_eq!(lines, 4);
    let entries: Vec<serde_json::Value> = std::fs::read_to_string(&log_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let validated: Vec<&str> = entries
        .iter()
        .filter(|e| e["stage"] == "validate")
        .map(|e| e["scenario"].as_str().unwrap())
        .collect();
    assert_eq!(validated, vec!["small_alloc", "equal_size", "large_range"]);
    assert!(entries[0]["trace_id"].as_str().unwrap().starts_with("validate::run-"));
    assert_eq!(
        entries[1]["details"]["metrics"],
        serde_json::json!([
            "execution_time",
            "fragmentation_ratio",
            "data_segment_bytes",
            "free_space_bytes"
        ])
    );
}

#[test]
fn failed_validation_is_logged() {
    let dir = unique_tmp_dir("threshold-report-validate-fail");
    let path = dir.join("bad.json");
    let log_path = dir.join("validate.log.jsonl");
    std::fs::write(
        &path,
        r#"{"schema_version":1,"title":"t","thresholds":[64,32],"scenarios":[]}"#,
    )
    .unwrap();

    let output = run(&[
        "validate",
        "--dataset",
        path.to_str().unwrap(),
        "--log",
        log_path.to_str().unwrap(),
    ]);
    assert!(!output.status.success());

    let (lines, errors) = validate_log_file(&log_path).expect("log readable");
    assert!(errors.is_empty(), "log schema errors: {errors:?}");
    assert_eq!(lines, 1);
    let entry: serde_json::Value =
        serde_json::from_str(std::fs::read_to_string(&log_path).unwrap().trim()).unwrap();
    assert_eq!(entry["event"], "validation_failed");
    assert_eq!(entry["stage"], "validate");
    assert!(entry["details"]["error"].as_str().unwrap().contains("ascending"));
}
