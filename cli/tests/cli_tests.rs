use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Write a minimal raw benchmark report with the given headline median.
fn write_report(dir: &Path, name: &str, generate_atlas_ms: f64) -> PathBuf {
    let body = format!(
        r#"{{
        "benchmarks": [
            {{
                "name": "atlasGenerationThroughZoomInteractions",
                "metrics": {{
                    "AtlasManager.generateAtlasSumMs": {{"median": {generate_atlas_ms}, "minimum": {generate_atlas_ms}, "maximum": {generate_atlas_ms}}},
                    "memoryGpuMaxKb": {{"median": 98304.0}}
                }},
                "sampledMetrics": {{
                    "frameDurationCpuMs": {{"P50": 7.1, "P90": 12.6, "P99": 21.9}}
                }},
                "totalRunTimeNs": 52000000000,
                "repeatIterations": 5
            }}
        ],
        "context": {{
            "build": {{"model": "Pixel 6", "brand": "google", "version": {{"sdk": 33}}}},
            "cpuCoreCount": 8,
            "cpuMaxFreqHz": 2802000000,
            "memTotalBytes": 7812030464,
            "cpuLocked": true,
            "compilationMode": "speed"
        }}
    }}"#
    );
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn perflinectl(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("perflinectl").unwrap();
    cmd.arg("--data-dir").arg(data_dir).arg("--no-color");
    cmd.env_remove("PERFLINE_DATA_DIR").env_remove("PERFLINE_PROFILE");
    cmd
}

fn collect(data_dir: &Path, report: &Path, label: &str, mode: &str) {
    perflinectl(data_dir)
        .args(["collect"])
        .arg(report)
        .arg(label)
        .args(["--mode", mode, "--provenance", "abc1234", "--force"])
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("perflinectl").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Perfline keeps an ordered timeline"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("perflinectl").unwrap();
    cmd.arg("--version");
    cmd.assert().success();
}

#[test]
fn test_list_empty_timeline() {
    let tmp = TempDir::new().unwrap();
    perflinectl(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No timeline entries"));
}

#[test]
fn test_collect_then_list() {
    let tmp = TempDir::new().unwrap();
    let report = write_report(tmp.path(), "run.json", 1600.0);

    collect(tmp.path(), &report, "baseline", "baseline");

    perflinectl(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("baseline"));

    // the timeline lands in <data_dir>/<profile>_timeline.json
    assert!(tmp.path().join("atlas_timeline.json").exists());
}

#[test]
fn test_collect_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    perflinectl(tmp.path())
        .args(["collect", "does_not_exist.json", "whatever"])
        .args(["--provenance", "abc1234", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_compare_needs_two_runs() {
    let tmp = TempDir::new().unwrap();
    let report = write_report(tmp.path(), "run.json", 1600.0);
    collect(tmp.path(), &report, "baseline", "baseline");

    perflinectl(tmp.path())
        .arg("compare")
        .assert()
        .success()
        .stdout(predicate::str::contains("Need at least 2 runs"));
}

#[test]
fn test_compare_reports_improvement() {
    let tmp = TempDir::new().unwrap();
    let baseline = write_report(tmp.path(), "baseline.json", 1600.0);
    let optimized = write_report(tmp.path(), "optimized.json", 1200.0);

    collect(tmp.path(), &baseline, "baseline", "baseline");
    collect(tmp.path(), &optimized, "bitmap_pooling", "optimization");

    perflinectl(tmp.path())
        .arg("compare")
        .assert()
        .success()
        .stdout(predicate::str::contains("AtlasManager.generateAtlasSumMs"));
}

#[test]
fn test_compare_json_output() {
    let tmp = TempDir::new().unwrap();
    let baseline = write_report(tmp.path(), "baseline.json", 1600.0);
    let optimized = write_report(tmp.path(), "optimized.json", 1200.0);

    collect(tmp.path(), &baseline, "baseline", "baseline");
    collect(tmp.path(), &optimized, "bitmap_pooling", "optimization");

    let output = perflinectl(tmp.path())
        .args(["--format", "json", "compare"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["baseline_label"], "baseline");
    assert_eq!(parsed["candidate_label"], "bitmap_pooling");
}

#[test]
fn test_compare_unknown_label_fails() {
    let tmp = TempDir::new().unwrap();
    let baseline = write_report(tmp.path(), "baseline.json", 1600.0);
    let optimized = write_report(tmp.path(), "optimized.json", 1200.0);

    collect(tmp.path(), &baseline, "baseline", "baseline");
    collect(tmp.path(), &optimized, "bitmap_pooling", "optimization");

    perflinectl(tmp.path())
        .args(["compare", "--candidate", "no_such_label"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no_such_label"));
}

#[test]
fn test_remove_entry() {
    let tmp = TempDir::new().unwrap();
    let baseline = write_report(tmp.path(), "baseline.json", 1600.0);
    let optimized = write_report(tmp.path(), "optimized.json", 1200.0);

    collect(tmp.path(), &baseline, "baseline", "baseline");
    collect(tmp.path(), &optimized, "bitmap_pooling", "optimization");

    perflinectl(tmp.path())
        .args(["remove", "1", "--force", "--no-backup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed: bitmap_pooling"));

    perflinectl(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("bitmap_pooling").not());
}

#[test]
fn test_remove_out_of_range_fails() {
    let tmp = TempDir::new().unwrap();
    let report = write_report(tmp.path(), "run.json", 1600.0);
    collect(tmp.path(), &report, "baseline", "baseline");

    perflinectl(tmp.path())
        .args(["remove", "7", "--force", "--no-backup"])
        .assert()
        .failure();
}

#[test]
fn test_clean_removes_dirty_entries() {
    let tmp = TempDir::new().unwrap();
    let baseline = write_report(tmp.path(), "baseline.json", 1600.0);
    let dirty = write_report(tmp.path(), "dirty.json", 1400.0);

    collect(tmp.path(), &baseline, "baseline", "baseline");
    perflinectl(tmp.path())
        .args(["collect"])
        .arg(&dirty)
        .arg("experiment")
        .args(["--provenance", "abc1234-dirty", "--force"])
        .assert()
        .success();

    perflinectl(tmp.path())
        .args(["clean", "--force", "--no-backup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 experimental"));

    perflinectl(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("experiment").not());
}

#[test]
fn test_clean_all_wipes_timeline() {
    let tmp = TempDir::new().unwrap();
    let report = write_report(tmp.path(), "run.json", 1600.0);
    collect(tmp.path(), &report, "baseline", "baseline");

    perflinectl(tmp.path())
        .args(["clean", "--all", "--force", "--no-backup"])
        .assert()
        .success();

    perflinectl(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No timeline entries"));
}

#[test]
fn test_corrupt_timeline_is_reported() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("atlas_timeline.json"), "not json at all").unwrap();

    perflinectl(tmp.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Corrupt timeline data"));
}

#[test]
fn test_unknown_profile_fails() {
    let tmp = TempDir::new().unwrap();
    perflinectl(tmp.path())
        .args(["--profile", "nonexistent", "list"])
        .assert()
        .failure();
}

#[test]
fn test_completions() {
    let mut cmd = Command::cargo_bin("perflinectl").unwrap();
    cmd.args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("perflinectl"));
}
