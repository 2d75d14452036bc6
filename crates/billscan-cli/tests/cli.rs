use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn billscan(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("billscan").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn process_text_file_as_json() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bill.txt", "Shop XYZ\n12/08/2024\nno numeric totals here");

    let output = billscan(dir.path())
        .arg("process")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["header"], "Shop XYZ");
    assert_eq!(json["date"], "12/08/2024");
    assert_eq!(json["total"], "0");
    assert_eq!(json["kind"], "text");
}

#[test]
fn process_applies_corrections() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bill.txt", "Invoice\nSubtotal 100.00\nAMOUNT 450.75");

    billscan(dir.path())
        .args(["process", "--format", "csv", "--header", "Mall Pharmacy", "--total", "451.00"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Mall Pharmacy,Unknown,451.00"));
}

#[test]
fn process_text_format_reports_largest_total() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bill.txt", "Invoice\nSubtotal 100.00\nAMOUNT 450.75");

    billscan(dir.path())
        .args(["process", "-f", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:    450.75 AED"));
}

#[test]
fn process_validate_flags_bad_date() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bill.txt", "Shop XYZ");

    billscan(dir.path())
        .args(["process", "--validate", "--date", "yesterday"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Validation issues"));
}

#[test]
fn process_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bill.doc", "TOTAL 1.00");

    billscan(dir.path())
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type"));
}

#[test]
fn process_missing_input() {
    let dir = TempDir::new().unwrap();

    billscan(dir.path())
        .args(["process", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.txt", "Carrefour\nBALANCE 1,000.00\nTOTAL 1,250.00");
    write(&dir, "b.txt", "Lulu\n01-02-2025\nAED 12.50");
    write(&dir, "ignored.md", "TOTAL 99.00");
    let out = dir.path().join("out");

    billscan(dir.path())
        .arg("batch")
        .arg(dir.path().join("*").to_string_lossy().as_ref())
        .arg("--output-dir")
        .arg(&out)
        .arg("--summary")
        .assert()
        .success();

    let a: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("a.json")).unwrap()).unwrap();
    assert_eq!(a["total"], "1000.00");

    let b: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("b.json")).unwrap()).unwrap();
    assert_eq!(b["date"], "01-02-2025");
    assert_eq!(b["total"], "12.50");

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
    assert!(summary.starts_with("file,header,date,total,error,processing_time_ms\n"));
    assert!(!out.join("ignored.json").exists());
}

#[test]
fn config_init_set_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("billscan.json");
    let config = config.to_str().unwrap();

    billscan(dir.path())
        .args(["-c", config, "config", "init"])
        .assert()
        .success();

    billscan(dir.path())
        .args(["-c", config, "config", "set", "pdf.render_dpi", "300"])
        .assert()
        .success();

    billscan(dir.path())
        .args(["-c", config, "config", "set", "extraction.confusable_glyphs", "8"])
        .assert()
        .success();

    billscan(dir.path())
        .args(["-c", config, "config", "get", "pdf.render_dpi"])
        .assert()
        .success()
        .stdout("300\n");

    billscan(dir.path())
        .args(["-c", config, "config", "get", "extraction.confusable_glyphs"])
        .assert()
        .success()
        .stdout("\"8\"\n");
}

#[test]
fn config_set_rejects_unusable_extraction() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("billscan.json");
    let config = config.to_str().unwrap();

    billscan(dir.path())
        .args(["-c", config, "config", "set", "extraction.max_header_chars", "0"])
        .assert()
        .failure();

    assert!(!Path::new(config).exists());
}

#[test]
fn process_uses_configured_keywords() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("billscan.json");
    fs::write(
        &config,
        r#"{"extraction": {"amount_keywords": ["NET"], "currency_tokens": [], "confusable_glyphs": ""}}"#,
    )
    .unwrap();
    let input = write(&dir, "bill.txt", "Cafe\nTOTAL 90.00\nNET 80.00");

    billscan(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["process", "-f", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cafe,Unknown,80.00"));
}
