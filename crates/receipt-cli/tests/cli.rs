use std::fs;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const FIXTURE: &str = "Burger 12.99\nFries 4.50\nSoda 2.99\nSubtotal 20.48\nTax 1.64\nTotal 22.12\n";

fn approx(value: &serde_json::Value, expected: f64) -> bool {
    (value.as_f64().unwrap() - expected).abs() < 1e-9
}

fn receipt() -> Command {
    cargo_bin_cmd!("receipt")
}

#[test]
fn parse_file_prints_json_draft() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("receipt.txt");
    fs::write(&input, FIXTURE).unwrap();

    let output = receipt().arg("parse").arg(&input).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
    assert_eq!(json["items"][0]["name"], "Burger");
    assert_eq!(json["tax"]["kind"], "percentage");
    assert!(approx(&json["tax"]["value"], 8.01));
    assert!(approx(&json["subtotal"], 20.48));
    assert!(approx(&json["total"], 22.12));
}

#[test]
fn parse_reads_stdin() {
    receipt()
        .args(["parse", "-", "--format", "text"])
        .write_stdin("2x Pizza 30.00\nTotal 30.00\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Items (1):"))
        .stdout(predicate::str::contains("Pizza"))
        .stdout(predicate::str::contains("Total:    30.00"));
}

#[test]
fn parse_unreadable_text_is_empty_draft() {
    receipt()
        .arg("parse")
        .write_stdin("Some random text\nwithout any prices\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"items\": []"));
}

#[test]
fn parse_validate_reports_mismatch() {
    receipt()
        .args(["parse", "--validate"])
        .write_stdin("Burger 13.99\nFries 4.50\nSoda 2.99\nSubtotal 20.48\nTotal 22.12\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Validation issues"))
        .stderr(predicate::str::contains("differs from subtotal"));
}

#[test]
fn parse_missing_file_fails() {
    receipt()
        .args(["parse", "/nonexistent/receipt.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn parse_writes_csv_output_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");

    receipt()
        .args(["parse", "-", "--format", "csv", "--output"])
        .arg(&output)
        .write_stdin(FIXTURE)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("kind,name,quantity,unit_price,amount,confidence\n"));
    assert!(csv.contains("item,Soda,1,2.99,2.99,0.70"));
}

#[test]
fn parse_uses_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"parser": {"reclassify_tax": false}}"#).unwrap();

    let output = receipt()
        .arg("--config")
        .arg(&config)
        .arg("parse")
        .write_stdin(FIXTURE)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["tax"]["kind"], "absolute");
    assert!(approx(&json["tax"]["value"], 1.64));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir_all(&input_dir).unwrap();
    fs::write(input_dir.join("a.txt"), FIXTURE).unwrap();
    fs::write(input_dir.join("b.txt"), "3 Beers 15.00\nTotal 15.00\n").unwrap();
    fs::write(input_dir.join("ignored.md"), FIXTURE).unwrap();

    let pattern = format!("{}/*", input_dir.display());
    receipt()
        .args(["batch", &pattern, "--summary", "-j", "2", "--output-dir"])
        .arg(&output_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    let a: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output_dir.join("a.json")).unwrap()).unwrap();
    assert_eq!(a["items"].as_array().unwrap().len(), 3);

    let b: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output_dir.join("b.json")).unwrap()).unwrap();
    assert_eq!(b["items"][0]["quantity"], 3);
    assert!(approx(&b["items"][0]["unitPrice"], 5.0));

    let summary = fs::read_to_string(output_dir.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
    assert!(summary.contains("a.txt,success,3,20.48,1.64,22.12,"));
}

#[test]
fn batch_stops_on_error_unless_asked_to_continue() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("binary.txt"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();
    fs::write(dir.path().join("ok.txt"), FIXTURE).unwrap();
    let pattern = format!("{}/*.txt", dir.path().display());

    receipt()
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));

    receipt()
        .args(["batch", &pattern, "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));
}

#[test]
fn batch_blank_file_is_empty_draft() {
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("out");
    fs::write(dir.path().join("blank.txt"), "   \n").unwrap();
    fs::write(dir.path().join("ok.txt"), FIXTURE).unwrap();
    let pattern = format!("{}/*.txt", dir.path().display());

    receipt()
        .args(["batch", &pattern, "--summary", "--output-dir"])
        .arg(&output_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 0 failed"));

    let blank: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output_dir.join("blank.json")).unwrap()).unwrap();
    assert_eq!(blank["items"].as_array().unwrap().len(), 0);

    let summary = fs::read_to_string(output_dir.join("summary.csv")).unwrap();
    assert!(summary.contains("blank.txt,success,0,,,,No items recognized,"));
}

#[test]
fn batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = format!("{}/*.txt", dir.path().display());

    receipt()
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_get_set_roundtrip() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("receipt").join("config.json");

    receipt()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(config.exists());

    receipt()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    receipt()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "parser.tax_rate_max", "25"])
        .assert()
        .success();

    receipt()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "parser.tax_rate_max"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25"));

    receipt()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "parser.no_such_key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn config_path_reports_status() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    receipt()
        .arg("--config")
        .arg(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));
}
