use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NAMASTE: &str = "\
NAMASTE INDIEN
14/06/2025 20:41
10% : 6,95 € (69,55 € HT / 76,50 € TTC)
CB 76,50 €
";

fn scanzo() -> Command {
    Command::cargo_bin("scanzo").unwrap()
}

#[test]
fn help_lists_subcommands() {
    scanzo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn extract_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("namaste.txt");
    fs::write(&input, NAMASTE).unwrap();

    scanzo()
        .arg("extract")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""total_ttc": "76.50""#))
        .stdout(predicate::str::contains(r#""vendor": "NAMASTE INDIEN""#));
}

#[test]
fn extract_from_stdin_as_text() {
    scanzo()
        .args(["extract", "-", "--format", "text"])
        .write_stdin(NAMASTE)
        .assert()
        .success()
        .stdout(predicate::str::contains("TTC: 76.50 EUR"))
        .stdout(predicate::str::contains("Coherent: yes"));
}

#[test]
fn extract_csv_to_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("namaste.txt");
    let output = dir.path().join("namaste.csv");
    fs::write(&input, NAMASTE).unwrap();

    scanzo()
        .arg("extract")
        .arg(&input)
        .args(["-f", "csv", "-o"])
        .arg(&output)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("vendor,date,payment_method"));
    assert!(csv.contains("NAMASTE INDIEN,2025-06-14,card,69.55,6.95,76.50,10,true"));
}

#[test]
fn extract_without_amounts_fails() {
    scanzo()
        .args(["extract", "-"])
        .write_stdin("BONJOUR\nMERCI")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No financial data"));
}

#[test]
fn extract_missing_file_fails() {
    scanzo()
        .args(["extract", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn batch_with_summary() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    fs::write(dir.path().join("a.txt"), NAMASTE).unwrap();
    fs::write(dir.path().join("b.txt"), "RIEN A LIRE").unwrap();

    let pattern = dir.path().join("*.txt");
    scanzo()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--continue-on-error", "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful"));

    assert!(out.join("a.json").exists());
    assert!(!out.join("b.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,success,NAMASTE INDIEN"));
    assert!(summary.contains("b.txt,error"));
}

#[test]
fn batch_stops_on_first_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "RIEN A LIRE").unwrap();

    let pattern = dir.path().join("*.txt");
    scanzo()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn config_init_set_get() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    scanzo()
        .arg("-c")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    scanzo()
        .arg("-c")
        .arg(&path)
        .args(["config", "set", "extraction.derive_missing_totals", "false"])
        .assert()
        .success();

    scanzo()
        .arg("-c")
        .arg(&path)
        .args(["config", "get", "extraction.derive_missing_totals"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));

    scanzo()
        .arg("-c")
        .arg(&path)
        .args(["config", "set", "extraction.unknown", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn config_disables_derivation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"extraction": {"derive_missing_totals": false}}"#).unwrap();

    scanzo()
        .arg("-c")
        .arg(&path)
        .args(["extract", "-", "-f", "csv"])
        .write_stdin("TOTAL HT 30,00\nTOTAL TVA 3,00")
        .assert()
        .success()
        .stdout(predicate::str::contains(",30.00,3.00,,"));
}
