//! Command-line tests for the `ecfr-harvester` binary.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("part482")
        .join(name)
}

fn harvester() -> Command {
    Command::cargo_bin("ecfr-harvester").unwrap()
}

#[test]
fn test_parse_prints_section_document() {
    harvester()
        .arg("parse")
        .arg(fixture("subpart_b.xml"))
        .args(["--subpart", "B", "--section", "482.12", "--date", "2025-09-29"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""code": "482.12""#))
        .stdout(predicate::str::contains(r#""code": "482.12(e)(1)(i)(A)""#))
        .stdout(predicate::str::contains(r#""subpart_name": "Administration""#))
        .stdout(predicate::str::contains("482.13").not());
}

#[test]
fn test_parse_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("subpart_a.json");

    harvester()
        .arg("parse")
        .arg(fixture("subpart_a.xml"))
        .args(["--date", "2025-09-29", "--output"])
        .arg(&output)
        .assert()
        .success();

    let written = std::fs::read_to_string(&output).unwrap();
    let documents: Vec<serde_json::Value> = serde_json::from_str(&written).unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["regulation_id"], "42_CFR_482_1");
    assert_eq!(documents[1]["content"][1]["standard_code"], "482.2(b)");
}

#[test]
fn test_parse_unknown_section_fails() {
    harvester()
        .arg("parse")
        .arg(fixture("subpart_a.xml"))
        .args(["--section", "482.99", "--date", "2025-09-29"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Missing required XML element: section 482.99"));
}

#[test]
fn test_parse_rejects_invalid_subpart_label() {
    harvester()
        .arg("parse")
        .arg(fixture("subpart_a.xml"))
        .args(["--subpart", "a1", "--date", "2025-09-29"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid subpart label"));
}

#[test]
fn test_harvest_rejects_invalid_title_before_network() {
    harvester()
        .args(["harvest", "--title", "99", "--api-url", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid title number: '99'"));
}

#[test]
fn test_help_lists_subcommands() {
    harvester()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("harvest"))
        .stdout(predicate::str::contains("parse"));
}
