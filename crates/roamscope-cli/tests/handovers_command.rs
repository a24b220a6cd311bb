use assert_cmd::Command;
use predicates::prelude::*;
use roamscope_core::dataset::{EventKind, NodeId};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[allow(deprecated)]
fn roamscope_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("roamscope")
}

/// Test that analyze_handovers extracts interruptions from an event table
#[test]
fn test_analyze_handovers_fixture() {
    let analysis =
        roamscope_cli::commands::handovers::analyze_handovers(&fixture("handover_events.csv"))
            .unwrap();

    assert_eq!(analysis.summary.total_handovers, 2);
    assert_eq!(analysis.summary.stations_with_handovers, 2);
    assert_eq!(analysis.interruptions.len(), 2);
    assert_eq!(analysis.interruptions[0].station_id, NodeId::Numeric(0));
    assert_eq!(analysis.interruptions[0].ended_by, EventKind::Handover);
    assert!((analysis.summary.mean_interruption_duration - 0.125).abs() < 1e-9);
}

#[test]
fn test_analyze_handovers_rejects_malformed_rows() {
    let result =
        roamscope_cli::commands::handovers::analyze_handovers(&fixture("malformed_events.csv"));

    let message = result.unwrap_err().to_string();
    assert!(message.contains("line 3"), "unexpected error: {}", message);
    assert!(message.contains("REBOOT"));
}

#[test]
fn test_handovers_json_output() {
    let mut cmd = Command::new(roamscope_bin());
    cmd.arg("handovers")
        .arg(fixture("handover_events.csv"))
        .arg("--interruptions")
        .arg("--format")
        .arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(json["summary"]["total_handovers"], 2);
    assert_eq!(json["interruptions"].as_array().unwrap().len(), 2);
    assert_eq!(json["interruptions"][0]["ended_by"], "handover");
}

#[test]
fn test_handovers_table_output() {
    let mut cmd = Command::new(roamscope_bin());
    cmd.arg("handovers")
        .arg(fixture("handover_events.csv"))
        .arg("--format")
        .arg("table");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Metric,Value"))
        .stdout(predicate::str::contains("Total Handovers,2"));
}

#[test]
fn test_handovers_malformed_input_fails() {
    let mut cmd = Command::new(roamscope_bin());
    cmd.arg("handovers").arg(fixture("malformed_events.csv"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized EventType 'REBOOT'"));
}

#[test]
fn test_handovers_missing_file_fails() {
    let mut cmd = Command::new(roamscope_bin());
    cmd.arg("handovers").arg(fixture("does_not_exist.csv"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read dataset"));
}
