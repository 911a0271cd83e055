use std::path::PathBuf;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

#[test]
fn ask_without_transport_emits_the_payload() {
    let assert = Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args([
            "ask",
            "-i",
            fixture_path("stocks.csv").to_str().unwrap(),
            "-q",
            "which sector is strongest?",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("payload JSON");
    assert_eq!(payload["query"], "which sector is strongest?");
    assert_eq!(
        payload["columns"]
            .as_array()
            .expect("columns")
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect::<Vec<_>>(),
        vec!["Date", "Symbol", "Open", "Close", "Volume", "Sector"]
    );
    assert_eq!(payload["sample"].as_array().expect("sample").len(), 12);
}

#[test]
fn ask_pipes_the_payload_to_the_analyst_command() {
    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args([
            "ask",
            "-i",
            fixture_path("stocks.csv").to_str().unwrap(),
            "-q",
            "summarize",
            "--analyst-cmd",
            "cat >/dev/null && echo dataset looks healthy",
        ])
        .assert()
        .success()
        .stdout(contains("dataset looks healthy"));
}

#[test]
fn failing_analyst_command_degrades_to_unavailable() {
    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args([
            "ask",
            "-i",
            fixture_path("stocks.csv").to_str().unwrap(),
            "-q",
            "summarize",
            "--analyst-cmd",
            "cat >/dev/null; exit 3",
        ])
        .assert()
        .success()
        .stdout(contains("Analysis unavailable"));
}

#[test]
fn forecast_renders_a_captured_response() {
    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args([
            "forecast",
            "-i",
            fixture_path("stocks.csv").to_str().unwrap(),
            "--response",
            fixture_path("forecast_response.json").to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(
            contains("AAPL")
                .and(contains("Bearish"))
                .and(contains("Outlook:"))
                .and(contains("Recommendation:")),
        );
}

#[test]
fn unreadable_forecast_response_degrades_to_unavailable() {
    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args([
            "forecast",
            "-i",
            fixture_path("stocks.csv").to_str().unwrap(),
            "--response",
            "no_such_response.json",
        ])
        .assert()
        .success()
        .stdout(contains("Forecast unavailable"));
}

#[test]
fn garbage_forecast_output_degrades_to_unavailable() {
    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args([
            "forecast",
            "-i",
            fixture_path("stocks.csv").to_str().unwrap(),
            "--analyst-cmd",
            "cat >/dev/null && echo not-a-forecast",
        ])
        .assert()
        .success()
        .stdout(contains("Forecast unavailable"));
}
