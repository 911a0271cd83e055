use std::{fs, path::PathBuf};

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::tempdir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn profile_json(input: &std::path::Path) -> serde_json::Value {
    let assert = Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args(["profile", "-i", input.to_str().unwrap(), "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    serde_json::from_str(&stdout).expect("profile JSON")
}

#[test]
fn profile_table_reports_columns_and_roles_for_stocks() {
    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args(["profile", "-i", fixture_path("stocks.csv").to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            contains("column")
                .and(contains("cardinality"))
                .and(contains("primary metric"))
                .and(contains("Open"))
                .and(contains("Sector")),
        );
}

#[test]
fn profile_json_picks_stock_roles() {
    let profile = profile_json(&fixture_path("stocks.csv"));
    assert_eq!(profile["rowCount"], 12);
    assert_eq!(profile["dateColumn"], "Date");
    assert_eq!(profile["primaryMetric"], "Open");
    assert_eq!(profile["primaryCategory"], "Sector");
    let numeric: Vec<&str> = profile["numericColumns"]
        .as_array()
        .expect("numeric list")
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(numeric, vec!["Open", "Close", "Volume"]);
    let categories: Vec<&str> = profile["categoryColumns"]
        .as_array()
        .expect("category list")
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["Sector", "Symbol"]);
}

#[test]
fn profile_json_picks_sales_roles_from_json_input() {
    let profile = profile_json(&fixture_path("sales.json"));
    assert_eq!(profile["rowCount"], 2);
    assert_eq!(profile["dateColumn"], "Date");
    assert_eq!(profile["primaryMetric"], "Sales");
    assert_eq!(profile["primaryCategory"], "Region");
}

#[test]
fn equivalent_csv_and_json_inputs_profile_identically() {
    let from_csv = profile_json(&fixture_path("sales.csv"));
    let from_json = profile_json(&fixture_path("sales.json"));
    assert_eq!(from_csv, from_json);
}

#[test]
fn identifier_columns_never_reach_the_metric_list() {
    let profile = profile_json(&fixture_path("order_ids.csv"));
    assert!(profile["primaryMetric"].is_null());
    assert!(
        profile["numericColumns"]
            .as_array()
            .expect("numeric list")
            .is_empty()
    );
}

#[test]
fn empty_input_degrades_to_no_usable_data() {
    let temp = tempdir().expect("temp dir");
    let empty_path = temp.path().join("empty.csv");
    fs::write(&empty_path, "").expect("write empty file");

    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args(["profile", "-i", empty_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("No usable data"));
}

#[test]
fn header_only_input_profiles_as_empty_json() {
    let temp = tempdir().expect("temp dir");
    let path = temp.path().join("header_only.csv");
    fs::write(&path, "a,b,c\n").expect("write header-only file");

    let profile = profile_json(&path);
    assert_eq!(profile["rowCount"], 0);
    assert!(profile["columns"].as_array().expect("columns").is_empty());
    assert!(profile["primaryMetric"].is_null());
    assert!(profile["primaryCategory"].is_null());
}

#[test]
fn sample_rows_flag_caps_cardinality() {
    let assert = Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args([
            "profile",
            "-i",
            fixture_path("stocks.csv").to_str().unwrap(),
            "--sample-rows",
            "3",
            "--json",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let profile: serde_json::Value = serde_json::from_str(&stdout).expect("profile JSON");
    let open = profile["columns"]
        .as_array()
        .expect("columns")
        .iter()
        .find(|column| column["name"] == "Open")
        .expect("Open column");
    assert_eq!(open["cardinality"], 3);
}

#[test]
fn missing_input_file_is_a_real_error() {
    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args(["profile", "-i", "definitely_not_here.csv"])
        .assert()
        .failure()
        .stderr(contains("Reading input file"));
}
