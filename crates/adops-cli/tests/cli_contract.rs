// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use assert_cmd::Command;

const CAMPAIGNS: &str = r#"[
  {"id": "c1", "name": "Spring Sale", "advertiser": "Acme", "publisher": "Daily News",
   "status": "Active", "budget": 100, "spent": 25, "impressions": 1000, "clicks": 10,
   "start_date": "2024-01-05", "end_date": "2024-03-01"},
  {"id": "c2", "name": "Summer Launch", "advertiser": "Globex", "publisher": "Metro",
   "status": "Paused", "budget": 200, "spent": 50, "impressions": 4000, "clicks": 20,
   "start_date": "2024-06-01", "end_date": "2024-08-01"},
  {"id": "c3", "name": "Autumn Push", "advertiser": "Acme", "publisher": "Metro",
   "status": "Active", "budget": 300, "spent": 300, "impressions": 0, "clicks": 0,
   "start_date": "2024-09-01", "end_date": "2024-11-01"}
]"#;

fn adops() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_adops"));
    cmd.env_remove("ADOPS_LOG_LEVEL")
        .env_remove("ADOPS_LOG_JSON")
        .env_remove("ADOPS_LOAD_LATENCY_MS")
        .env_remove("ADOPS_MAX_FILTERS")
        .env("ADOPS_CONFIG", "/nonexistent/adops/config.json");
    cmd
}

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write fixture");
    path
}

/// Log lines may precede the error on stderr; the error is always last.
fn machine_error(output: &std::process::Output) -> serde_json::Value {
    let text = String::from_utf8_lossy(&output.stderr);
    let line = text
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .expect("stderr line");
    serde_json::from_str(line).expect("machine error")
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("json stdout")
}

#[test]
fn query_filters_sorts_and_aggregates_a_record_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let records = write(tmp.path(), "campaigns.json", CAMPAIGNS);

    let output = adops()
        .args(["--json", "query", "--screen", "campaigns", "--records"])
        .arg(&records)
        .args(["--filter", "status=Active", "--sort", "budget:desc"])
        .output()
        .expect("run query");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let payload = json_stdout(&output);
    let ids: Vec<&str> = payload["records"]
        .as_array()
        .expect("records")
        .iter()
        .filter_map(|r| r["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["c3", "c1"]);
    assert_eq!(payload["total"], 3);
    assert_eq!(payload["visible"], 2);
    assert_eq!(payload["aggregates"]["total_budget"], 400.0);
    assert_eq!(payload["aggregates"]["active"], 2.0);
    assert_eq!(payload["errors"].as_array().map(Vec::len), Some(0));
}

#[test]
fn search_with_no_match_returns_empty_rows_and_zero_averages() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let records = write(tmp.path(), "campaigns.json", CAMPAIGNS);

    let output = adops()
        .args(["--json", "query", "--screen", "campaigns", "--records"])
        .arg(&records)
        .args(["--search", "foo", "--equals", "status=all"])
        .output()
        .expect("run query");
    assert!(output.status.success());
    let payload = json_stdout(&output);
    assert_eq!(payload["visible"], 0);
    assert_eq!(payload["aggregates"]["avg_ctr"], 0.0);
}

#[test]
fn schema_driven_records_are_queryable() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let schema = write(
        tmp.path(),
        "schema.json",
        r#"{"fields": [
            {"name": "name", "kind": "text", "searchable": true},
            {"name": "status", "kind": "category"},
            {"name": "budget", "kind": "number"}
        ]}"#,
    );
    let records = write(
        tmp.path(),
        "rows.json",
        r#"{"records": [
            {"id": 1, "name": "Spring", "status": "Active", "budget": 100},
            {"id": 2, "name": "Summer", "status": "Paused", "budget": 200}
        ]}"#,
    );

    let output = adops()
        .args(["--json", "query", "--screen", "custom", "--schema"])
        .arg(&schema)
        .arg("--records")
        .arg(&records)
        .args(["--sort", "nonexistent", "--export", "csv"])
        .output()
        .expect("run query");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let payload = json_stdout(&output);
    let ids: Vec<&str> = payload["records"]
        .as_array()
        .expect("records")
        .iter()
        .filter_map(|r| r["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(payload["export"]["records"], 2);
    assert!(payload["export"]["file_name"]
        .as_str()
        .is_some_and(|name| name.starts_with("custom-") && name.ends_with(".csv")));
}

#[test]
fn table_output_lists_rows_and_stat_cards() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let records = write(tmp.path(), "campaigns.json", CAMPAIGNS);

    let output = adops()
        .args(["query", "--screen", "campaigns", "--records"])
        .arg(&records)
        .args(["--date-range", "start_date=2024-06-01.."])
        .output()
        .expect("run query");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8");
    assert!(text.lines().next().is_some_and(|l| l.starts_with("id")));
    assert!(text.contains("Summer Launch"));
    assert!(!text.contains("Spring Sale"));
    assert!(text.contains("2 of 3 records"));
    assert!(text.contains("total_budget: 500"));
}

#[test]
fn unknown_screen_is_a_validation_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let records = write(tmp.path(), "campaigns.json", CAMPAIGNS);

    let output = adops()
        .args(["--json", "query", "--screen", "billing", "--records"])
        .arg(&records)
        .output()
        .expect("run query");
    assert_eq!(output.status.code(), Some(3));
    let err = machine_error(&output);
    assert_eq!(err["code"], "validation_error");
}

#[test]
fn malformed_flags_are_usage_errors() {
    let output = adops()
        .args(["--json", "query", "--screen", "campaigns", "--records", "x.json"])
        .args(["--toggle", "programmatic=perhaps"])
        .output()
        .expect("run query");
    assert_eq!(output.status.code(), Some(2));
    let err = machine_error(&output);
    assert_eq!(err["code"], "usage_error");
}

#[test]
fn missing_record_file_is_a_dependency_failure() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let output = adops()
        .args(["--json", "query", "--screen", "campaigns", "--records"])
        .arg(tmp.path().join("absent.json"))
        .output()
        .expect("run query");
    assert_eq!(output.status.code(), Some(4));
    let err = machine_error(&output);
    assert_eq!(err["details"]["retryable"], "true");
}

#[test]
fn screens_and_fields_describe_the_registries() {
    let output = adops()
        .args(["--json", "screens"])
        .output()
        .expect("run screens");
    assert!(output.status.success());
    let payload = json_stdout(&output);
    let names: Vec<&str> = payload["screens"]
        .as_array()
        .expect("screens")
        .iter()
        .filter_map(|s| s["screen"].as_str())
        .collect();
    assert_eq!(names, vec!["campaigns", "adops", "hur", "organizations", "reports"]);

    let output = adops()
        .args(["--json", "fields", "--screen", "hur"])
        .output()
        .expect("run fields");
    assert!(output.status.success());
    let payload = json_stdout(&output);
    let urgent = payload["fields"]
        .as_array()
        .expect("fields")
        .iter()
        .find(|f| f["name"] == "urgent")
        .expect("urgent field");
    assert_eq!(urgent["kind"], "bool");
}

#[test]
fn config_reports_paths_and_limits() {
    let output = adops()
        .env("ADOPS_CONFIG", "/nonexistent/adops-test.json")
        .env("ADOPS_MAX_FILTERS", "7")
        .args(["--json", "config"])
        .output()
        .expect("run config");
    assert!(output.status.success());
    let payload = json_stdout(&output);
    assert_eq!(payload["user_config"], "/nonexistent/adops-test.json");
    assert_eq!(payload["loaded"], serde_json::json!([]));
    assert_eq!(payload["view"]["limits"]["max_filters"], 7);
    assert_eq!(payload["view"]["load_latency_ms"], 0);
}

#[test]
fn config_file_values_apply_under_env_overrides() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = write(
        tmp.path(),
        "config.json",
        r#"{"load_timeout_ms": 2500, "max_selection": 3, "max_filters": 9}"#,
    );
    let output = adops()
        .env("ADOPS_CONFIG", &path)
        .env("ADOPS_MAX_FILTERS", "7")
        .args(["--json", "config"])
        .output()
        .expect("run config");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let payload = json_stdout(&output);
    assert_eq!(payload["loaded"][0], path.display().to_string());
    assert_eq!(payload["view"]["load_timeout_ms"], 2500);
    assert_eq!(payload["view"]["limits"]["max_selection"], 3);
    assert_eq!(payload["view"]["limits"]["max_filters"], 7);

    let tight = write(tmp.path(), "tight.json", r#"{"max_filters": 1}"#);
    let records = write(tmp.path(), "campaigns.json", CAMPAIGNS);
    let output = adops()
        .env("ADOPS_CONFIG", &tight)
        .args(["--json", "query", "--screen", "campaigns", "--records"])
        .arg(&records)
        .args(["--filter", "status=Active", "--search", "spring"])
        .output()
        .expect("run query");
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn malformed_config_files_are_validation_errors() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = write(tmp.path(), "config.json", r#"{"load_latency": 5}"#);
    let output = adops()
        .env("ADOPS_CONFIG", &path)
        .args(["--json", "config"])
        .output()
        .expect("run config");
    assert_eq!(output.status.code(), Some(3));
    let err = machine_error(&output);
    assert!(err["message"].as_str().is_some_and(|m| m.contains("load_latency")));
}
