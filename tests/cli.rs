use std::path::Path;
use std::process::{Command, Output};

const ISSUES: &str = r#"[
  {"number": 101, "title": "Installer crashes on Windows", "state": "open",
   "labels": ["kind/bug", "area/installer"],
   "created_at": "2024-01-03T09:00:00Z", "updated_at": "2024-01-13T09:00:00Z",
   "events": [
     {"event_type": "commented", "event_date": "2024-01-04T10:00:00Z"},
     {"event_type": "commented", "event_date": "2024-01-05T10:00:00Z"},
     {"event_type": "labeled", "event_date": "2024-01-03T12:00:00Z"}
   ]},
  {"number": 102, "title": "Stale lock entry", "state": "closed",
   "labels": [{"name": "status/triage"}, {"name": "area/cli"}, {"name": "area/solver"}],
   "created_at": "2024-02-01T00:00:00Z", "updated_at": "2024-02-21T00:00:00Z",
   "events": [
     {"event_type": "commented", "event_date": "2024-02-02T00:00:00Z"},
     {"event_type": "labeled", "event_date": "2024-02-05T00:00:00Z"}
   ]},
  {"number": 103, "title": "Explain groups", "state": "closed",
   "labels": ["area/docs"],
   "created_at": "2022-06-01T00:00:00Z", "updated_at": "2022-06-03T00:00:00Z",
   "events": [{"event_type": "commented", "event_date": "2022-06-02T00:00:00Z"}]},
  {"number": 104, "title": "Question about caching", "state": "open",
   "labels": ["status/triage", "good first issue"],
   "created_at": "2024-03-01T00:00:00Z",
   "events": [{"event_type": "commented", "event_date": "2024-03-02T00:00:00Z"}]}
]"#;

fn write_fixture(dir: &Path) -> String {
    let path = dir.join("issues.json");
    std::fs::write(&path, ISSUES).unwrap();
    path.to_string_lossy().into_owned()
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_issuelens"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "issuelens failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn categories_text_defaults_to_latest_year() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_fixture(dir.path());

    let out = stdout(&run(dir.path(), &["categories", "--data", &data]));
    assert!(out.contains("Most Active Issues (2024)"));
    assert!(out.contains("#101"));
    assert!(out.contains("#102"));
    assert!(!out.contains("#103"));
    assert!(out.contains("Top labels found in 'Other':"));
}

#[test]
fn categories_json_uses_camel_case() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_fixture(dir.path());

    let out = stdout(&run(
        dir.path(),
        &["categories", "--data", &data, "--format", "json", "--start-year", "2022", "--end-year", "2024"],
    ));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["status"], "report");
    assert_eq!(json["period"], "2022-2024");
    assert_eq!(json["issuesInPeriod"], 4);
    assert_eq!(json["top"].as_array().unwrap().len(), 4);
}

#[test]
fn categories_type_filter_without_matches() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_fixture(dir.path());

    let out = stdout(&run(
        dir.path(),
        &["categories", "--data", &data, "--type", "feature", "--format", "json"],
    ));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["noMatches"], true);
    assert!(json["top"].as_array().unwrap().is_empty());
    assert_eq!(json["other"]["issues"], 1);
}

#[test]
fn categories_empty_period_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_fixture(dir.path());

    let out = stdout(&run(dir.path(), &["categories", "--data", &data, "--year", "2010"]));
    assert!(out.contains("No events found for selected period 2010."));
}

#[test]
fn single_range_bound_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_fixture(dir.path());

    let output = run(dir.path(), &["categories", "--data", &data, "--start-year", "2022"]);
    assert!(!output.status.success());
}

#[test]
fn unknown_category_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_fixture(dir.path());

    let output = run(dir.path(), &["categories", "--data", &data, "--type", "chores"]);
    assert!(!output.status.success());
}

#[test]
fn missing_data_file_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &["categories", "--data", "nope.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.json"));
}

#[test]
fn config_file_supplies_data_path_and_top_n() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    std::fs::write(
        dir.path().join(".issuelens.toml"),
        "[data]\npath = \"issues.json\"\n\n[activity]\ntop_n = 1\n",
    )
    .unwrap();

    let out = stdout(&run(dir.path(), &["categories", "--format", "json"]));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["top"].as_array().unwrap().len(), 1);

    // CLI flag wins over the file.
    let out = stdout(&run(dir.path(), &["categories", "--format", "json", "--top", "2"]));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["top"].as_array().unwrap().len(), 2);
}

#[test]
fn impact_reports_multi_area_issues() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_fixture(dir.path());

    let out = stdout(&run(dir.path(), &["impact", "--data", &data, "--format", "json"]));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["timeline"], "all time");
    let multi = json["multiArea"].as_array().unwrap();
    assert_eq!(multi.len(), 1);
    assert_eq!(multi[0]["id"], "102");
}

#[test]
fn resolution_markdown_lists_events() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_fixture(dir.path());

    let out = stdout(&run(
        dir.path(),
        &["resolution", "--data", &data, "--format", "markdown", "--event", "labeled,commented"],
    ));
    assert!(out.starts_with("# Event Timing vs Resolution Time"));
    assert!(out.contains("| labeled | 2 |"));
    assert!(out.contains("| commented | 3 |"));
}
