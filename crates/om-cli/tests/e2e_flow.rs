//! End-to-end tests driving the `om` binary against a temp SQLite store.
//!
//! Tests the full pipeline: log entries → list → summary → trend → export.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::{NamedTempFile, TempDir};

fn om_binary() -> String {
    env!("CARGO_BIN_EXE_om").to_string()
}

/// Writes a config file pointing at a database inside `temp`.
fn write_config(temp: &Path, extra: &str) -> NamedTempFile {
    let db_path = temp.join("om.db");
    let mut config_file = NamedTempFile::new().unwrap();
    writeln!(
        config_file,
        "database_path = \"{}\"\ntimezone = \"America/New_York\"\n{extra}",
        db_path.display()
    )
    .unwrap();
    config_file.flush().unwrap();
    config_file
}

fn om(home: &Path, config: &Path, args: &[&str]) -> Output {
    Command::new(om_binary())
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("OM_STORE")
        .env_remove("OM_DATABASE_PATH")
        .env_remove("OM_TIMEZONE")
        .env_remove("OM_CAREGIVERS")
        .env_remove("OM_REMOTE_URL")
        .env_remove("OM_REMOTE_API_KEY")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run om")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "om should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_full_logging_flow() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");

    // 22:00 to 02:00 local: 240 mL accrued across midnight.
    stdout_of(&om(
        temp.path(),
        config.path(),
        &[
            "log-output",
            "--by",
            "Joe",
            "--amount",
            "10",
            "--date",
            "2025-01-14",
            "--time",
            "22:00",
        ],
    ));
    let logged = stdout_of(&om(
        temp.path(),
        config.path(),
        &[
            "log-output",
            "--by",
            "Tori",
            "--amount",
            "240",
            "--date",
            "2025-01-15",
            "--time",
            "02:00",
        ],
    ));
    assert!(logged.starts_with("Saved 240 mL output at 01/15/2025 2:00 AM (entered by Tori)"));

    let dressing = stdout_of(&om(
        temp.path(),
        config.path(),
        &[
            "log-dressing",
            "--by",
            "Tori",
            "--weight",
            "40",
            "--drainage",
            "urine",
            "--date",
            "2025-01-15",
            "--time",
            "11:00",
        ],
    ));
    assert!(dressing.contains("absorbed 4 mL"));
    assert!(dressing.contains("Urine leak recorded"));

    let list = stdout_of(&om(temp.path(), config.path(), &["list"]));
    assert!(list.contains("Showing 2 most recent entries. Total: 2 entries"));
    assert!(list.contains("Showing 1 most recent entries. Total: 1 entries"));

    let summary = stdout_of(&om(
        temp.path(),
        config.path(),
        &["summary", "--date", "2025-01-15"],
    ));
    assert!(summary.contains("Total output: 240 mL (1 entries)"));
    assert!(summary.contains("Urine leak: yes"));

    let trend = stdout_of(&om(temp.path(), config.path(), &["trend", "--json"]));
    let points: serde_json::Value = serde_json::from_str(&trend).unwrap();
    assert_eq!(
        points,
        serde_json::json!([
            {"date": "2025-01-14", "hourly_average": 5, "status": "low"},
            {"date": "2025-01-15", "hourly_average": 5, "status": "low"}
        ])
    );

    let export_dir = temp.path().join("exports");
    let exported = stdout_of(&om(
        temp.path(),
        config.path(),
        &["export", "--output-dir", export_dir.to_str().unwrap()],
    ));
    assert!(exported.starts_with("Exported 2 output entries and 1 dressing changes to "));
    let files: Vec<_> = std::fs::read_dir(&export_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("output_monitor_"));
    let csv = std::fs::read_to_string(export_dir.join(&files[0])).unwrap();
    assert!(csv.contains("01/15/2025,2:00 AM,240,Tori"));
    assert!(csv.contains("01/15/2025,11:00 AM,4,Urine,Tori"));

    let chart_path = temp.path().join("trend.svg");
    stdout_of(&om(
        temp.path(),
        config.path(),
        &["chart", "--output", chart_path.to_str().unwrap()],
    ));
    let svg = std::fs::read_to_string(&chart_path).unwrap();
    assert!(svg.contains("01/14/2025: 5 mL/hr"));
}

#[test]
fn test_invalid_amount_fails_without_saving() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");

    let output = om(
        temp.path(),
        config.path(),
        &["log-output", "--by", "Joe", "--amount", "abc"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("valid positive number for amount"),
        "unexpected stderr: {stderr}"
    );

    let list = stdout_of(&om(temp.path(), config.path(), &["list", "--json"]));
    let value: serde_json::Value = serde_json::from_str(&list).unwrap();
    assert_eq!(value["outputs"]["total"], 0);
}

#[test]
fn test_caregiver_roster_is_enforced() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), r#"caregivers = ["Joe", "Tori"]"#);

    let output = om(
        temp.path(),
        config.path(),
        &["log-output", "--by", "Sam", "--amount", "30"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown caregiver"));

    let output = om(
        temp.path(),
        config.path(),
        &["log-output", "--by", "joe", "--amount", "30"],
    );
    assert!(stdout_of(&output).contains("(entered by Joe)"));
}

#[test]
fn test_remote_store_requires_credentials() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), r#"store = "remote""#);

    let output = om(temp.path(), config.path(), &["list"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing remote store URL"));
}
