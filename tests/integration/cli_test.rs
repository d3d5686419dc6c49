//! Command-line integration tests.
//!
//! Runs the `neo` binary against seeded SQLite stores and checks its output
//! and exit status.

use super::common::two_asteroid_store;
use std::path::Path;
use std::process::Command;

/// Runs `neo` with the given arguments and an isolated config path.
/// Returns (exit code, stdout, stderr).
fn run_neo(config_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_neo"))
        .arg("--config")
        .arg(config_dir.join("config.toml"))
        .args(args)
        .env_remove("MYSQL_DATABASE")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute neo");

    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

#[test]
fn test_list_needs_no_connection() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_neo(dir.path(), &["list"]);

    assert_eq!(code, 0);
    assert_eq!(stdout.lines().count(), 15);
    assert!(stdout.contains("faster-than-50k"));
}

#[test]
fn test_show_sql_prints_template_and_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_neo(
        dir.path(),
        &["filter", "--hazardous", "yes", "--max-velocity", "75000", "--show-sql"],
    );

    assert_eq!(code, 0);
    assert!(stdout.starts_with("SELECT a.name"));
    assert!(stdout.contains("a.is_potentially_hazardous_asteroid = TRUE"));
    assert!(stdout.contains("  ?4 = 75000"));
    assert!(!stdout.contains("$"));
    assert!(!stdout.contains("Found"));
}

#[tokio::test]
async fn test_run_catalog_entry_text_output() {
    let store = two_asteroid_store().await;
    let path = store.path.to_string_lossy().to_string();
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_neo(dir.path(), &["--sqlite", &path, "run", "10"]);

    assert_eq!(code, 0);
    assert!(stdout.starts_with("Found 1 record\n"), "{stdout}");
    assert!(stdout.contains("│ X "));
    assert!(!stdout.contains("│ Y "));
}

#[tokio::test]
async fn test_run_filter_json_output() {
    let store = two_asteroid_store().await;
    let path = store.path.to_string_lossy().to_string();
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_neo(
        dir.path(),
        &["--format", "json", "--sqlite", &path, "filter", "--hazardous", "no"],
    );

    assert_eq!(code, 0);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["row_count"], 1);
    assert_eq!(value["rows"][0]["name"], "Y");
    assert_eq!(value["rows"][0]["close_approach_date"], "2025-06-02");
}

#[tokio::test]
async fn test_empty_result_exits_zero() {
    let store = two_asteroid_store().await;
    let path = store.path.to_string_lossy().to_string();
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_neo(
        dir.path(),
        &[
            "--sqlite",
            &path,
            "filter",
            "--start-date",
            "2025-12-31",
            "--end-date",
            "2025-01-01",
        ],
    );

    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "No asteroids found for selected filters.");
}

#[test]
fn test_missing_store_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.db");

    let (code, stdout, _) = run_neo(
        dir.path(),
        &["--sqlite", &missing.to_string_lossy(), "run", "approach-count"],
    );

    assert_eq!(code, 1);
    let expected = format!(
        "Error: Connection Error: Cannot open SQLite database {}:",
        missing.display()
    );
    assert!(stdout.starts_with(&expected), "{stdout}");
    assert_eq!(stdout.to_lowercase().matches("connection error").count(), 1, "{stdout}");
}

#[tokio::test]
async fn test_empty_catalog_result_uses_catalog_message() {
    let store = two_asteroid_store().await;
    let path = store.path.to_string_lossy().to_string();
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_neo(dir.path(), &["--sqlite", &path, "run", "within-one-ld"]);

    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "No results found.");
}

#[test]
fn test_unknown_query_id_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("unused.db");

    let (code, stdout, _) = run_neo(
        dir.path(),
        &["--format", "json", "--sqlite", &db.to_string_lossy(), "run", "fastest-comet"],
    );

    assert_eq!(code, 1);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["status"], "failure");
    assert_eq!(value["kind"], "unknown_query_id");
}

#[test]
fn test_no_connection_configured_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_neo(dir.path(), &["run", "brightest"]);

    assert_eq!(code, 1);
    assert!(stdout.contains("No store connection configured"));
}

#[test]
fn test_named_connection_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        format!(
            "[connections.snapshot]\nbackend = \"sqlite\"\npath = \"{}\"\n",
            dir.path().join("absent.db").display()
        ),
    )
    .unwrap();

    let (code, stdout, _) = run_neo(dir.path(), &["-c", "snapshot", "run", "brightest"]);
    assert_eq!(code, 1);
    assert!(stdout.starts_with("Error: Connection Error:"), "{stdout}");

    let (code, stdout, _) = run_neo(dir.path(), &["-c", "missing", "run", "brightest"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("Connection 'missing' not found"), "{stdout}");
}

#[tokio::test]
async fn test_sqlite_flag_overrides_configured_default() {
    let store = two_asteroid_store().await;
    let path = store.path.to_string_lossy().to_string();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        format!(
            "[connections.default]\nbackend = \"sqlite\"\npath = \"{}\"\n",
            dir.path().join("absent.db").display()
        ),
    )
    .unwrap();

    let (code, stdout, _) = run_neo(dir.path(), &["--sqlite", &path, "run", "10"]);

    assert_eq!(code, 0, "{stdout}");
    assert!(stdout.starts_with("Found 1 record\n"), "{stdout}");
}
