//! End-to-end tests for the attendance flow.
//!
//! Drives the `att` binary: import employees and swipes, then read them back
//! through the daily log, monthly grid, tracked hours, day details, CSV export
//! and status commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const EMPLOYEES: &str = r#"{"id":1,"name":"Aysel","last_name":"Guliyeva","position":"Engineer"}
{"id":2,"name":"Rashad","last_name":"Huseynov","position":"Accountant"}
{"id":3,"name":"Leyla","last_name":"Mammadova","position":"VISITOR"}
"#;

const SWIPES: &str = r#"{"id":"s1","name":"Aysel","last_name":"Guliyeva","timestamp":"2025-01-06 08:58:00","reader_name":"Gate-1"}
{"id":"s2","name":"Aysel","last_name":"Guliyeva","timestamp":"2025-01-06 17:32:00","reader_name":"Gate-3"}
{"id":"s3","name":"Rashad","last_name":"Huseynov","timestamp":"2025-01-06T09:00:00","reader_name":"Gate-2"}
{"id":"s4","name":"Aysel","last_name":"Guliyeva","timestamp":"2025-01-07T09:30:00","reader_name":"Gate-1"}
{"id":"s5","name":"Aysel","last_name":"Guliyeva","timestamp":"2025-01-07T12:30:00","reader_name":"Gate-4"}
{"id":"s6","name":"Aysel","last_name":"Guliyeva","timestamp":"2025-01-07T12:00:00","reader_name":"Parking"}
{"id":"s7","name":"Leyla","last_name":"Mammadova","timestamp":"2025-01-06T09:05:00","reader_name":"Gate-1"}
{"id":"s8","name":"Stranger","last_name":"Nobody","timestamp":"2025-01-06T09:10:00","reader_name":"Gate-2"}
"#;

fn att_binary() -> &'static str {
    env!("CARGO_BIN_EXE_att")
}

/// A temp home with a config file pointing at a temp database.
struct Env {
    temp: TempDir,
    config: PathBuf,
}

impl Env {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("data").join("att.db");
        let config = temp.path().join("att.toml");
        std::fs::write(
            &config,
            format!("database_path = \"{}\"\n", db_path.display()),
        )
        .unwrap();
        Self { temp, config }
    }

    fn home(&self) -> &Path {
        self.temp.path()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(att_binary());
        cmd.env("HOME", self.home())
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        let output = self.command().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "att {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        output
    }

    fn import(&self, kind: &str, input: &str) -> Output {
        let mut child = self
            .command()
            .arg("import")
            .arg(kind)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn att import");
        child
            .stdin
            .as_mut()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
        let output = child.wait_with_output().expect("failed to wait for att import");
        assert!(
            output.status.success(),
            "import {kind} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        output
    }

    fn seeded() -> Self {
        let env = Self::new();
        env.import("employees", EMPLOYEES);
        env.import("swipes", SWIPES);
        env
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_import_reports_counts_and_skips_duplicates() {
    let env = Env::new();

    let output = env.import("swipes", SWIPES);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Imported 8 new of 8"), "unexpected: {stderr}");

    let output = env.import("swipes", SWIPES);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Imported 0 new of 8"), "unexpected: {stderr}");
}

#[test]
fn test_import_rejects_malformed_lines() {
    let env = Env::new();
    let output = env
        .command()
        .arg("import")
        .arg("swipes")
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            child.stdin.as_mut().unwrap().write_all(b"{oops\n")?;
            child.wait_with_output()
        })
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid JSON on line 1"));
}

#[test]
fn test_daily_log_for_one_person() {
    let env = Env::seeded();
    let output = env.run(&[
        "daily",
        "--person",
        "Aysel Guliyeva",
        "--from",
        "2025-01-06",
        "--to",
        "2025-01-08",
        "--json",
    ]);

    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let rows = rows.as_array().unwrap();
    let dates: Vec<&str> = rows.iter().map(|r| r["date"].as_str().unwrap()).collect();
    // the 8th has no swipes and is filled in as an absence
    assert_eq!(dates, vec!["2025-01-08", "2025-01-07", "2025-01-06"]);
    assert_eq!(rows[0]["status"], "absent");
    assert_eq!(rows[1]["status"], "short_hours");
    assert_eq!(rows[1]["inside_time"], "03:00:00");
    assert_eq!(rows[2]["status"], "full_day");
    assert_eq!(rows[2]["inside_time"], "08:34:00");
}

#[test]
fn test_daily_log_marks_open_past_day_invalid() {
    let env = Env::seeded();
    let output = env.run(&["daily", "--from", "2025-01-06", "--to", "2025-01-06"]);
    let text = stdout(&output);

    let rashad = text
        .lines()
        .find(|line| line.contains("Rashad Huseynov"))
        .expect("row for Rashad");
    assert!(rashad.contains("Invalid Data"), "{rashad}");
    assert!(rashad.contains("N/A"), "{rashad}");
}

#[test]
fn test_visitors_and_unknown_people_are_left_out() {
    let env = Env::seeded();

    let output = env.run(&["daily", "--from", "2025-01-06", "--to", "2025-01-07", "--json"]);
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["last_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Guliyeva", "Guliyeva", "Huseynov"]);

    let output = env.run(&["daily", "--person", "Leyla Mammadova", "--from", "2025-01-06"]);
    assert_eq!(stdout(&output), "No attendance records.\n");

    let output = env.run(&["export", "--from", "2025-01-06", "--to", "2025-01-07"]);
    let text = stdout(&output);
    assert!(!text.contains("Mammadova"), "{text}");
    assert!(!text.contains("Nobody"), "{text}");
}

#[test]
fn test_monthly_grid_excludes_visitors() {
    let env = Env::seeded();
    let output = env.run(&["monthly", "--year", "2025", "--month", "1", "--json"]);

    let grid: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(grid["month_name"], "January");
    assert_eq!(grid["total_items"], 2);
    let rows = grid["rows"].as_array().unwrap();
    assert_eq!(rows[0]["name"], "Aysel Guliyeva");
    // columns: 1 2 3 6 7
    assert_eq!(rows[0]["days"][3], "T");
    assert_eq!(rows[0]["days"][4], "E");
    assert_eq!(rows[1]["days"][3], "D");
}

#[test]
fn test_export_csv() {
    let env = Env::seeded();
    let output = env.run(&["export", "--from", "2025-01-06", "--to", "2025-01-07"]);
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines[0],
        "Date,Name,Last Name,First In,Last Out,Inside Time,Outside Time,Status"
    );
    assert_eq!(lines.len(), 4);
    assert!(lines.contains(
        &"06.01.2025,Aysel,Guliyeva,08:58:00,17:32:00,08:34:00,00:00:00,✓ Full Day"
    ));
}

#[test]
fn test_tracked_hours() {
    let env = Env::seeded();
    let output = env.run(&[
        "hours",
        "--person",
        "Aysel Guliyeva",
        "--from",
        "2025-01-03",
        "--to",
        "2025-01-07",
        "--json",
    ]);

    let hours: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let cells: Vec<&str> = hours["days"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["cell"].as_str().unwrap())
        .collect();
    // Tue, Mon, Fri; the weekend is skipped
    assert_eq!(cells, vec!["E", "T", "D"]);
    assert_eq!(hours["total_time"], "11:34:00");
}

#[test]
fn test_day_details() {
    let env = Env::seeded();
    let output = env.run(&["details", "--person", "Aysel Guliyeva", "--date", "2025-01-07"]);
    let text = stdout(&output);
    assert!(text.contains("09:30:00  Gate-1  Entry"), "{text}");
    assert!(text.contains("12:30:00  Gate-4  Exit"), "{text}");
    assert!(!text.contains("Parking"), "{text}");
    assert!(text.contains("Inside:    03:00:00"), "{text}");

    let output = env
        .command()
        .args(["details", "--person", "Leyla Mammadova", "--date", "2025-01-06"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no employee named"));
}

#[test]
fn test_late_then_status() {
    let env = Env::seeded();
    let output = env.run(&["late", "--date", "2025-01-07"]);
    let text = stdout(&output);
    assert!(text.contains("Aysel Guliyeva: 09:30:00 (30 min late)"), "{text}");

    let output = env.run(&["status"]);
    let text = stdout(&output);
    assert!(text.contains("Employees: 3"), "{text}");
    assert!(text.contains("- Parking (unclassified): 2025-01-07T12:00:00"), "{text}");
}

#[test]
fn test_env_overrides_config_file() {
    let env = Env::seeded();
    let output = env
        .command()
        .env("ATT_FULL_DAY_SECONDS", "36000")
        .args(["daily", "--from", "2025-01-06", "--to", "2025-01-06", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let aysel = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "Aysel")
        .unwrap();
    assert_eq!(aysel["status"], "short_hours");
}
