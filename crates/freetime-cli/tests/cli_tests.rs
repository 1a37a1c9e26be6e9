//! Integration tests for the `freetime` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to run the `free` and `say`
//! subcommands against calendar fixtures, including error exits and writes
//! to a calendar file in a temp directory.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn freetime() -> Command {
    Command::cargo_bin("freetime").unwrap()
}

/// Copy the calendar fixture somewhere the test may write to.
fn writable_calendar(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("calendar.json");
    std::fs::copy(fixture("calendar.json"), &path).unwrap();
    path
}

// ─────────────────────────────────────────────────────────────────────────────
// free
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn free_in_two_days_prints_report() {
    let expected = "Here are your free timeslots from March 4, 2024 - March 6, 2024 (UTC):\n\
                    \n\
                    Monday, March 4, 2024\n\
                    12:00 AM - 9:00 AM\n\
                    9:30 AM - 12:00 PM\n\
                    1:00 PM - midnight\n\
                    \n\
                    Tuesday, March 5, 2024\n\
                    12:00 AM - 11:00 PM\n";

    freetime()
        .args(["--now", "2024-03-04T00:00:00Z", "free", "--calendar"])
        .arg(fixture("calendar.json"))
        .args(["in", "2"])
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn free_json_output() {
    let output = freetime()
        .args(["free", "--json", "--calendar"])
        .arg(fixture("calendar.json"))
        .args(["start:", "4", "March", "2024", "end:", "6", "March", "2024"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["timezone"], "UTC");
    assert_eq!(value["range"]["start"], "2024-03-04T00:00:00Z");
    let days = value["days"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["free"].as_array().unwrap().len(), 3);
    assert_eq!(days[1]["free"][0]["end"], "2024-03-05T23:00:00Z");
}

#[test]
fn free_single_date_with_no_events_is_completely_free() {
    freetime()
        .args(["free", "--calendar"])
        .arg(fixture("calendar.json"))
        .args(["17", "July", "2021"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Saturday, July 17, 2021\nThis day is completely free!",
        ));
}

#[test]
fn free_rejects_non_positive_day_count() {
    freetime()
        .args(["free", "--calendar"])
        .arg(fixture("calendar.json"))
        .args(["in", "-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than 0"));
}

#[test]
fn free_without_arguments_fails() {
    freetime()
        .args(["free", "--calendar"])
        .arg(fixture("calendar.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("as a date"));
}

#[test]
fn free_with_missing_calendar_reports_unlinked_account() {
    let dir = tempfile::tempdir().unwrap();
    freetime()
        .args(["free", "--calendar"])
        .arg(dir.path().join("nope.json"))
        .args(["in", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no calendar account is linked"));
}

#[test]
fn free_with_revoked_calendar_fails() {
    freetime()
        .args(["free", "--calendar"])
        .arg(fixture("revoked.json"))
        .args(["in", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expired or been revoked"));
}

#[test]
fn unknown_timezone_flag_fails() {
    freetime()
        .args(["--timezone", "Mars/Olympus_Mons", "free", "--calendar"])
        .arg(fixture("calendar.json"))
        .args(["in", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be interpreted"));
}

#[test]
fn config_file_sets_reference_timezone() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("freetime.toml");
    std::fs::write(&config, "timezone = \"Asia/Tokyo\"\n").unwrap();

    // 4 March in Tokyo starts at 15:00Z on the 3rd; the calendar itself is UTC.
    freetime()
        .arg("--config")
        .arg(&config)
        .args(["free", "--json", "--calendar"])
        .arg(fixture("calendar.json"))
        .args(["4", "March", "2024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"start\": \"2024-03-03T15:00:00Z\""));
}

#[test]
fn invalid_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("freetime.toml");
    std::fs::write(&config, "link_ttl_minutes = 0\n").unwrap();

    freetime()
        .arg("--config")
        .arg(&config)
        .args(["free", "--calendar"])
        .arg(fixture("calendar.json"))
        .args(["in", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

// ─────────────────────────────────────────────────────────────────────────────
// say
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn say_help_lists_commands() {
    freetime()
        .args(["say", "--calendar"])
        .arg(fixture("calendar.json"))
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Here are all the commands"))
        .stdout(predicate::str::contains("create event"));
}

#[test]
fn say_unknown_message_exits_with_code_2() {
    freetime()
        .args(["say", "--calendar"])
        .arg(fixture("calendar.json"))
        .args(["what", "is", "up"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "Sorry, I don't know how to respond to \"what is up\"",
        ));
}

#[test]
fn say_freetime_uses_chat_replies_for_errors() {
    let dir = tempfile::tempdir().unwrap();
    freetime()
        .args(["say", "--calendar"])
        .arg(dir.path().join("nope.json"))
        .args(["freetime", "in", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("needs permission"))
        .stdout(predicate::str::contains("http://localhost:8080/connect"));

    freetime()
        .args(["say", "--calendar"])
        .arg(fixture("calendar.json"))
        .args(["freetime", "in", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("greater than 0"));
}

#[test]
fn say_calendar_lists_upcoming_events() {
    freetime()
        .args(["--now", "2024-03-05T00:00:00Z", "say", "--calendar"])
        .arg(fixture("calendar.json"))
        .arg("calendar")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "release night\n  Start: March 5, 2024 11:00 PM\n  End: March 6, 2024 1:00 AM",
        ))
        .stdout(predicate::str::contains("standup").not());
}

#[test]
fn say_create_event_appends_to_calendar() {
    let dir = tempfile::tempdir().unwrap();
    let calendar = writable_calendar(&dir);

    freetime()
        .args(["say", "--calendar"])
        .arg(&calendar)
        .args([
            "create", "event", "-start", "March", "7", "2024", "10:00", "-end", "March", "7",
            "2024", "11:00", "-title", "planning", "-timezone", "Europe/Berlin",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("successfully scheduled"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&calendar).unwrap()).unwrap();
    let events = saved["events"].as_array().unwrap();
    assert_eq!(events.len(), 4);
    let planning = events.iter().find(|e| e["summary"] == "planning").unwrap();
    assert_eq!(planning["start"], "2024-03-07T09:00:00Z");
    assert_eq!(planning["end"], "2024-03-07T10:00:00Z");

    freetime()
        .args(["--now", "2024-03-06T12:00:00Z", "say", "--calendar"])
        .arg(&calendar)
        .arg("calendar")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "planning\n  Start: March 7, 2024 9:00 AM",
        ));
}

#[test]
fn say_create_event_rejects_inverted_range() {
    let dir = tempfile::tempdir().unwrap();
    let calendar = writable_calendar(&dir);
    let before = std::fs::read_to_string(&calendar).unwrap();

    freetime()
        .args(["say", "--calendar"])
        .arg(&calendar)
        .args([
            "create", "event", "-start", "8", "March", "2024", "-end", "7", "March", "2024",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("start date occurs after the end date"));

    assert_eq!(std::fs::read_to_string(&calendar).unwrap(), before);
}

#[test]
fn say_verify_with_unknown_code() {
    freetime()
        .args(["say", "--calendar"])
        .arg(fixture("calendar.json"))
        .args(["verify", "0123456789abcdef"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Couldn't find that verification code"));
}

#[test]
fn no_subcommand_prints_usage() {
    freetime()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
