//! Corruption recovery tests for fitlog.
//!
//! These tests verify the system can handle:
//! - Corrupted record lines
//! - Corrupted profile files
//! - Missing data directories
//! - Concurrent writers

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::thread;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("fitlog"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

const VALID_MEAL: &str = r#"{"id":"0b6f2f3e-8d7c-4a51-b1d2-6c1f0a9e4d21","date":"2024-01-10","time":"12:00","meal_type":"lunch","foods":[{"name":"wrap","calories":540,"protein_grams":30,"carbs_grams":55,"fat_grams":20}],"total_calories":540,"total_protein":30,"total_carbs":55,"total_fat":20}"#;

#[test]
fn test_corrupted_meal_lines_are_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let mut file = fs::File::create(data_dir.join("meals.jsonl")).unwrap();
    writeln!(file, "{{ invalid json }}").unwrap();
    writeln!(file, "{}", VALID_MEAL).unwrap();
    writeln!(file, "{{\"id\": \"truncated").unwrap();
    drop(file);

    let output = cli()
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["summary", "--json", "--period", "day", "--date", "2024-01-10"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["summary"]["totals"]["calories_consumed"], 540);
}

#[test]
fn test_unknown_recurrence_tag_loads_and_only_matches_anchor() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let workout = r#"{"id":"9a1e5b0c-3f4d-4e2a-8b7c-1d2e3f4a5b6c","date":"2024-01-01","time":"07:00","exercise_type":"running","duration":30,"intensity":"medium","calories_burned":300,"recurring":true,"recurrence_type":"lunar"}"#;
    fs::write(data_dir.join("workouts.jsonl"), format!("{}\n", workout)).unwrap();

    let output = cli()
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["summary", "--json", "--period", "week", "--date", "2024-01-01"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["summary"]["totals"]["calories_burned"], 300);
    assert_eq!(json["summary"]["totals"]["workout_count"], 1);
}

#[test]
fn test_corrupted_profile_is_treated_as_missing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::write(data_dir.join("profile.json"), "{ invalid json }}}}").unwrap();

    // Summary still works without targets
    cli()
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["summary", "--period", "day", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Target:").not());

    // Saving a new profile replaces the corrupt one
    cli()
        .arg("--data-dir")
        .arg(&data_dir)
        .args([
            "profile", "set", "--age", "25", "--weight", "60", "--height", "165", "--sex",
            "female",
        ])
        .assert()
        .success();

    cli()
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Height:   165 cm"));
}

#[test]
fn test_missing_data_dir_reads_empty() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("does/not/exist");

    cli()
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["streak", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current streak: 0 days"));

    assert!(!data_dir.exists());
}

#[test]
fn test_concurrent_meal_logging() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                cli()
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .args([
                        "meal",
                        "add",
                        "--type",
                        "snack",
                        "--food",
                        &format!("bar {}:200:10:20:8", i),
                        "--date",
                        "2024-01-10",
                    ])
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    let contents = fs::read_to_string(data_dir.join("meals.jsonl")).unwrap();
    assert_eq!(contents.lines().count(), 5, "Expected 5 meals, got {}", contents.lines().count());
    for line in contents.lines() {
        assert!(serde_json::from_str::<serde_json::Value>(line).is_ok());
    }
}
