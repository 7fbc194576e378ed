//! Integration tests for the mplan binary.
//!
//! These tests verify end-to-end behavior including:
//! - Board creation and display
//! - Drag gestures (library drops, reorders, moves, day clones)
//! - Commit log and snapshot persistence
//! - CSV export and consistency checks

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("mplan"))
}

fn mplan(data_dir: &Path) -> Command {
    let mut cmd = cli();
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

fn init_board(data_dir: &Path, days: u32) {
    mplan(data_dir)
        .args(["init", "--name", "Block A", "--start", "2026-03-02"])
        .arg("--days")
        .arg(days.to_string())
        .assert()
        .success();
}

fn read_board(data_dir: &Path) -> Value {
    let contents = fs::read_to_string(data_dir.join("board.json")).expect("read board");
    serde_json::from_str(&contents).expect("parse board")
}

fn day_id(board: &Value, index: usize) -> String {
    board["days"][index]["id"].as_str().unwrap().to_string()
}

/// Item ids of a phase in position order
fn phase_ids(board: &Value, day: usize, phase: &str) -> Vec<String> {
    let mut items: Vec<&Value> = board["days"][day][phase]
        .as_array()
        .unwrap()
        .iter()
        .collect();
    items.sort_by_key(|item| item["position"].as_u64().unwrap());
    items
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

fn phase_exercises(board: &Value, day: usize, phase: &str) -> Vec<String> {
    let mut items: Vec<&Value> = board["days"][day][phase]
        .as_array()
        .unwrap()
        .iter()
        .collect();
    items.sort_by_key(|item| item["position"].as_u64().unwrap());
    items
        .iter()
        .map(|item| item["exercise_id"].as_str().unwrap().to_string())
        .collect()
}

fn commit_kinds(data_dir: &Path) -> Vec<String> {
    let path = data_dir.join("commits.jsonl");
    if !path.exists() {
        return Vec::new();
    }
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let record: Value = serde_json::from_str(l).expect("commit line is JSON");
            record["commit"]["kind"].as_str().unwrap().to_string()
        })
        .collect()
}

fn add_exercise(data_dir: &Path, exercise: &str, target: &str) {
    mplan(data_dir)
        .arg("drag")
        .arg(format!("library-{}", exercise))
        .arg(target)
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Drag-and-drop training plan board"));
}

#[test]
fn test_init_and_show() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 3);

    let board = read_board(data_dir);
    assert_eq!(board["name"], "Block A");
    assert_eq!(board["days"].as_array().unwrap().len(), 3);
    assert_eq!(board["days"][2]["day_number"], 3);
    assert_eq!(board["days"][2]["date"], "2026-03-04");

    mplan(data_dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Day 1  Mon 2026-03-02"))
        .stdout(predicate::str::contains(format!(
            "training-day-{}",
            day_id(&board, 0)
        )))
        .stdout(predicate::str::contains(format!("warmup-{}", day_id(&board, 1))));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 3);

    mplan(data_dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    mplan(data_dir)
        .args(["init", "--force", "--days", "2"])
        .assert()
        .success();
    assert_eq!(read_board(data_dir)["days"].as_array().unwrap().len(), 2);
}

#[test]
fn test_show_without_board_fails() {
    let temp_dir = setup_test_dir();
    mplan(temp_dir.path())
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No board found"));
}

#[test]
fn test_library_listing() {
    cli()
        .arg("library")
        .assert()
        .success()
        .stdout(predicate::str::contains("library-back_squat"))
        .stdout(predicate::str::contains("Couch Stretch"));
}

#[test]
fn test_library_drop_creates_and_commits() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 3);
    let day1 = day_id(&read_board(data_dir), 0);

    mplan(data_dir)
        .arg("drag")
        .arg("library-back_squat")
        .arg(format!("day-{}", day1))
        .args(["--sets", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Back Squat to day 1 main at #1"));

    let board = read_board(data_dir);
    assert_eq!(phase_exercises(&board, 0, "main"), vec!["back_squat"]);
    assert_eq!(board["days"][0]["main"][0]["config"]["sets"], 5);
    // Unset flags keep the library default
    assert_eq!(board["days"][0]["main"][0]["config"]["reps_min"], 5);
    assert_eq!(commit_kinds(data_dir), vec!["item_create"]);
}

#[test]
fn test_drag_within_phase_reorders() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 2);
    let day1 = day_id(&read_board(data_dir), 0);
    let zone = format!("main-{}", day1);

    add_exercise(data_dir, "back_squat", &zone);
    add_exercise(data_dir, "romanian_deadlift", &zone);
    add_exercise(data_dir, "walking_lunge", &zone);

    let ids = phase_ids(&read_board(data_dir), 0, "main");
    mplan(data_dir)
        .args(["drag", ids[2].as_str(), ids[0].as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Reordered day 1 main: Walking Lunge, Back Squat, Romanian Deadlift",
        ));

    let board = read_board(data_dir);
    assert_eq!(
        phase_ids(&board, 0, "main"),
        vec![ids[2].clone(), ids[0].clone(), ids[1].clone()]
    );
    assert_eq!(commit_kinds(data_dir).last().unwrap(), "reorder");
}

#[test]
fn test_drag_across_days_with_phase_change() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 2);
    let board = read_board(data_dir);
    let (day1, day2) = (day_id(&board, 0), day_id(&board, 1));

    add_exercise(data_dir, "hip_cars", &format!("main-{}", day1));
    add_exercise(data_dir, "band_pull_apart", &format!("warmup-{}", day2));
    let item = phase_ids(&read_board(data_dir), 0, "main")[0].clone();

    mplan(data_dir)
        .args(["drag", item.as_str()])
        .arg(format!("warmup-{}", day2))
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved Hip CARs to day 2 warmup at #2"));

    let board = read_board(data_dir);
    assert!(phase_ids(&board, 0, "main").is_empty());
    assert_eq!(
        phase_exercises(&board, 1, "warmup"),
        vec!["band_pull_apart", "hip_cars"]
    );
    assert_eq!(board["days"][1]["warmup"][1]["day_id"], day2.as_str());
    assert_eq!(commit_kinds(data_dir).last().unwrap(), "move");
}

#[test]
fn test_drag_day_clones_after_target() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 3);
    let board = read_board(data_dir);
    let (day1, day2, day3) = (day_id(&board, 0), day_id(&board, 1), day_id(&board, 2));
    add_exercise(data_dir, "bench_press", &format!("main-{}", day1));

    mplan(data_dir)
        .arg("drag")
        .arg(format!("training-day-{}", day1))
        .arg(format!("day-{}", day2))
        .assert()
        .success()
        .stdout(predicate::str::contains("Inserted 1 day(s) as day 3"));

    let board = read_board(data_dir);
    assert_eq!(board["days"].as_array().unwrap().len(), 4);
    assert_eq!(phase_exercises(&board, 2, "main"), vec!["bench_press"]);
    assert_ne!(board["days"][2]["id"], day1.as_str());
    assert_eq!(board["days"][3]["id"], day3.as_str());
    assert_eq!(board["days"][3]["day_number"], 4);
    assert_eq!(board["days"][3]["date"], "2026-03-05");
    assert_eq!(commit_kinds(data_dir).last().unwrap(), "day_insert");
}

#[test]
fn test_stale_drop_changes_nothing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 2);
    let day1 = day_id(&read_board(data_dir), 0);
    add_exercise(data_dir, "pullup", &format!("main-{}", day1));

    let before = read_board(data_dir);
    let item = phase_ids(&before, 0, "main")[0].clone();

    mplan(data_dir)
        .args(["drag", item.as_str(), "4f1c2b3a-0000-4000-8000-000000000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing changed"));

    mplan(data_dir)
        .args(["drag", "library-not_an_exercise"])
        .arg(format!("day-{}", day1))
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to drag"));

    assert_eq!(read_board(data_dir), before);
    assert_eq!(commit_kinds(data_dir), vec!["item_create"]);
}

#[test]
fn test_rest_day_rejects_exercises() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 2);

    mplan(data_dir)
        .args(["add-day", "Off", "--rest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added day 3 (Off)"));

    let rest = day_id(&read_board(data_dir), 2);
    mplan(data_dir)
        .arg("drag")
        .arg("library-easy_run")
        .arg(format!("day-{}", rest))
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing changed"));

    mplan(data_dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("rest day"));
}

#[test]
fn test_reorder_command_rejects_partial_order() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 1);
    let day1 = day_id(&read_board(data_dir), 0);
    add_exercise(data_dir, "kb_swing", &format!("main-{}", day1));
    add_exercise(data_dir, "overhead_press", &format!("main-{}", day1));
    let ids = phase_ids(&read_board(data_dir), 0, "main");

    mplan(data_dir)
        .args(["reorder", "1", "main", ids[0].as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PermutationMismatch"));

    mplan(data_dir)
        .args(["reorder", "1", "main", ids[1].as_str(), ids[0].as_str()])
        .assert()
        .success();
    assert_eq!(
        phase_ids(&read_board(data_dir), 0, "main"),
        vec![ids[1].clone(), ids[0].clone()]
    );
}

#[test]
fn test_clone_remove_and_duplicate() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 2);
    let day1 = day_id(&read_board(data_dir), 0);
    add_exercise(data_dir, "rower_intervals", &format!("cooldown-{}", day1));

    mplan(data_dir)
        .args(["clone-days", "1", "--at", "0"])
        .assert()
        .success();
    let board = read_board(data_dir);
    assert_eq!(board["days"].as_array().unwrap().len(), 3);
    assert_eq!(board["days"][1]["id"], day1.as_str());
    assert_eq!(board["days"][1]["day_number"], 2);

    let item = phase_ids(&board, 1, "cooldown")[0].clone();
    mplan(data_dir).args(["duplicate", item.as_str()]).assert().success();
    assert_eq!(phase_ids(&read_board(data_dir), 1, "cooldown").len(), 2);

    mplan(data_dir).args(["remove-item", item.as_str()]).assert().success();
    mplan(data_dir)
        .args(["remove-day", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed day 1"));

    let board = read_board(data_dir);
    assert_eq!(board["days"].as_array().unwrap().len(), 2);
    assert_eq!(board["days"][0]["id"], day1.as_str());
    assert_eq!(board["days"][0]["day_number"], 1);
    assert_eq!(board["days"][0]["date"], "2026-03-02");
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 2);
    let day1 = day_id(&read_board(data_dir), 0);
    add_exercise(data_dir, "back_squat", &format!("main-{}", day1));

    let csv_path = data_dir.join("out").join("plan.csv");
    mplan(data_dir)
        .arg("export")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 rows"));

    let contents = fs::read_to_string(&csv_path).unwrap();
    let mut lines = contents.lines();
    assert!(lines.next().unwrap().starts_with("day_number,date,day_name"));
    assert!(contents.contains("Back Squat"));
}

#[test]
fn test_check_reports_problems() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 2);
    let day1 = day_id(&read_board(data_dir), 0);
    add_exercise(data_dir, "back_squat", &format!("main-{}", day1));

    mplan(data_dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Board is consistent"));

    let mut board = read_board(data_dir);
    board["days"][0]["main"][0]["position"] = Value::from(4);
    board["days"][1]["day_number"] = Value::from(9);
    fs::write(data_dir.join("board.json"), board.to_string()).unwrap();

    mplan(data_dir)
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("problem(s)"));
}

#[test]
fn test_capacity_limit() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    init_board(data_dir, 14);

    mplan(data_dir)
        .args(["add-day", "Extra"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CapacityExceeded"));
    assert_eq!(read_board(data_dir)["days"].as_array().unwrap().len(), 14);
}

#[test]
fn test_corrupted_board_is_reported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    fs::write(data_dir.join("board.json"), "{ invalid json }}}}").unwrap();

    mplan(data_dir)
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Json"));

    // The corrupted file is left for manual recovery
    assert_eq!(
        fs::read_to_string(data_dir.join("board.json")).unwrap(),
        "{ invalid json }}}}"
    );
}
