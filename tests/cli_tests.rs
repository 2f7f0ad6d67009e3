use predicates::prelude::*;
mod test_env;
use test_env::TestHome;

fn stage_labels(board: &serde_json::Value) -> Vec<String> {
    board
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["label"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Stages
// =============================================================================

#[test]
fn test_empty_board_lists_hint() {
    let home = TestHome::new();

    home.cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("No stages"));
}

#[test]
fn test_stage_add_prepends_and_persists() {
    let home = TestHome::new();

    home.cmd().args(["stage", "add", "Done"]).assert().success()
        .stdout(predicate::str::contains("Created stage 1: Done"));
    home.cmd().args(["stage", "add", "--color", "#FFCC00", "To", "do"]).assert().success();

    let board = home.board_json();
    assert_eq!(stage_labels(&board), vec!["To do", "Done"]);
    assert_eq!(board[0]["order"], 0);
    assert_eq!(board[1]["order"], 1);
    assert_eq!(board[0]["color"], "ffcc00");
    assert_eq!(board[1]["color"], "ffffff");
}

#[test]
fn test_stage_add_blank_label_is_user_error() {
    let home = TestHome::new();

    home.cmd().args(["stage", "add", "   "]).assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("label cannot be empty"));

    assert!(home.board_json().as_array().unwrap().is_empty());
}

#[test]
fn test_stage_add_invalid_color_is_user_error() {
    let home = TestHome::new();

    home.cmd().args(["stage", "add", "--color", "purple", "Review"]).assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid color"));
}

#[test]
fn test_long_label_is_truncated_to_255() {
    let home = TestHome::new();
    let long_label = "a".repeat(300);

    home.cmd().args(["stage", "add", long_label.as_str()]).assert().success();

    let board = home.board_json();
    assert_eq!(board[0]["label"].as_str().unwrap().chars().count(), 255);
}

#[test]
fn test_stage_move_reorders() {
    let home = TestHome::new();
    for label in ["C", "B", "A"] {
        home.run_ok(&["stage", "add", label]);
    }

    home.cmd().args(["stage", "move", "1", "3"]).assert().success();

    let board = home.board_json();
    assert_eq!(stage_labels(&board), vec!["B", "C", "A"]);
    for (idx, stage) in board.as_array().unwrap().iter().enumerate() {
        assert_eq!(stage["order"], idx as i64);
    }
}

#[test]
fn test_stage_move_rejects_bad_position() {
    let home = TestHome::new();
    home.run_ok(&["stage", "add", "Only"]);

    home.cmd().args(["stage", "move", "1", "2"]).assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid stage position"));
    home.cmd().args(["stage", "move", "1", "0"]).assert()
        .failure()
        .code(1);
}

#[test]
fn test_stage_remove_renumbers() {
    let home = TestHome::new();
    for label in ["C", "B", "A"] {
        home.run_ok(&["stage", "add", label]);
    }

    home.cmd().args(["stage", "remove", "2"]).assert().success()
        .stdout(predicate::str::contains("Removed stage: B"));

    let board = home.board_json();
    assert_eq!(stage_labels(&board), vec!["A", "C"]);
    assert_eq!(board[1]["order"], 1);
}

#[test]
fn test_stage_color_by_id_prefix() {
    let home = TestHome::new();
    home.run_ok(&["stage", "add", "Review"]);
    let id = home.board_json()[0]["id"].as_str().unwrap().to_string();

    home.cmd().args(["stage", "color", &id[..8], "00FF00"]).assert().success();

    assert_eq!(home.board_json()[0]["color"], "00ff00");
}

#[test]
fn test_unknown_stage_is_user_error() {
    let home = TestHome::new();

    home.cmd().args(["stage", "remove", "4"]).assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("stage not found"));
}

// =============================================================================
// Tasks
// =============================================================================

#[test]
fn test_task_add_and_done() {
    let home = TestHome::new();
    home.run_ok(&["stage", "add", "Todo"]);

    home.cmd()
        .args(["task", "add", "1", "-d", "two litres", "--date", "2026-03-01T09:30", "Buy", "milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task: Buy milk"));

    let board = home.board_json();
    let task = &board[0]["tasks"][0];
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["description"], "two litres");
    assert_eq!(task["isDone"], false);

    home.cmd().args(["task", "done", "1", "1"]).assert().success();
    assert_eq!(home.board_json()[0]["tasks"][0]["isDone"], true);

    home.cmd().args(["task", "undone", "1", "1"]).assert().success();
    assert_eq!(home.board_json()[0]["tasks"][0]["isDone"], false);

    home.cmd().args(["list"]).assert().success()
        .stdout(predicate::str::contains("[ ] Buy milk"))
        .stdout(predicate::str::contains("2026-03-01 09:30"));
}

#[test]
fn test_task_edit_and_remove() {
    let home = TestHome::new();
    home.run_ok(&["stage", "add", "Todo"]);
    home.run_ok(&["task", "add", "1", "First"]);
    home.run_ok(&["task", "add", "1", "Second"]);

    home.cmd().args(["task", "edit", "1", "2", "--title", "Second, renamed"]).assert().success();
    home.cmd().args(["task", "remove", "1", "1"]).assert().success();

    let board = home.board_json();
    let tasks = board[0]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Second, renamed");
}

#[test]
fn test_task_edit_without_changes_is_user_error() {
    let home = TestHome::new();
    home.run_ok(&["stage", "add", "Todo"]);
    home.run_ok(&["task", "add", "1", "First"]);

    home.cmd().args(["task", "edit", "1", "1"]).assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Nothing to change"));
}

#[test]
fn test_task_add_bad_date_is_user_error() {
    let home = TestHome::new();
    home.run_ok(&["stage", "add", "Todo"]);

    home.cmd().args(["task", "add", "1", "--date", "someday", "Later"]).assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unsupported date expression"));
}

#[test]
fn test_long_description_is_truncated_to_1024() {
    let home = TestHome::new();
    home.run_ok(&["stage", "add", "Todo"]);
    let description = "d".repeat(2000);

    home.cmd().args(["task", "add", "1", "-d", description.as_str(), "Long"]).assert().success();

    let board = home.board_json();
    assert_eq!(board[0]["tasks"][0]["description"].as_str().unwrap().len(), 1024);
}

// =============================================================================
// Storage
// =============================================================================

#[test]
fn test_malformed_record_is_skipped() {
    let home = TestHome::new();
    home.run_ok(&["stage", "add", "Good"]);

    let conn = rusqlite::Connection::open(&home.db_path).unwrap();
    conn.execute(
        "INSERT INTO records (key, value) VALUES ('todolistbroken', '{oops')",
        [],
    )
    .unwrap();
    drop(conn);

    let board = home.board_json();
    assert_eq!(stage_labels(&board), vec!["Good"]);
}

#[test]
fn test_records_are_keyed_by_stage_id() {
    let home = TestHome::new();
    home.run_ok(&["stage", "add", "Todo"]);
    let id = home.board_json()[0]["id"].as_str().unwrap().to_string();

    let conn = rusqlite::Connection::open(&home.db_path).unwrap();
    let value: String = conn
        .query_row(
            "SELECT value FROM records WHERE key = ?1",
            [format!("todolist{}", id)],
            |row| row.get(0),
        )
        .unwrap();
    let record: serde_json::Value = serde_json::from_str(&value).unwrap();
    assert_eq!(record["label"], "Todo");
    assert!(record["tasks"].as_array().unwrap().is_empty());
}
