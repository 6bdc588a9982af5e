//! Exit status and output of the `sa-floorplan` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn sa_floorplan(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sa-floorplan"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

/// Writes `content` to a per-test file in the system temp directory.
fn scratch_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sa-floorplan-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_missing_input_exits_with_one() {
    let output = sa_floorplan(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Provide input module file"));
}

#[test]
fn test_unreadable_file_exits_with_one() {
    let output = sa_floorplan(&["/nonexistent/sa-floorplan/modules.txt"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_malformed_line_exits_with_one() {
    let input = scratch_file("malformed.txt", "A 4 1\nB 6\n");
    let output = sa_floorplan(&[path_str(&input)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Line 2"));
}

#[test]
fn test_blank_line_exits_with_one() {
    let input = scratch_file("blank.txt", "A 4 1\n\nB 6 1.5\n");
    let output = sa_floorplan(&[path_str(&input)]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_successful_run_writes_reports() {
    let input = scratch_file("modules.txt", "A 4 1\nB 6 1.5\nC 8 0.5\n");
    let plot = input.with_file_name("plot_data.txt");
    let json = input.with_file_name("summary.json");

    let output = sa_floorplan(&[
        path_str(&input),
        "--seed",
        "3",
        "--run-multiplier",
        "10",
        "--max-temp",
        "100",
        "--min-temp",
        "1",
        "--cooling-rate",
        "0.5",
        "--plot-file",
        path_str(&plot),
        "--json",
        path_str(&json),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Initial random solution area: 28"));
    assert!(stdout.contains("Attempt #1: Cost Value = "));
    assert!(stdout.contains("Name\tWidth\tHeight\tX\tY"));
    assert!(stdout.contains("Best polish expression found:"));
    assert!(stdout.contains("Best area: "));

    let plot_text = fs::read_to_string(&plot).unwrap();
    assert_eq!(plot_text.lines().count(), 4);
    assert!(plot_text.starts_with("Name\tWidth\tHeight\tX\tY\n"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(summary["initial_cost"], 28.0);
    assert_eq!(summary["placements"].as_array().map(Vec::len), Some(3));
}
