use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestContext {
    dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> String {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path.to_str().unwrap().to_string()
    }
}

struct RunResult {
    code: i32,
    stdout: String,
}

fn run(args: &[&str]) -> RunResult {
    let output: Output = Command::new(env!("CARGO_BIN_EXE_tourforge"))
        .args(args)
        .output()
        .expect("Failed to execute binary");
    RunResult {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
    }
}

/// Reads a value out of the stats table: `| key | value |`.
fn stat(stdout: &str, key: &str) -> Option<String> {
    let re = Regex::new(&format!(r"\|\s*{}\s*\|\s*([^|]+?)\s*\|", regex::escape(key))).unwrap();
    re.captures(stdout).map(|c| c[1].to_string())
}

#[test]
fn test_cli_solve_five_by_five() {
    let res = run(&["solve", "-n", "5"]);
    assert_eq!(res.code, 0, "{}", res.stdout);
    assert!(res.stdout.contains("Result: SUCCESS"), "{}", res.stdout);
    assert!(res.stdout.contains("Steps: 25/25"));
    assert_eq!(stat(&res.stdout, "verified").as_deref(), Some("true"));
    assert!(Regex::new(r"Time: \d+\.\d{4}s").unwrap().is_match(&res.stdout));
}

#[test]
fn test_cli_invalid_start_reports_failure() {
    let res = run(&["solve", "-n", "8", "-s", "99,99"]);
    assert_eq!(res.code, 0);
    assert!(res.stdout.contains("Result: FAILURE"));
    assert!(res.stdout.contains("Steps: 0/64"));
    assert!(res.stdout.contains("Error: Invalid start position (99, 99) for a 8x8 board"));
}

#[test]
fn test_cli_unknown_level() {
    let res = run(&["solve", "-n", "5", "-l", "9"]);
    assert!(res.stdout.contains("Result: FAILURE"));
    assert!(res.stdout.contains("Error: Solver not found: backtracking Level 9"));
}

#[test]
fn test_cli_output_then_validate() {
    let ctx = TestContext::new();
    let record = ctx.path("run.json");
    let record = record.to_str().unwrap();

    let res = run(&["solve", "-n", "5", "-a", "backtracking", "-l", "4", "-o", record]);
    assert_eq!(res.code, 0);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(record).unwrap()).unwrap();
    assert_eq!(json["result"], "SUCCESS");
    assert_eq!(json["steps"], 25);
    assert_eq!(json["algorithm"], "backtracking level 4");

    let res = run(&["validate", record]);
    assert_eq!(res.code, 0, "{}", res.stdout);
    assert!(res.stdout.contains("VALID: 25 cells on a 5x5 board"));
}

#[test]
fn test_cli_validate_rejects_illegal_move() {
    let ctx = TestContext::new();
    let file = ctx.write("bad.json", r#"[{"x":0,"y":0},{"x":1,"y":2},{"x":2,"y":3}]"#);

    let res = run(&["validate", file.as_str(), "-n", "5", "--partial"]);
    assert_eq!(res.code, 2);
    assert!(res.stdout.contains("INVALID: Step 2: (1, 2) -> (2, 3) is not a knight move"));

    let good = ctx.write("good.json", r#"[{"x":0,"y":0},{"x":1,"y":2},{"x":2,"y":4}]"#);
    assert_eq!(run(&["validate", good.as_str(), "-n", "5", "--partial"]).code, 0);

    let res = run(&["validate", good.as_str(), "-n", "5"]);
    assert_eq!(res.code, 2);
    assert!(res.stdout.contains("INVALID: Tour covers 3 of 25 cells"));
}

#[test]
fn test_cli_validate_rejects_out_of_range_board_sizes() {
    let ctx = TestContext::new();
    let file = ctx.write("path.json", r#"[{"x":0,"y":0}]"#);
    for n in ["0", "5000"] {
        let res = run(&["validate", file.as_str(), "-n", n, "--partial"]);
        assert_eq!(res.code, 1, "-n {}", n);
        assert!(!res.stdout.contains("VALID"));
    }
}

#[test]
fn test_cli_validate_missing_file() {
    let ctx = TestContext::new();
    let missing = ctx.path("absent.json");
    assert_eq!(run(&["validate", missing.to_str().unwrap(), "-n", "5"]).code, 1);
}

#[test]
fn test_cli_config_file_and_flag_override() {
    let ctx = TestContext::new();
    let config = ctx.write(
        "quick.json",
        r#"{ "evolution": { "population_size": 6, "generations": 4 } }"#,
    );

    let base = ["solve", "-n", "5", "-a", "cultural", "-l", "4", "-S", "3", "--config", config.as_str()];
    let res = run(&base);
    assert_eq!(res.code, 0, "{}", res.stdout);
    assert_eq!(stat(&res.stdout, "generations_run").as_deref(), Some("4"));
    assert_eq!(stat(&res.stdout, "population_size").as_deref(), Some("6"));

    let mut overridden = base.to_vec();
    overridden.extend_from_slice(&["--generations", "2"]);
    let res = run(&overridden);
    assert_eq!(stat(&res.stdout, "generations_run").as_deref(), Some("2"));
    assert_eq!(stat(&res.stdout, "population_size").as_deref(), Some("6"));
}

#[test]
fn test_cli_rejects_bad_config() {
    let ctx = TestContext::new();
    let config = ctx.write("bad.json", r#"{ "evolution": { "mutation_rate": 3.0 } }"#);
    assert_eq!(run(&["solve", "-n", "5", "--config", config.as_str()]).code, 1);
}

#[test]
fn test_cli_compare_filtered() {
    let res = run(&["compare", "-n", "5", "-a", "ordered-walk", "-r", "2"]);
    assert_eq!(res.code, 0);
    let row = Regex::new(r"\|\s*ordered-walk\s*\|\s*1\s*\|\s*2\s*\|").unwrap();
    assert!(row.is_match(&res.stdout), "{}", res.stdout);
    assert!(!res.stdout.contains("backtracking"));
}

#[test]
fn test_cli_huge_board_size_fails_cleanly() {
    let huge = u64::MAX.to_string();
    let res = run(&["solve", "-n", huge.as_str()]);
    assert_eq!(res.code, 0, "{}", res.stdout);
    assert!(res.stdout.contains("Result: FAILURE"));
    assert!(res.stdout.contains(&format!("Steps: 0/{}", usize::MAX)));
    assert!(res.stdout.contains(&format!("Error: Invalid board size: {}", huge)));
}

#[test]
fn test_cli_compare_seed_wraps() {
    let seed = u64::MAX.to_string();
    let res = run(&["compare", "-n", "5", "-a", "random-walk", "-r", "3", "-S", seed.as_str()]);
    assert_eq!(res.code, 0, "{}", res.stdout);
    assert!(Regex::new(r"\|\s*random-walk\s*\|\s*0\s*\|\s*3\s*\|").unwrap().is_match(&res.stdout));
}

