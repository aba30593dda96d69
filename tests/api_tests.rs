mod common;

use common::*;
use std::time::Duration;
use tourforge::api::{solve, solve_with, Algorithm, RunRecord, RunResult, SolverRegistry};
use tourforge::config::Config;
use tourforge::core_types::Position;
use tourforge::search::{BacktrackOptions, BacktrackingSolver, Warnsdorff};
use tourforge::solver::{NoProgress, SolveRequest, Solver};

fn custom_warnsdorff(_config: &Config) -> Box<dyn Solver> {
    Box::new(BacktrackingSolver::new(
        "custom",
        Warnsdorff,
        BacktrackOptions::default(),
        None,
    ))
}

#[test]
fn test_unknown_variant_names_algorithm_and_level() {
    let request = SolveRequest::new(8, ORIGIN);
    let outcome = solve_with(
        &SolverRegistry::default(),
        Algorithm::Backtracking,
        9,
        &request,
        &Config::default(),
        &NoProgress,
    );
    assert!(!outcome.success);
    assert!(outcome.path.is_empty());
    assert_eq!(outcome.error(), Some("Solver not found: backtracking Level 9"));
}

#[test]
fn test_registered_variants_are_reachable() {
    let mut registry = SolverRegistry::default();
    registry.register(Algorithm::Backtracking, 9, custom_warnsdorff);

    let request = SolveRequest::new(5, ORIGIN);
    let outcome = solve_with(&registry, Algorithm::Backtracking, 9, &request, &Config::default(), &NoProgress);
    assert_complete_tour(&outcome, 5);
    assert_eq!(outcome.stats.get("algorithm").and_then(|v| v.as_str()), Some("custom"));
    assert_eq!(stat_u64(&outcome, "level"), Some(9));
}

#[test]
fn test_invalid_board_sizes_fail_cleanly() {
    for n in [0, tourforge::consts::MAX_BOARD_SIZE + 1] {
        let outcome = solve(n, ORIGIN, None, &NoProgress);
        assert!(!outcome.success);
        assert_eq!(outcome.error(), Some(format!("Invalid board size: {}", n).as_str()));
    }
}

#[test]
fn test_zero_timeout_stops_before_first_move() {
    let outcome = solve(8, ORIGIN, Some(Duration::ZERO), &NoProgress);
    assert!(!outcome.success);
    assert_eq!(stat_bool(&outcome, "timed_out"), Some(true));
    assert!(outcome.path.is_empty());
    assert_eq!(outcome.error(), Some("Timeout after 0 seconds"));
}

#[test]
fn test_evolution_ignores_timeout() {
    let request = SolveRequest::new(5, ORIGIN)
        .with_timeout(Duration::from_millis(1))
        .with_seed(9);
    let outcome = solve_with(
        &SolverRegistry::default(),
        Algorithm::Cultural,
        1,
        &request,
        &quick_config(10, 3),
        &NoProgress,
    );
    assert_eq!(stat_bool(&outcome, "timeout_ignored"), Some(true));
    assert_eq!(stat_u64(&outcome, "generations_run"), Some(3));
    for key in ["crossovers", "mutations", "good_patterns", "transitions_tracked"] {
        assert!(outcome.stats.contains(key), "missing {}", key);
    }
}

#[test]
fn test_run_record_for_failure() {
    let request = SolveRequest::new(4, ORIGIN);
    let outcome = solve(4, ORIGIN, None, &NoProgress);
    let record = RunRecord::from_outcome("backtracking level 4", &request, &outcome);
    assert_eq!(record.result, RunResult::Failure);
    assert_eq!(record.result.to_string(), "FAILURE");
    assert_eq!(record.steps, 0);
    assert_eq!(record.board_size, 4);
    assert_eq!(record.start_position, Position::new(0, 0));

    let json = serde_json::to_string(&record).unwrap();
    let back: RunRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}
