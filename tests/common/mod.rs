#![allow(dead_code)]

use std::collections::HashSet;
use tourforge::board::is_knight_move;
use tourforge::config::Config;
use tourforge::core_types::Position;
use tourforge::solver::{SolveOutcome, StatValue};

pub const ORIGIN: Position = Position::new(0, 0);

/// Checks the tour invariants directly, without going through the verifier.
pub fn assert_structurally_valid(path: &[Position], n: usize) {
    let n = n as i32;
    assert!(
        path.iter().all(|p| p.x >= 0 && p.y >= 0 && p.x < n && p.y < n),
        "Path leaves the board: {:?}",
        path
    );
    let distinct: HashSet<_> = path.iter().collect();
    assert_eq!(distinct.len(), path.len(), "Path revisits a cell");
    for w in path.windows(2) {
        assert!(is_knight_move(w[0], w[1]), "{} -> {} is not a knight move", w[0], w[1]);
    }
}

pub fn assert_complete_tour(outcome: &SolveOutcome, n: usize) {
    assert!(outcome.success, "Expected success, got {:?}", outcome.stats);
    assert_eq!(outcome.path.len(), n * n);
    assert_structurally_valid(&outcome.path, n);
}

pub fn stat_u64(outcome: &SolveOutcome, key: &str) -> Option<u64> {
    outcome.stats.get(key).and_then(StatValue::as_u64)
}

pub fn stat_bool(outcome: &SolveOutcome, key: &str) -> Option<bool> {
    outcome.stats.get(key).and_then(StatValue::as_bool)
}

/// A configuration small enough for evolutionary tests to finish quickly.
pub fn quick_config(population: usize, generations: usize) -> Config {
    let mut config = Config::default();
    config.evolution.population_size = population;
    config.evolution.generations = generations;
    config
}
