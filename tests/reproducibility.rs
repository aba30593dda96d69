mod common;

use common::*;
use tourforge::api::{solve_default, Algorithm};
use tourforge::config::Config;
use tourforge::solver::SolveRequest;

#[test]
fn test_fixed_order_variants_are_deterministic() {
    let request = SolveRequest::new(6, ORIGIN);
    for (algorithm, level) in [
        (Algorithm::OrderedWalk, 1),
        (Algorithm::Backtracking, 3),
        (Algorithm::Backtracking, 4),
    ] {
        let a = solve_default(algorithm, level, &request, &Config::default());
        let b = solve_default(algorithm, level, &request, &Config::default());
        assert_eq!(a.path, b.path, "{} level {}", algorithm, level);
        assert_eq!(a.success, b.success);
    }
}

#[test]
fn test_seeded_random_walk_repeats() {
    let request = SolveRequest::new(8, ORIGIN).with_seed(1234);
    let a = solve_default(Algorithm::RandomWalk, 0, &request, &Config::default());
    let b = solve_default(Algorithm::RandomWalk, 0, &request, &Config::default());
    assert_eq!(a.path, b.path);
}

#[test]
fn test_unseeded_random_walks_vary() {
    let request = SolveRequest::new(8, ORIGIN);
    let first = solve_default(Algorithm::RandomWalk, 0, &request, &Config::default());
    let varied = (0..10).any(|_| {
        solve_default(Algorithm::RandomWalk, 0, &request, &Config::default()).path != first.path
    });
    assert!(varied, "Ten unseeded walks all matched the first one");
}

#[test]
fn test_seeded_evolution_repeats() {
    let config = quick_config(12, 8);
    let request = SolveRequest::new(5, ORIGIN).with_seed(77);
    for level in 1..=4 {
        let a = solve_default(Algorithm::Cultural, level, &request, &config);
        let b = solve_default(Algorithm::Cultural, level, &request, &config);
        assert_eq!(a.path, b.path, "level {}", level);
        assert_eq!(a.stats.get("best_fitness"), b.stats.get("best_fitness"));
    }
}
