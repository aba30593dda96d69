//! Library entry points: the solver registry, the fault-catching call
//! boundary and the persistence record built from an outcome.

use crate::config::Config;
use crate::core_types::{Path, Position};
use crate::error::TourError;
use crate::evolution::{EvolutionProfile, EvolutionSolver};
use crate::search::{
    BacktrackOptions, BacktrackingSolver, GreedyWalk, RandomOrder, TableOrder, Warnsdorff,
};
use crate::solver::{NoProgress, ProgressObserver, SolveOutcome, SolveRequest, Solver};
use crate::verifier::verify_tour;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{info, warn};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    RandomWalk,
    OrderedWalk,
    Backtracking,
    Cultural,
}

pub type SolverFactory = fn(&Config) -> Box<dyn Solver>;

/// `(algorithm, level)` to a constructor for that variant.
#[derive(Clone)]
pub struct SolverRegistry {
    factories: BTreeMap<(Algorithm, u8), SolverFactory>,
}

impl Default for SolverRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Algorithm::RandomWalk, 0, random_walk);
        registry.register(Algorithm::OrderedWalk, 1, ordered_walk);
        registry.register(Algorithm::Backtracking, 2, plain_backtracking);
        registry.register(Algorithm::Backtracking, 3, lookahead_backtracking);
        registry.register(Algorithm::Backtracking, 4, warnsdorff_backtracking);
        registry.register(Algorithm::Cultural, 1, simple_ga);
        registry.register(Algorithm::Cultural, 2, enhanced_ga);
        registry.register(Algorithm::Cultural, 3, cultural_ga);
        registry.register(Algorithm::Cultural, 4, advanced_cultural_ga);
        registry
    }
}

impl SolverRegistry {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Adds or replaces the factory for `(algorithm, level)`.
    pub fn register(&mut self, algorithm: Algorithm, level: u8, factory: SolverFactory) {
        self.factories.insert((algorithm, level), factory);
    }

    pub fn get(&self, algorithm: Algorithm, level: u8) -> Option<SolverFactory> {
        self.factories.get(&(algorithm, level)).copied()
    }

    pub fn contains(&self, algorithm: Algorithm, level: u8) -> bool {
        self.factories.contains_key(&(algorithm, level))
    }

    /// Registered keys in `(algorithm, level)` order.
    pub fn keys(&self) -> impl Iterator<Item = (Algorithm, u8)> + '_ {
        self.factories.keys().copied()
    }
}

fn backtrack_options(config: &Config, isolation_lookahead: bool) -> BacktrackOptions {
    BacktrackOptions {
        isolation_lookahead,
        progress_interval: config.search.progress_every_calls,
    }
}

fn random_walk(_config: &Config) -> Box<dyn Solver> {
    Box::new(GreedyWalk::new(
        "random-walk",
        RandomOrder::new(fastrand::Rng::new()),
    ))
}

fn ordered_walk(_config: &Config) -> Box<dyn Solver> {
    Box::new(GreedyWalk::new("ordered-walk", TableOrder))
}

fn plain_backtracking(config: &Config) -> Box<dyn Solver> {
    Box::new(BacktrackingSolver::new(
        "backtracking",
        TableOrder,
        backtrack_options(config, false),
        config.search.timeout(),
    ))
}

fn lookahead_backtracking(config: &Config) -> Box<dyn Solver> {
    Box::new(BacktrackingSolver::new(
        "backtracking-lookahead",
        Warnsdorff,
        backtrack_options(config, true),
        config.search.timeout(),
    ))
}

fn warnsdorff_backtracking(config: &Config) -> Box<dyn Solver> {
    Box::new(BacktrackingSolver::new(
        "backtracking-warnsdorff",
        Warnsdorff,
        backtrack_options(config, false),
        config.search.timeout(),
    ))
}

fn evolution(profile: EvolutionProfile) -> Box<dyn Solver> {
    Box::new(EvolutionSolver::new(profile.name, profile))
}

fn simple_ga(config: &Config) -> Box<dyn Solver> {
    evolution(EvolutionProfile::simple(config))
}

fn enhanced_ga(config: &Config) -> Box<dyn Solver> {
    evolution(EvolutionProfile::enhanced(config))
}

fn cultural_ga(config: &Config) -> Box<dyn Solver> {
    evolution(EvolutionProfile::cultural(config))
}

fn advanced_cultural_ga(config: &Config) -> Box<dyn Solver> {
    evolution(EvolutionProfile::advanced(config))
}

/// Default entry point: Warnsdorff backtracking (level 4) with the default configuration.
pub fn solve(
    board_size: usize,
    start: Position,
    timeout: Option<Duration>,
    progress: &dyn ProgressObserver,
) -> SolveOutcome {
    let mut request = SolveRequest::new(board_size, start);
    request.timeout = timeout;
    solve_with(
        &SolverRegistry::default(),
        Algorithm::Backtracking,
        4,
        &request,
        &Config::default(),
        progress,
    )
}

/// Runs one registered variant. Never fails: unknown variants, invalid
/// requests and panics inside a solver all come back as failed outcomes with
/// an `error` stat. Every outcome carries `level` and `verified`.
pub fn solve_with(
    registry: &SolverRegistry,
    algorithm: Algorithm,
    level: u8,
    request: &SolveRequest,
    config: &Config,
    progress: &dyn ProgressObserver,
) -> SolveOutcome {
    let Some(factory) = registry.get(algorithm, level) else {
        let err = TourError::AlgorithmNotFound {
            algorithm: algorithm.to_string(),
            level,
        };
        warn!("{}", err);
        return SolveOutcome::failure(&err);
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut solver = factory(config);
        let name = solver.name().to_string();
        solver.solve(request, progress).map_err(|e| (name, e))
    }));

    let mut outcome = match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err((name, err))) => {
            warn!(solver = %name, "{}", err);
            let mut outcome = SolveOutcome::failure(&err);
            outcome.stats.insert("algorithm", name);
            outcome
        }
        Err(payload) => {
            let err = TourError::Fault(panic_message(payload.as_ref()));
            warn!("{}", err);
            SolveOutcome::failure(&err)
        }
    };

    let n = request.board_size;
    let verified = match verify_tour(&outcome.path, n, outcome.success) {
        Ok(()) => true,
        Err(violation) => {
            if outcome.success {
                warn!(%violation, "Solver claimed success on an invalid tour");
                outcome.success = false;
                outcome.stats.insert("error", violation.to_string());
            }
            false
        }
    };
    outcome.stats.insert("verified", verified);
    outcome.stats.insert("level", level as u64);

    info!(
        %algorithm,
        level,
        board_size = n,
        success = outcome.success,
        steps = outcome.path.len(),
        "Solve finished"
    );
    outcome
}

/// [`solve_with`] using the default registry and no progress reporting.
pub fn solve_default(algorithm: Algorithm, level: u8, request: &SolveRequest, config: &Config) -> SolveOutcome {
    solve_with(
        &SolverRegistry::default(),
        algorithm,
        level,
        request,
        config,
        &NoProgress,
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunResult {
    Success,
    Failure,
}

/// The row a caller persists for each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub algorithm: String,
    pub board_size: usize,
    pub execution_time: f64,
    pub steps: usize,
    pub result: RunResult,
    pub solution_path: Path,
    pub start_position: Position,
}

impl RunRecord {
    pub fn from_outcome(algorithm: impl Into<String>, request: &SolveRequest, outcome: &SolveOutcome) -> Self {
        Self {
            algorithm: algorithm.into(),
            board_size: request.board_size,
            execution_time: outcome.execution_time(),
            steps: outcome.path.len(),
            result: if outcome.success {
                RunResult::Success
            } else {
                RunResult::Failure
            },
            solution_path: outcome.path.clone(),
            start_position: request.start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TourResult;
    use strum::IntoEnumIterator;

    struct Exploding;

    impl Solver for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn solve(&mut self, _: &SolveRequest, _: &dyn ProgressObserver) -> TourResult<SolveOutcome> {
            panic!("board on fire")
        }
    }

    struct Liar;

    impl Solver for Liar {
        fn name(&self) -> &str {
            "liar"
        }

        fn solve(&mut self, request: &SolveRequest, _: &dyn ProgressObserver) -> TourResult<SolveOutcome> {
            Ok(SolveOutcome {
                success: true,
                path: vec![request.start; 3],
                stats: Default::default(),
            })
        }
    }

    #[test]
    fn test_algorithm_names_round_trip() {
        for algorithm in Algorithm::iter() {
            let parsed: Algorithm = algorithm.to_string().parse().unwrap();
            assert_eq!(parsed, algorithm);
        }
        assert_eq!(Algorithm::RandomWalk.to_string(), "random-walk");
    }

    #[test]
    fn test_default_registry_entries() {
        let registry = SolverRegistry::default();
        assert_eq!(registry.keys().count(), 9);
        assert!(registry.contains(Algorithm::Backtracking, 4));
        assert!(!registry.contains(Algorithm::Backtracking, 0));
    }

    #[test]
    fn test_missing_variant_is_structured_failure() {
        let request = SolveRequest::new(5, Position::new(0, 0));
        let outcome = solve_with(
            &SolverRegistry::empty(),
            Algorithm::Cultural,
            9,
            &request,
            &Config::default(),
            &NoProgress,
        );
        assert!(!outcome.success);
        assert_eq!(outcome.error(), Some("Solver not found: cultural Level 9"));
    }

    #[test]
    fn test_panics_become_faults() {
        let mut registry = SolverRegistry::empty();
        registry.register(Algorithm::Backtracking, 7, |_| Box::new(Exploding));
        let request = SolveRequest::new(5, Position::new(0, 0));
        let outcome = solve_with(&registry, Algorithm::Backtracking, 7, &request, &Config::default(), &NoProgress);
        assert!(!outcome.success);
        assert_eq!(outcome.error(), Some("Solver fault: board on fire"));
    }

    #[test]
    fn test_false_success_is_downgraded() {
        let mut registry = SolverRegistry::empty();
        registry.register(Algorithm::OrderedWalk, 1, |_| Box::new(Liar));
        let request = SolveRequest::new(5, Position::new(0, 0));
        let outcome = solve_with(&registry, Algorithm::OrderedWalk, 1, &request, &Config::default(), &NoProgress);
        assert!(!outcome.success);
        assert_eq!(outcome.stats.get("verified").and_then(|v| v.as_bool()), Some(false));
    }

    #[test]
    fn test_run_record_from_outcome() {
        let request = SolveRequest::new(5, Position::new(0, 0));
        let outcome = solve(5, Position::new(0, 0), None, &NoProgress);
        let record = RunRecord::from_outcome("backtracking", &request, &outcome);
        assert_eq!(record.result, RunResult::Success);
        assert_eq!(record.steps, 25);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"result\":\"SUCCESS\""));
        assert!(json.contains("\"start_position\":{\"x\":0,\"y\":0}"));
    }
}
