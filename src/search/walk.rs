use super::strategy::MoveSelectionStrategy;
use crate::board::{legal_moves, Board};
use crate::core_types::{Path, Position};
use crate::error::TourResult;
use crate::solver::{ProgressObserver, SolveOutcome, SolveRequest, Solver, Stats};
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct WalkReport {
    pub path: Path,
    pub total_moves: u64,
    pub dead_ends_hit: u64,
}

impl WalkReport {
    pub fn coverage_percent(&self, n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        100.0 * self.path.len() as f64 / (n * n) as f64
    }
}

/// A single forward pass: one move per step, chosen by the strategy, no undo.
/// Stops at the first cell with no legal continuation.
pub struct GreedyWalk<S: MoveSelectionStrategy> {
    label: String,
    strategy: S,
}

impl<S: MoveSelectionStrategy> GreedyWalk<S> {
    pub fn new(label: impl Into<String>, strategy: S) -> Self {
        Self {
            label: label.into(),
            strategy,
        }
    }

    pub fn walk(&mut self, n: usize, start: Position) -> WalkReport {
        let mut board = Board::new(n);
        let mut path = Vec::with_capacity(n * n);
        let mut dead_ends_hit = 0;

        let mut current = start;
        board.mark(current, 0);
        path.push(current);

        while path.len() < n * n {
            let moves = legal_moves(current, &board);
            let Some(next) = self.strategy.select(&moves, &board) else {
                dead_ends_hit += 1;
                break;
            };
            board.mark(next, path.len());
            path.push(next);
            current = next;
        }

        WalkReport {
            total_moves: path.len() as u64,
            path,
            dead_ends_hit,
        }
    }
}

impl<S: MoveSelectionStrategy> Solver for GreedyWalk<S> {
    fn name(&self) -> &str {
        &self.label
    }

    fn solve(
        &mut self,
        request: &SolveRequest,
        progress: &dyn ProgressObserver,
    ) -> TourResult<SolveOutcome> {
        request.validate()?;
        if let Some(seed) = request.seed {
            self.strategy.reseed(seed);
        }

        let started = Instant::now();
        let n = request.board_size;
        let report = self.walk(n, request.start);
        let coverage = report.coverage_percent(n);
        progress.on_progress(100.0, &format!("Walk ended at {:.1}% coverage", coverage));

        debug!(
            "{} walk from {}: {} cells, {} dead ends",
            self.strategy.name(),
            request.start,
            report.path.len(),
            report.dead_ends_hit
        );

        let stats = Stats::new()
            .with("algorithm", self.label.as_str())
            .with("strategy", self.strategy.name())
            .with("execution_time", started.elapsed().as_secs_f64())
            .with("total_moves", report.total_moves)
            .with("dead_ends_hit", report.dead_ends_hit)
            .with("coverage_percent", coverage)
            .with("solution_length", report.path.len());

        Ok(SolveOutcome {
            success: report.path.len() == n * n,
            path: report.path,
            stats,
        })
    }
}
