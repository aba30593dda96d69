use crate::board::{degree, Board};
use crate::core_types::Position;
use fastrand::Rng;

/// Decides the order in which candidate destinations are tried.
///
/// `order` is called with the current cell already marked on `board`.
/// `select` picks a single move for solvers that never backtrack.
pub trait MoveSelectionStrategy {
    fn name(&self) -> &'static str;

    fn order(&mut self, candidates: &mut Vec<Position>, board: &Board);

    fn select(&mut self, candidates: &[Position], board: &Board) -> Option<Position> {
        let mut ordered = candidates.to_vec();
        self.order(&mut ordered, board);
        ordered.first().copied()
    }

    /// Restarts any internal randomness from `seed`. Deterministic strategies ignore it.
    fn reseed(&mut self, _seed: u64) {}
}

/// Leaves candidates in delta-table order.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableOrder;

impl MoveSelectionStrategy for TableOrder {
    fn name(&self) -> &'static str {
        "table-order"
    }

    fn order(&mut self, _candidates: &mut Vec<Position>, _board: &Board) {}
}

/// Shuffles candidates with an owned RNG.
pub struct RandomOrder {
    rng: Rng,
}

impl RandomOrder {
    pub fn new(rng: Rng) -> Self {
        Self { rng }
    }
}

impl MoveSelectionStrategy for RandomOrder {
    fn name(&self) -> &'static str {
        "random"
    }

    fn order(&mut self, candidates: &mut Vec<Position>, _board: &Board) {
        self.rng.shuffle(candidates);
    }

    fn select(&mut self, candidates: &[Position], _board: &Board) -> Option<Position> {
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.usize(..candidates.len())])
    }

    fn reseed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }
}

/// Warnsdorff's rule: fewest onward moves first.
/// The sort is stable, so ties keep delta-table order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Warnsdorff;

impl MoveSelectionStrategy for Warnsdorff {
    fn name(&self) -> &'static str {
        "warnsdorff"
    }

    fn order(&mut self, candidates: &mut Vec<Position>, board: &Board) {
        candidates.sort_by_cached_key(|&c| degree(c, board));
    }
}
