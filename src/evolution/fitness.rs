use crate::board::{degree, is_knight_move, VisitedSet};
use crate::config::FitnessWeights;
use crate::core_types::Position;
use serde::Serialize;

/// The individual terms behind a fitness score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FitnessReport {
    pub unique: usize,
    pub legal_transitions: usize,
    /// Cells in the longest chain of consecutive legal moves.
    pub longest_legal_run: usize,
    pub average_mobility: f64,
    pub low_degree_visits: usize,
    pub revisits: usize,
    pub complete: bool,
    pub score: f64,
}

impl FitnessReport {
    pub fn coverage(&self, n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        self.unique as f64 / (n * n) as f64
    }
}

/// Scores `path` on an `n`×`n` board. Pure: the same inputs always give the same report.
pub fn evaluate(path: &[Position], n: usize, weights: &FitnessWeights) -> FitnessReport {
    if path.is_empty() {
        return FitnessReport::default();
    }

    let mut visited = VisitedSet::new(n);
    let mut unique = 0;
    let mut legal_transitions = 0;
    let mut longest_run = 1;
    let mut current_run = 1;
    let mut total_mobility = 0usize;
    let mut low_degree_visits = 0;

    for (i, &pos) in path.iter().enumerate() {
        if visited.insert(pos) {
            unique += 1;
        }

        let mobility = degree(pos, &visited);
        total_mobility += mobility;
        if mobility <= weights.low_degree_threshold {
            low_degree_visits += 1;
        }

        if i > 0 {
            if is_knight_move(path[i - 1], pos) {
                legal_transitions += 1;
                current_run += 1;
                longest_run = longest_run.max(current_run);
            } else {
                current_run = 1;
            }
        }
    }

    let revisits = path.len() - unique;
    let average_mobility = total_mobility as f64 / path.len() as f64;
    let complete = unique == n * n;

    let mut score = unique as f64 * weights.weight_unique
        + legal_transitions as f64 * weights.weight_legal
        + longest_run as f64 * weights.weight_run
        + average_mobility * weights.weight_mobility
        + low_degree_visits as f64 * weights.weight_low_degree
        - revisits as f64 * weights.penalty_revisit;
    if complete {
        score += weights.bonus_complete;
    }

    FitnessReport {
        unique,
        legal_transitions,
        longest_legal_run: longest_run,
        average_mobility,
        low_degree_visits,
        revisits,
        complete,
        score,
    }
}

pub fn fitness(path: &[Position], n: usize, weights: &FitnessWeights) -> f64 {
    evaluate(path, n, weights).score
}
