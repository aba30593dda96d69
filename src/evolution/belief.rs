//! Knowledge accumulated across generations of one evolutionary run.
//!
//! The belief space is updated once per generation from the best and worst
//! individuals and then read by the decoder, mutation, crossover and local
//! search. It never outlives the run that created it.

use crate::config::BeliefParams;
use crate::consts::{MOVE_COUNT, NEUTRAL_DIFFICULTY, NEUTRAL_MOVE_RATE};
use crate::core_types::{Chromosome, Gene, Path, Position};
use fastrand::Rng;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub type Transition = (Position, Position);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PositionStats {
    pub visits: u64,
    pub successes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransitionQuality {
    pub success: u64,
    pub failure: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EliteRecord {
    pub chromosome: Chromosome,
    pub fitness: f64,
    pub path: Path,
}

/// Three consecutive cells taken from a high-coverage path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoodPattern {
    pub cells: [Position; 3],
    pub fitness: f64,
}

#[derive(Debug, Clone)]
pub struct BeliefSpace {
    params: BeliefParams,
    n: usize,
    generation_count: usize,

    move_usage: [u64; MOVE_COUNT],
    move_success: [u64; MOVE_COUNT],
    positions: Vec<PositionStats>,
    transitions: HashMap<Transition, TransitionQuality>,
    dangerous: HashSet<Transition>,

    elites: Vec<EliteRecord>,
    patterns: Vec<GoodPattern>,

    stagnation_counter: u32,
    last_best_fitness: f64,
}

impl BeliefSpace {
    pub fn new(n: usize, params: BeliefParams) -> Self {
        Self {
            params,
            n,
            generation_count: 0,
            move_usage: [0; MOVE_COUNT],
            move_success: [0; MOVE_COUNT],
            positions: vec![PositionStats::default(); n * n],
            transitions: HashMap::new(),
            dangerous: HashSet::new(),
            elites: Vec::new(),
            patterns: Vec::new(),
            stagnation_counter: 0,
            last_best_fitness: 0.0,
        }
    }

    pub fn board_size(&self) -> usize {
        self.n
    }

    pub fn params(&self) -> &BeliefParams {
        &self.params
    }

    /// Learns from one evaluated generation.
    ///
    /// The three slices are parallel: `fitness_scores[i]` and `decoded_paths[i]`
    /// belong to `population[i]`.
    pub fn update(
        &mut self,
        population: &[Chromosome],
        fitness_scores: &[f64],
        decoded_paths: &[Path],
    ) {
        self.generation_count += 1;

        let len = population
            .len()
            .min(fitness_scores.len())
            .min(decoded_paths.len());
        if len == 0 {
            return;
        }

        let ranked = rank_descending(&fitness_scores[..len]);
        let area = (self.n * self.n) as f64;
        let success_threshold = self.params.success_fitness_multiple * area;

        // 1. Elite archive
        self.elites = ranked
            .iter()
            .take(self.params.elite_archive_size)
            .map(|&i| EliteRecord {
                chromosome: population[i].clone(),
                fitness: fitness_scores[i],
                path: decoded_paths[i].clone(),
            })
            .collect();

        // 2. Learn from the top performers
        let top_count = fraction_of(len, self.params.top_fraction);
        for &i in ranked.iter().take(top_count) {
            let fitness = fitness_scores[i];
            let path = &decoded_paths[i];
            let successful = fitness > success_threshold;

            for &gene in &population[i] {
                let g = gene as usize;
                if g < MOVE_COUNT {
                    self.move_usage[g] += 1;
                    if successful {
                        self.move_success[g] += 1;
                    }
                }
            }

            let covered = path.len() as f64 >= area * self.params.position_success_coverage;
            for &pos in path {
                self.record_visit(pos, covered);
            }

            for w in path.windows(2) {
                let quality = self.transitions.entry((w[0], w[1])).or_default();
                if successful {
                    quality.success += 1;
                } else {
                    quality.failure += 1;
                }
            }

            if path.len() as f64 >= area * self.params.pattern_coverage {
                for w in path.windows(3) {
                    let cells = [w[0], w[1], w[2]];
                    if !self.patterns.iter().any(|p| p.cells == cells) {
                        self.patterns.push(GoodPattern { cells, fitness });
                    }
                }
            }
        }

        self.patterns
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        self.patterns.truncate(self.params.pattern_archive_size);

        // 3. Learn from the worst performers
        let bottom_count = fraction_of(len, self.params.bottom_fraction);
        for &i in ranked.iter().rev().take(bottom_count) {
            let path = &decoded_paths[i];
            if (path.len() as f64) < area * self.params.danger_coverage {
                for w in path.windows(2) {
                    self.dangerous.insert((w[0], w[1]));
                }
            }
        }

        // 4. Stagnation
        let best = fitness_scores[ranked[0]];
        if (best - self.last_best_fitness).abs() < self.params.stagnation_epsilon {
            self.stagnation_counter += 1;
        } else {
            self.stagnation_counter = self.stagnation_counter.saturating_sub(1);
        }
        self.last_best_fitness = best;
    }

    /// Registers one visit of `pos`; off-board positions are ignored.
    pub fn record_visit(&mut self, pos: Position, success: bool) {
        if let Some(stats) = pos.index(self.n).and_then(|i| self.positions.get_mut(i)) {
            stats.visits += 1;
            if success {
                stats.successes += 1;
            }
        }
    }

    /// `1 - successes / visits`, or the neutral 0.5 for a cell never seen.
    pub fn get_position_difficulty(&self, pos: Position) -> f64 {
        match pos.index(self.n).and_then(|i| self.positions.get(i)) {
            Some(s) if s.visits > 0 => 1.0 - s.successes as f64 / s.visits as f64,
            _ => NEUTRAL_DIFFICULTY,
        }
    }

    pub fn position_stats(&self, pos: Position) -> PositionStats {
        pos.index(self.n)
            .and_then(|i| self.positions.get(i).copied())
            .unwrap_or_default()
    }

    pub fn move_success_rate(&self, move_index: usize) -> f64 {
        match self.move_usage.get(move_index) {
            Some(&usage) if usage > 0 => self.move_success[move_index] as f64 / usage as f64,
            _ => NEUTRAL_MOVE_RATE,
        }
    }

    pub fn move_usage(&self, move_index: usize) -> u64 {
        self.move_usage.get(move_index).copied().unwrap_or(0)
    }

    /// A gene biased toward historically successful moves.
    ///
    /// Uniform before the warm-up ends; afterwards the best-scoring index,
    /// except for an `exploration_rate` chance of a uniform pick.
    pub fn suggest_move(&self, rng: &mut Rng) -> Gene {
        if self.generation_count < self.params.warmup_generations {
            return rng.u8(0..MOVE_COUNT as u8);
        }

        let total_usage = self.move_usage.iter().sum::<u64>().max(1) as f64;
        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;
        for i in 0..MOVE_COUNT {
            let share = self.move_usage[i] as f64 / total_usage;
            let score = self.params.success_weight * self.move_success_rate(i)
                + self.params.usage_weight * share;
            if score > best_score {
                best_score = score;
                best_index = i;
            }
        }

        if rng.f64() < self.params.exploration_rate {
            return rng.u8(0..MOVE_COUNT as u8);
        }
        best_index as Gene
    }

    /// Optimistic for transitions never observed.
    pub fn is_good_transition(&self, from: Position, to: Position) -> bool {
        let key = (from, to);
        if self.dangerous.contains(&key) {
            return false;
        }
        match self.transitions.get(&key) {
            Some(q) => q.success > q.failure,
            None => true,
        }
    }

    pub fn stagnation_level(&self) -> f64 {
        if self.params.stagnation_horizon <= 0.0 {
            return 1.0;
        }
        (self.stagnation_counter as f64 / self.params.stagnation_horizon).min(1.0)
    }

    pub fn stagnation_counter(&self) -> u32 {
        self.stagnation_counter
    }

    pub fn is_mature(&self, threshold: usize) -> bool {
        self.generation_count >= threshold
    }

    pub fn generation_count(&self) -> usize {
        self.generation_count
    }

    pub fn elites(&self) -> &[EliteRecord] {
        &self.elites
    }

    pub fn patterns(&self) -> &[GoodPattern] {
        &self.patterns
    }

    pub fn transitions_tracked(&self) -> usize {
        self.transitions.len()
    }

    pub fn transition_quality(&self, from: Position, to: Position) -> Option<TransitionQuality> {
        self.transitions.get(&(from, to)).copied()
    }

    pub fn dangerous_count(&self) -> usize {
        self.dangerous.len()
    }
}

/// Indices ordered by descending score; equal scores keep their original order.
pub fn rank_descending(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// `floor(len * fraction)`, but never less than one (or more than `len`).
fn fraction_of(len: usize, fraction: f64) -> usize {
    ((len as f64 * fraction).floor() as usize).clamp(1, len.max(1))
}
