use super::belief::BeliefSpace;
use crate::core_types::{Chromosome, Gene};
use fastrand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct LocalSearchParams {
    /// Upper bound on improvement rounds.
    pub iterations: usize,
    /// Swap tries per round; reversals get half as many, belief replacements a third.
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalSearchOutcome {
    pub chromosome: Chromosome,
    pub fitness: f64,
    pub improved: bool,
}

/// Hill-climbs `chromosome` with gene swaps, segment reversals and (when a
/// belief space is supplied) belief-suggested gene replacement. A change is
/// kept only if `score` strictly improves. Stops after a round without
/// improvement or after `params.iterations` rounds.
pub fn improve<F>(
    chromosome: &[Gene],
    params: LocalSearchParams,
    belief: Option<&BeliefSpace>,
    rng: &mut Rng,
    mut score: F,
) -> LocalSearchOutcome
where
    F: FnMut(&[Gene]) -> f64,
{
    let len = chromosome.len();
    let mut best = chromosome.to_vec();
    let mut best_fitness = score(&best);
    let mut improved = false;

    let mut try_candidate = |candidate: Chromosome, best: &mut Chromosome, best_fitness: &mut f64| {
        let f = score(&candidate);
        if f > *best_fitness {
            *best_fitness = f;
            *best = candidate;
            true
        } else {
            false
        }
    };

    for _ in 0..params.iterations {
        let mut round_improved = false;

        // 1. Swaps of nearby genes
        if len >= 5 {
            for _ in 0..params.attempts {
                let i = rng.usize(1..=len - 4);
                let j = rng.usize(i + 2..=(i + 8).min(len - 1));
                let mut candidate = best.clone();
                candidate.swap(i, j);
                round_improved |= try_candidate(candidate, &mut best, &mut best_fitness);
            }
        }

        // 2. Segment reversals
        if len >= 6 {
            for _ in 0..params.attempts / 2 {
                let i = rng.usize(1..=len - 5);
                let j = rng.usize(i + 3..=(i + 10).min(len - 1));
                let mut candidate = best.clone();
                candidate[i..j].reverse();
                round_improved |= try_candidate(candidate, &mut best, &mut best_fitness);
            }
        }

        // 3. Belief-guided replacement
        if let Some(belief) = belief {
            if len > 0 {
                for _ in 0..params.attempts / 3 {
                    let pos = rng.usize(..len);
                    let mut candidate = best.clone();
                    candidate[pos] = belief.suggest_move(rng);
                    round_improved |= try_candidate(candidate, &mut best, &mut best_fitness);
                }
            }
        }

        improved |= round_improved;
        if !round_improved {
            break;
        }
    }

    LocalSearchOutcome {
        chromosome: best,
        fitness: best_fitness,
        improved,
    }
}
