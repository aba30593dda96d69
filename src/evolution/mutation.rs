use super::belief::BeliefSpace;
use super::initialization::random_gene;
use crate::consts::MOVE_COUNT;
use crate::core_types::Gene;
use fastrand::Rng;

/// Parameters of one mutation call.
#[derive(Debug, Clone, Copy)]
pub struct MutationPlan<'a> {
    /// Probability that the chromosome is touched at all.
    pub rate: f64,
    pub stagnation: f64,
    /// Set only once the belief space is allowed to guide mutation.
    pub belief: Option<&'a BeliefSpace>,
    pub belief_rate: f64,
    pub random_gene_rate: f64,
}

/// Base rate raised in proportion to stagnation, capped at 1.
pub fn adaptive_rate(base: f64, stagnation: f64, boost: f64) -> f64 {
    (base + stagnation * boost).clamp(0.0, 1.0)
}

/// Mutates 1-2 genes in place (1-3 when stagnation exceeds one half).
/// Returns whether anything was attempted.
pub fn mutate(chromosome: &mut [Gene], plan: &MutationPlan, rng: &mut Rng) -> bool {
    if chromosome.is_empty() || rng.f64() > plan.rate {
        return false;
    }

    let count = if plan.stagnation > 0.5 {
        rng.usize(1..=3)
    } else {
        rng.usize(1..=2)
    };

    for _ in 0..count {
        let pos = rng.usize(..chromosome.len());
        let prev = pos.checked_sub(1).map(|p| chromosome[p]);

        chromosome[pos] = match plan.belief {
            Some(belief) if rng.f64() < plan.belief_rate => {
                let suggested = belief.suggest_move(rng);
                match prev {
                    Some(p) if p != suggested => suggested,
                    _ => random_gene(rng),
                }
            }
            _ if rng.f64() < plan.random_gene_rate => random_gene(rng),
            _ => varied_gene(prev, rng),
        };
    }
    true
}

/// Highest of `random + index % 3` over every gene except `prev`.
fn varied_gene(prev: Option<Gene>, rng: &mut Rng) -> Gene {
    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;
    for g in 0..MOVE_COUNT as Gene {
        if prev == Some(g) {
            continue;
        }
        let score = rng.f64() + (g % 3) as f64;
        if score > best_score {
            best_score = score;
            best = Some(g);
        }
    }
    best.unwrap_or_else(|| random_gene(rng))
}
