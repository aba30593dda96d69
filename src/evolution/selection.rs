use super::belief::{rank_descending, BeliefSpace};
use crate::core_types::{Chromosome, Gene};
use fastrand::Rng;

/// Mean pairwise fraction of differing genes among the first `sample`
/// individuals. 0.0 means clones, values near 0.875 are typical for random
/// chromosomes over 8 genes.
pub fn diversity(population: &[Chromosome], sample: usize) -> f64 {
    let k = population.len().min(sample);
    if k < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut comparisons = 0usize;
    for i in 0..k {
        for j in (i + 1)..k {
            total += gene_distance(&population[i], &population[j]);
            comparisons += 1;
        }
    }
    total / comparisons as f64
}

/// Fraction of positions at which `a` and `b` differ (missing genes count as different).
pub fn gene_distance(a: &[u8], b: &[u8]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }
    let shared_diff = a.iter().zip(b).filter(|(x, y)| x != y).count();
    let missing = a.len().abs_diff(b.len());
    (shared_diff + missing) as f64 / longest as f64
}

/// Index of the best of `size` distinct random contestants.
pub fn tournament(scores: &[f64], size: usize, rng: &mut Rng) -> Option<usize> {
    if scores.is_empty() {
        return None;
    }
    let contestants = rng.choose_multiple(0..scores.len(), size.clamp(1, scores.len()));
    contestants
        .into_iter()
        .reduce(|best, c| if scores[c] > scores[best] { c } else { best })
}

/// Parent pool: the top `elitism` by score, then tournament winners until
/// the pool holds `target` entries (at least one).
pub fn select_parents(
    scores: &[f64],
    elitism: usize,
    tournament_size: usize,
    target: usize,
    rng: &mut Rng,
) -> Vec<usize> {
    if scores.is_empty() {
        return Vec::new();
    }

    let mut parents: Vec<usize> = rank_descending(scores).into_iter().take(elitism).collect();
    let target = target.max(1);
    while parents.len() < target {
        match tournament(scores, tournament_size, rng) {
            Some(winner) => parents.push(winner),
            None => break,
        }
    }
    parents
}

/// Scores used by tournament selection.
///
/// The novelty bonus is `diversity_bonus` scaled by each individual's gene
/// distance from `reference`; the knowledge bonus is `knowledge_bonus` scaled
/// by the mean success rate the belief space assigns to its genes. Both are
/// per-individual so they can reorder the field.
pub fn adjusted_scores(
    scores: &[f64],
    population: &[Chromosome],
    reference: Option<&[Gene]>,
    diversity_bonus: f64,
    knowledge: Option<(&BeliefSpace, f64)>,
) -> Vec<f64> {
    scores
        .iter()
        .zip(population)
        .map(|(&fitness, chromosome)| {
            let novelty = reference.map_or(0.0, |r| gene_distance(chromosome, r));
            let informed = match knowledge {
                Some((belief, bonus)) if !chromosome.is_empty() => {
                    let rates: f64 = chromosome
                        .iter()
                        .map(|&g| belief.move_success_rate(g as usize))
                        .sum();
                    bonus * rates / chromosome.len() as f64
                }
                _ => 0.0,
            };
            fitness + diversity_bonus * novelty + informed
        })
        .collect()
}
