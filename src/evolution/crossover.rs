use super::initialization::{random_gene, random_gene_except};
use crate::consts::MOVE_COUNT;
use crate::core_types::{Chromosome, Gene};
use fastrand::Rng;

/// Two-point crossover: the children swap the segment `[p1, p2)`.
/// Parents shorter than three genes are returned unchanged.
pub fn crossover_two_point(a: &[Gene], b: &[Gene], rng: &mut Rng) -> (Chromosome, Chromosome) {
    let len = a.len().min(b.len());
    if len < 3 {
        return (a.to_vec(), b.to_vec());
    }

    let p1 = rng.usize(1..=len - 2);
    let p2 = rng.usize(p1 + 1..=len);

    let mut child_a = a.to_vec();
    let mut child_b = b.to_vec();
    child_a[p1..p2].copy_from_slice(&b[p1..p2]);
    child_b[p1..p2].copy_from_slice(&a[p1..p2]);
    (child_a, child_b)
}

/// One-point splice of both parents with `elite`: each child keeps its own
/// prefix and takes the elite's suffix.
pub fn crossover_elite_splice(
    a: &[Gene],
    b: &[Gene],
    elite: &[Gene],
    rng: &mut Rng,
) -> (Chromosome, Chromosome) {
    let len = a.len().min(b.len()).min(elite.len());
    if len < 2 {
        return (a.to_vec(), b.to_vec());
    }

    let point = rng.usize(1..len);
    let splice = |parent: &[Gene]| -> Chromosome {
        let mut child = parent[..point].to_vec();
        child.extend_from_slice(&elite[point..]);
        child
    };
    (splice(a), splice(b))
}

/// Normalizes a child after crossover:
/// 1. out-of-range genes are replaced with random ones;
/// 2. a gene equal to its predecessor is replaced with a different one;
/// 3. the length is padded with random genes or truncated to `length`.
pub fn heuristic_repair(chromosome: &[Gene], length: usize, rng: &mut Rng) -> Chromosome {
    let mut repaired: Chromosome = Vec::with_capacity(length);
    for &gene in chromosome {
        let g = if (gene as usize) >= MOVE_COUNT {
            random_gene(rng)
        } else if repaired.last() == Some(&gene) {
            random_gene_except(rng, gene)
        } else {
            gene
        };
        repaired.push(g);
    }

    if repaired.len() < length {
        repaired.extend((repaired.len()..length).map(|_| random_gene(rng)));
    } else {
        repaired.truncate(length);
    }
    repaired
}
