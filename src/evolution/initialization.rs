use crate::consts::MOVE_COUNT;
use crate::core_types::{Chromosome, Gene};
use fastrand::Rng;

#[inline(always)]
pub fn random_gene(rng: &mut Rng) -> Gene {
    rng.u8(0..MOVE_COUNT as u8)
}

/// A random gene different from `avoid`.
pub fn random_gene_except(rng: &mut Rng, avoid: Gene) -> Gene {
    let g = rng.u8(0..MOVE_COUNT as u8 - 1);
    if g >= avoid {
        g + 1
    } else {
        g
    }
}

pub fn random_chromosome(rng: &mut Rng, length: usize) -> Chromosome {
    (0..length).map(|_| random_gene(rng)).collect()
}

pub fn random_population(rng: &mut Rng, size: usize, length: usize) -> Vec<Chromosome> {
    (0..size).map(|_| random_chromosome(rng, length)).collect()
}
