use super::belief::BeliefSpace;
use crate::board::{apply_move, is_valid, legal_moves, neighbours, MobilityCache, Occupancy, VisitedSet};
use crate::core_types::{Gene, Path, Position};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// When a gene's literal move is taken instead of being repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum AcceptRule {
    /// Any valid, unvisited destination.
    Literal,
    /// Additionally the destination must keep at least one exit, except
    /// during the bootstrap phase at the start of the walk.
    Mobility,
}

/// Turns a chromosome into a path that never revisits a cell.
///
/// Genes whose move is rejected are replaced by a repair move scored as
/// `mobility * 2 + future_mobility - difficulty * 10`.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    n: usize,
    rule: AcceptRule,
    bootstrap_cells: usize,
    bootstrap_difficulty: f64,
    belief: Option<&'a BeliefSpace>,
}

impl<'a> Decoder<'a> {
    pub fn new(n: usize, rule: AcceptRule) -> Self {
        Self {
            n,
            rule,
            bootstrap_cells: 5,
            bootstrap_difficulty: 0.7,
            belief: None,
        }
    }

    pub fn with_bootstrap(mut self, cells: usize, max_difficulty: f64) -> Self {
        self.bootstrap_cells = cells;
        self.bootstrap_difficulty = max_difficulty;
        self
    }

    pub fn with_belief(mut self, belief: &'a BeliefSpace) -> Self {
        self.belief = Some(belief);
        self
    }

    pub fn rule(&self) -> AcceptRule {
        self.rule
    }

    pub fn decode(&self, chromosome: &[Gene], start: Position) -> Path {
        if !is_valid(start, self.n) {
            return Vec::new();
        }

        let target = self.n * self.n;
        let mut visited = VisitedSet::new(self.n);
        visited.insert(start);
        let mut cache = MobilityCache::new(&visited);

        let mut path = Vec::with_capacity(target);
        path.push(start);
        let mut current = start;

        for &gene in chromosome {
            if visited.len() >= target {
                break;
            }

            let candidate = apply_move(current, gene as usize);
            let next = if self.accepts(candidate, &visited, &cache) {
                candidate
            } else {
                match self.repair_move(current, &visited, &cache) {
                    Some(p) => p,
                    None => break,
                }
            };

            visited.insert(next);
            cache.update_after_move(next, &visited);
            path.push(next);
            current = next;
        }

        path
    }

    fn accepts(&self, candidate: Position, visited: &VisitedSet, cache: &MobilityCache) -> bool {
        if visited.is_visited(candidate) {
            return false;
        }
        match self.rule {
            AcceptRule::Literal => true,
            AcceptRule::Mobility => {
                // An unvisited cell's cached degree is its mobility once entered.
                if cache.get(candidate) > 0 {
                    return true;
                }
                visited.len() < self.bootstrap_cells
                    && self.belief.map_or(true, |b| {
                        b.get_position_difficulty(candidate) < self.bootstrap_difficulty
                    })
            }
        }
    }

    /// Best legal destination from `current`; the first maximum in delta order wins.
    fn repair_move(
        &self,
        current: Position,
        visited: &VisitedSet,
        cache: &MobilityCache,
    ) -> Option<Position> {
        let mut best: Option<(Position, f64)> = None;
        for candidate in legal_moves(current, visited) {
            let score = self.repair_score(candidate, visited, cache);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((candidate, score));
            }
        }
        best.map(|(p, _)| p)
    }

    fn repair_score(&self, candidate: Position, visited: &VisitedSet, cache: &MobilityCache) -> f64 {
        let mobility = cache.get(candidate);
        // Onward cells that keep an exit once `candidate` is taken. Every such
        // cell neighbours `candidate`, so its degree drops by exactly one.
        let future = neighbours(candidate, self.n)
            .filter(|&m| visited.is_unvisited(m) && cache.get(m) > 1)
            .count();
        let difficulty = self
            .belief
            .map_or(0.0, |b| b.get_position_difficulty(candidate));
        mobility as f64 * 2.0 + future as f64 - difficulty * 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{degree, is_knight_move};
    use crate::config::BeliefParams;
    use std::collections::HashSet;

    fn assert_tour_shape(path: &Path, n: usize) {
        let unique: HashSet<_> = path.iter().collect();
        assert_eq!(unique.len(), path.len(), "Decoder produced a revisit");
        assert!(path.len() <= n * n);
        assert!(path.windows(2).all(|w| is_knight_move(w[0], w[1])));
        assert!(path.iter().all(|&p| is_valid(p, n)));
    }

    #[test]
    fn test_invalid_start_decodes_to_empty() {
        let decoder = Decoder::new(5, AcceptRule::Literal);
        assert!(decoder.decode(&[0, 1, 2], Position::new(5, 0)).is_empty());
    }

    #[test]
    fn test_empty_chromosome_is_just_the_start() {
        let decoder = Decoder::new(5, AcceptRule::Mobility);
        assert_eq!(decoder.decode(&[], Position::new(2, 2)), vec![Position::new(2, 2)]);
    }

    #[test]
    fn test_literal_genes_are_followed() {
        let decoder = Decoder::new(8, AcceptRule::Literal);
        // gene 7 = (+2, +1), gene 5 = (+1, +2)
        let path = decoder.decode(&[7, 5], Position::new(0, 0));
        assert_eq!(
            path,
            vec![Position::new(0, 0), Position::new(2, 1), Position::new(3, 3)]
        );
    }

    #[test]
    fn test_invalid_gene_is_repaired() {
        let decoder = Decoder::new(8, AcceptRule::Literal);
        // gene 0 = (-2, -1) leaves the board from the corner
        let path = decoder.decode(&[0, 0, 0], Position::new(0, 0));
        assert_eq!(path.len(), 4);
        assert_tour_shape(&path, 8);
    }

    #[test]
    fn test_repeating_gene_never_revisits() {
        let decoder = Decoder::new(5, AcceptRule::Mobility);
        let chromosome = vec![3u8; 60];
        let path = decoder.decode(&chromosome, Position::new(0, 0));
        assert_tour_shape(&path, 5);
    }

    #[test]
    fn test_out_of_range_gene_is_repaired() {
        let decoder = Decoder::new(6, AcceptRule::Literal);
        let path = decoder.decode(&[200, 9, 8], Position::new(3, 3));
        assert_eq!(path.len(), 4);
        assert_tour_shape(&path, 6);
    }

    #[test]
    fn test_stops_at_target_on_tiny_board() {
        let decoder = Decoder::new(1, AcceptRule::Mobility);
        assert_eq!(decoder.decode(&[1, 2, 3], Position::new(0, 0)).len(), 1);
    }

    #[test]
    fn test_mobility_rule_avoids_dead_end_after_bootstrap() {
        let decoder = Decoder::new(5, AcceptRule::Mobility).with_bootstrap(0, 0.7);
        let path = decoder.decode(&vec![0u8; 40], Position::new(2, 2));
        assert_tour_shape(&path, 5);

        // Every accepted cell except possibly the last had an exit when entered.
        let mut seen = VisitedSet::new(5);
        for (i, &p) in path.iter().enumerate() {
            seen.insert(p);
            if i + 1 < path.len() {
                assert!(degree(p, &seen) > 0, "Walk entered a dead end at step {}", i);
            }
        }
    }

    #[test]
    fn test_belief_difficulty_steers_repair() {
        let mut belief = BeliefSpace::new(8, BeliefParams::default());
        // From (0,0) the legal moves are (1,2) then (2,1). Make (1,2) look hopeless.
        for _ in 0..4 {
            belief.record_visit(Position::new(1, 2), false);
            belief.record_visit(Position::new(2, 1), true);
        }
        let decoder = Decoder::new(8, AcceptRule::Literal).with_belief(&belief);
        let path = decoder.decode(&[0], Position::new(0, 0));
        assert_eq!(path[1], Position::new(2, 1));

        let plain = Decoder::new(8, AcceptRule::Literal).decode(&[0], Position::new(0, 0));
        assert_eq!(plain[1], Position::new(1, 2), "Ties resolve in delta order");
    }
}
