use super::{neighbours, Occupancy};
use crate::consts::KNIGHT_MOVES;
use crate::core_types::Position;

/// Number of valid, unvisited destinations from `pos` (0..=8).
/// This is the Warnsdorff primitive; it reads the occupancy fresh on every call.
#[inline(always)]
pub fn degree<O: Occupancy + ?Sized>(pos: Position, occ: &O) -> usize {
    KNIGHT_MOVES
        .iter()
        .filter(|&&(dx, dy)| occ.is_unvisited(Position::new(pos.x + dx, pos.y + dy)))
        .count()
}

/// Degrees of every unvisited cell, kept in step with one walk.
///
/// After each move only the moved-to cell and its knight neighbours can change,
/// so `update_after_move` recomputes just those instead of the whole board.
/// The cache is tied to the occupancy it was built from and must not outlive the walk.
#[derive(Debug, Clone)]
pub struct MobilityCache {
    n: usize,
    degrees: Vec<u8>,
}

impl MobilityCache {
    pub fn new<O: Occupancy + ?Sized>(occ: &O) -> Self {
        let n = occ.board_size();
        let mut degrees = vec![0u8; n * n];
        for (i, d) in degrees.iter_mut().enumerate() {
            let pos = Position::from_index(i, n);
            if occ.is_unvisited(pos) {
                *d = degree(pos, occ) as u8;
            }
        }
        Self { n, degrees }
    }

    /// Cached degree of `pos`; visited and off-board cells report 0.
    #[inline(always)]
    pub fn get(&self, pos: Position) -> usize {
        pos.index(self.n).map_or(0, |i| self.degrees[i] as usize)
    }

    /// `occ` must already contain `moved_to`.
    pub fn update_after_move<O: Occupancy + ?Sized>(&mut self, moved_to: Position, occ: &O) {
        if let Some(i) = moved_to.index(self.n) {
            self.degrees[i] = 0;
        }
        for nb in neighbours(moved_to, self.n) {
            if occ.is_unvisited(nb) {
                if let Some(i) = nb.index(self.n) {
                    self.degrees[i] = degree(nb, occ) as u8;
                }
            }
        }
    }
}
