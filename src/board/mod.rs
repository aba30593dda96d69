//! Move model: the knight delta table applied to a bounded board, and the two
//! occupancy representations the solvers walk over.

pub mod mobility;

use crate::consts::{KNIGHT_MOVES, UNVISITED};
use crate::core_types::Position;

pub use self::mobility::{degree, MobilityCache};

/// Anything that can answer "has this cell been visited?" for a board of known size.
pub trait Occupancy {
    fn board_size(&self) -> usize;

    /// Off-board positions are reported as visited so callers never step onto them.
    fn is_visited(&self, pos: Position) -> bool;

    #[inline(always)]
    fn is_unvisited(&self, pos: Position) -> bool {
        !self.is_visited(pos)
    }
}

#[inline(always)]
pub fn is_valid(pos: Position, n: usize) -> bool {
    pos.index(n).is_some()
}

/// Applies delta `move_index` to `pos`. An index outside the table leaves `pos` unchanged.
#[inline(always)]
pub fn apply_move(pos: Position, move_index: usize) -> Position {
    match KNIGHT_MOVES.get(move_index) {
        Some(&(dx, dy)) => Position::new(pos.x + dx, pos.y + dy),
        None => pos,
    }
}

/// Index of the delta that takes `from` to `to`, if they are a knight move apart.
pub fn move_index(from: Position, to: Position) -> Option<usize> {
    let delta = (to.x - from.x, to.y - from.y);
    KNIGHT_MOVES.iter().position(|&d| d == delta)
}

#[inline(always)]
pub fn is_knight_move(a: Position, b: Position) -> bool {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    (dx == 1 && dy == 2) || (dx == 2 && dy == 1)
}

/// Knight neighbours of `pos` that lie on a board of edge `n`, in delta-table order.
pub fn neighbours(pos: Position, n: usize) -> impl Iterator<Item = Position> {
    KNIGHT_MOVES
        .iter()
        .map(move |&(dx, dy)| Position::new(pos.x + dx, pos.y + dy))
        .filter(move |p| is_valid(*p, n))
}

/// Valid, unvisited destinations from `pos`, in delta-table order.
pub fn legal_moves<O: Occupancy + ?Sized>(pos: Position, occ: &O) -> Vec<Position> {
    let mut moves = Vec::with_capacity(KNIGHT_MOVES.len());
    for &(dx, dy) in &KNIGHT_MOVES {
        let next = Position::new(pos.x + dx, pos.y + dy);
        if occ.is_unvisited(next) {
            moves.push(next);
        }
    }
    moves
}

/// The move-order grid used by backtracking.
/// `-1` marks an unvisited cell, `k >= 0` the step at which it was entered.
#[derive(Debug, Clone)]
pub struct Board {
    n: usize,
    cells: Vec<i32>,
}

impl Board {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![UNVISITED; n * n],
        }
    }

    pub fn reset(&mut self) {
        self.cells.fill(UNVISITED);
    }

    pub fn mark(&mut self, pos: Position, step: usize) {
        if let Some(i) = pos.index(self.n) {
            self.cells[i] = step as i32;
        }
    }

    pub fn unmark(&mut self, pos: Position) {
        if let Some(i) = pos.index(self.n) {
            self.cells[i] = UNVISITED;
        }
    }

    /// Step at which `pos` was entered, if it is visited.
    pub fn step_at(&self, pos: Position) -> Option<usize> {
        let v = *self.cells.get(pos.index(self.n)?)?;
        (v != UNVISITED).then_some(v as usize)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        self.cells.chunks(self.n.max(1))
    }
}

impl Occupancy for Board {
    fn board_size(&self) -> usize {
        self.n
    }

    #[inline(always)]
    fn is_visited(&self, pos: Position) -> bool {
        match pos.index(self.n) {
            Some(i) => self.cells[i] != UNVISITED,
            None => true,
        }
    }
}

/// Bitset over the cells of an n×n board with a running count.
#[derive(Debug, Clone)]
pub struct VisitedSet {
    n: usize,
    cells: Vec<bool>,
    count: usize,
}

impl VisitedSet {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![false; n * n],
            count: 0,
        }
    }

    /// Returns `true` if `pos` is on the board and was not yet present.
    pub fn insert(&mut self, pos: Position) -> bool {
        match pos.index(self.n) {
            Some(i) if !self.cells[i] => {
                self.cells[i] = true;
                self.count += 1;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, pos: Position) -> bool {
        match pos.index(self.n) {
            Some(i) if self.cells[i] => {
                self.cells[i] = false;
                self.count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.index(self.n).is_some_and(|i| self.cells[i])
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.cells.len()
    }
}

impl Occupancy for VisitedSet {
    fn board_size(&self) -> usize {
        self.n
    }

    #[inline(always)]
    fn is_visited(&self, pos: Position) -> bool {
        match pos.index(self.n) {
            Some(i) => self.cells[i],
            None => true,
        }
    }
}
