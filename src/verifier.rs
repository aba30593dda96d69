//! Structural checks on a finished path, independent of how it was produced.

use crate::board::{is_knight_move, is_valid, VisitedSet};
use crate::consts::MAX_BOARD_SIZE;
use crate::core_types::Position;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TourViolation {
    #[error("Board size {0} is not supported")]
    BoardSize(usize),

    #[error("Path is empty")]
    Empty,

    #[error("Step {index}: {position} is off the {board_size}x{board_size} board")]
    OutOfBounds {
        index: usize,
        position: Position,
        board_size: usize,
    },

    #[error("Step {index}: {position} was already visited")]
    Revisit { index: usize, position: Position },

    #[error("Step {index}: {from} -> {to} is not a knight move")]
    IllegalMove {
        index: usize,
        from: Position,
        to: Position,
    },

    #[error("Tour covers {visited} of {required} cells")]
    Incomplete { visited: usize, required: usize },
}

/// Checks that `path` stays on the board, never revisits a cell and moves
/// like a knight at every step. With `require_complete` it must also cover
/// all `n * n` cells. Reports the first violation found.
pub fn verify_tour(path: &[Position], n: usize, require_complete: bool) -> Result<(), TourViolation> {
    if n == 0 || n > MAX_BOARD_SIZE {
        return Err(TourViolation::BoardSize(n));
    }
    if path.is_empty() {
        return Err(TourViolation::Empty);
    }

    let mut seen = VisitedSet::new(n);
    for (index, &position) in path.iter().enumerate() {
        if !is_valid(position, n) {
            return Err(TourViolation::OutOfBounds {
                index,
                position,
                board_size: n,
            });
        }
        if !seen.insert(position) {
            return Err(TourViolation::Revisit { index, position });
        }
        if index > 0 && !is_knight_move(path[index - 1], position) {
            return Err(TourViolation::IllegalMove {
                index,
                from: path[index - 1],
                to: position,
            });
        }
    }

    let required = n * n;
    if require_complete && seen.len() != required {
        return Err(TourViolation::Incomplete {
            visited: seen.len(),
            required,
        });
    }
    Ok(())
}
