use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A cell on the board.
/// Valid when `0 <= x, y < n`; carries no identity beyond its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Row-major cell index, or `None` when the position is off a board of edge `n`.
    #[inline(always)]
    pub fn index(&self, n: usize) -> Option<usize> {
        let n = n as i64;
        let (x, y) = (self.x as i64, self.y as i64);
        if x >= 0 && y >= 0 && x < n && y < n {
            Some((x * n + y) as usize)
        } else {
            None
        }
    }

    /// Inverse of [`Position::index`].
    pub fn from_index(index: usize, n: usize) -> Self {
        Self::new((index / n) as i32, (index % n) as i32)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Parses `"x,y"` (whitespace and surrounding parentheses are tolerated).
impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let mut parts = trimmed.split(',');
        let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected 'x,y', got '{}'", s));
        };
        let x = x
            .trim()
            .parse::<i32>()
            .map_err(|e| format!("invalid x in '{}': {}", s, e))?;
        let y = y
            .trim()
            .parse::<i32>()
            .map_err(|e| format!("invalid y in '{}': {}", s, e))?;
        Ok(Self::new(x, y))
    }
}

/// An ordered sequence of cells.
pub type Path = Vec<Position>;

/// One move-priority gene; valid values index `KNIGHT_MOVES`.
pub type Gene = u8;

/// A fixed-length sequence of genes, decoded into a [`Path`].
pub type Chromosome = Vec<Gene>;
