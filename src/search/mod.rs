//! Deterministic tree search and single-pass walks, both driven by a
//! pluggable [`MoveSelectionStrategy`].

pub mod backtrack;
pub mod strategy;
pub mod walk;

pub use backtrack::{BacktrackOptions, BacktrackingSearch, BacktrackingSolver, SearchReport, SearchState};
pub use strategy::{MoveSelectionStrategy, RandomOrder, TableOrder, Warnsdorff};
pub use walk::{GreedyWalk, WalkReport};
