/// The eight knight-move deltas `(dx, dy)`.
/// A gene in a chromosome is an index into this table, so its order is part
/// of the encoding and must never change.
pub const KNIGHT_MOVES: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Number of entries in the delta table (valid genes are `0..MOVE_COUNT`).
pub const MOVE_COUNT: usize = KNIGHT_MOVES.len();

/// Board cell marker for "not yet visited".
pub const UNVISITED: i32 = -1;

/// Largest board edge the engine accepts.
/// Coordinates are `i32` and boards are allocated densely, so this keeps
/// a single request well inside memory and index limits.
pub const MAX_BOARD_SIZE: usize = 1024;

/// Difficulty reported for positions the belief space has never seen.
pub const NEUTRAL_DIFFICULTY: f64 = 0.5;

/// Success rate reported for moves the belief space has never seen used.
pub const NEUTRAL_MOVE_RATE: f64 = 0.5;
