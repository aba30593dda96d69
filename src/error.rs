use crate::core_types::Position;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TourError {
    #[error("Invalid start position {start} for a {board_size}x{board_size} board")]
    InvalidStart { start: Position, board_size: usize },

    #[error("Invalid board size: {0}")]
    InvalidBoardSize(usize),

    #[error("Timeout after {} seconds", .after.as_secs_f64())]
    Timeout { after: Duration },

    #[error("Solver not found: {algorithm} Level {level}")]
    AlgorithmNotFound { algorithm: String, level: u8 },

    #[error("Solver fault: {0}")]
    Fault(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TourResult<T> = Result<T, TourError>;
