//! The uniform solving contract shared by every algorithm family.

use crate::core_types::{Path, Position};
use crate::error::{TourError, TourResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Receives progress updates while a solver runs.
/// Implementations must tolerate being called at any cadence, or never.
pub trait ProgressObserver {
    fn on_progress(&self, percent: f64, message: &str);
}

/// The default observer: ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _percent: f64, _message: &str) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(f64, &str),
{
    fn on_progress(&self, percent: f64, message: &str) {
        self(percent, message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Bool(bool),
    Int(u64),
    Float(f64),
    Text(String),
}

impl StatValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{:.4}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for StatValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u64> for StatValue {
    fn from(v: u64) -> Self {
        Self::Int(v)
    }
}

impl From<usize> for StatValue {
    fn from(v: usize) -> Self {
        Self::Int(v as u64)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for StatValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Ordered key/value statistics attached to every outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stats(BTreeMap<String, StatValue>);

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<StatValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Builder-style [`Stats::insert`].
    pub fn with(mut self, key: &str, value: impl Into<StatValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&StatValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StatValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What every solver returns: `(success, path, stats)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub success: bool,
    pub path: Path,
    pub stats: Stats,
}

impl SolveOutcome {
    /// A failed outcome with an empty path and the error's description under `error`.
    pub fn failure(err: &TourError) -> Self {
        Self {
            success: false,
            path: Vec::new(),
            stats: Stats::new().with("error", err.to_string()),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.stats.get("error").and_then(StatValue::as_str)
    }

    pub fn execution_time(&self) -> f64 {
        self.stats
            .get("execution_time")
            .and_then(StatValue::as_f64)
            .unwrap_or(0.0)
    }
}

/// Inputs common to every solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub board_size: usize,
    pub start: Position,
    pub timeout: Option<Duration>,
    pub seed: Option<u64>,
}

impl SolveRequest {
    pub fn new(board_size: usize, start: Position) -> Self {
        Self {
            board_size,
            start,
            timeout: None,
            seed: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Board and start checks every solver performs before doing any search work.
    pub fn validate(&self) -> TourResult<()> {
        if self.board_size == 0 || self.board_size > crate::consts::MAX_BOARD_SIZE {
            return Err(TourError::InvalidBoardSize(self.board_size));
        }
        if !crate::board::is_valid(self.start, self.board_size) {
            return Err(TourError::InvalidStart {
                start: self.start,
                board_size: self.board_size,
            });
        }
        Ok(())
    }
}

/// A constructible tour solver. One call to `solve` owns all of its search state.
pub trait Solver {
    fn name(&self) -> &str;

    fn solve(
        &mut self,
        request: &SolveRequest,
        progress: &dyn ProgressObserver,
    ) -> TourResult<SolveOutcome>;
}

/// Fresh RNG from an optional seed.
pub fn make_rng(seed: Option<u64>) -> fastrand::Rng {
    match seed {
        Some(s) => fastrand::Rng::with_seed(s),
        None => fastrand::Rng::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_request_validation() {
        assert!(SolveRequest::new(8, Position::new(7, 7)).validate().is_ok());
        assert!(matches!(
            SolveRequest::new(8, Position::new(8, 0)).validate(),
            Err(TourError::InvalidStart { .. })
        ));
        assert!(matches!(
            SolveRequest::new(0, Position::new(0, 0)).validate(),
            Err(TourError::InvalidBoardSize(0))
        ));
    }

    #[test]
    fn test_closure_observer() {
        let seen = RefCell::new(Vec::new());
        let observer = |p: f64, m: &str| seen.borrow_mut().push((p, m.to_string()));
        observer.on_progress(50.0, "half");
        NoProgress.on_progress(10.0, "ignored");
        assert_eq!(seen.into_inner(), vec![(50.0, "half".to_string())]);
    }

    #[test]
    fn test_stats_json_is_flat() {
        let stats = Stats::new()
            .with("timed_out", false)
            .with("recursive_calls", 12usize)
            .with("algorithm", "test");
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"algorithm":"test","recursive_calls":12,"timed_out":false}"#
        );
    }
}
