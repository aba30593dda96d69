use super::strategy::MoveSelectionStrategy;
use crate::board::{degree, legal_moves, neighbours, Board, Occupancy};
use crate::core_types::{Path, Position};
use crate::error::{TourError, TourResult};
use crate::solver::{ProgressObserver, SolveOutcome, SolveRequest, Solver, Stats};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Where the search is. `Exploring(step)` means the cell for `step` was just
/// entered; `Backtracked(step)` means the cell at `step` was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Exploring(usize),
    Backtracked(usize),
    Success,
    TimedOut,
    Exhausted,
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::TimedOut | Self::Exhausted)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BacktrackOptions {
    /// Reject candidates that would strand an unvisited neighbour.
    pub isolation_lookahead: bool,
    /// Report progress every this many entered cells (0 disables reporting).
    pub progress_interval: u64,
}

impl Default for BacktrackOptions {
    fn default() -> Self {
        Self {
            isolation_lookahead: false,
            progress_interval: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub state: SearchState,
    pub path: Path,
    pub recursive_calls: u64,
    pub backtrack_count: u64,
    pub timed_out: bool,
    pub elapsed: Duration,
}

struct Frame {
    candidates: Vec<Position>,
    next: usize,
}

impl Frame {
    fn next_candidate(&mut self) -> Option<Position> {
        let c = self.candidates.get(self.next).copied();
        self.next += 1;
        c
    }
}

/// Depth-first tour search over a [`Board`], ordered by a [`MoveSelectionStrategy`].
///
/// Frames live on an explicit stack, so board size is not limited by the thread's stack.
pub struct BacktrackingSearch<S: MoveSelectionStrategy> {
    strategy: S,
    options: BacktrackOptions,
    board: Board,
    path: Path,
    recursive_calls: u64,
    backtrack_count: u64,
    timed_out: bool,
    state: SearchState,
}

impl<S: MoveSelectionStrategy> BacktrackingSearch<S> {
    pub fn new(strategy: S, options: BacktrackOptions) -> Self {
        Self {
            strategy,
            options,
            board: Board::new(0),
            path: Vec::new(),
            recursive_calls: 0,
            backtrack_count: 0,
            timed_out: false,
            state: SearchState::Exploring(0),
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Runs one full search. All state from a previous run is discarded first.
    /// `start` must already be validated against `n`.
    pub fn run(
        &mut self,
        n: usize,
        start: Position,
        timeout: Option<Duration>,
        progress: &dyn ProgressObserver,
    ) -> SearchReport {
        let started = Instant::now();
        let deadline = timeout.map(|t| started + t);

        self.board = Board::new(n);
        self.path.clear();
        self.recursive_calls = 0;
        self.backtrack_count = 0;
        self.timed_out = false;
        self.state = SearchState::Exploring(0);

        let area = n * n;
        let mut frames: Vec<Frame> = Vec::with_capacity(area);

        if self.enter(start, area, deadline, progress) {
            frames.push(self.frame_for(start, area));
        }

        while !self.state.is_terminal() {
            let Some(frame) = frames.last_mut() else {
                self.state = SearchState::Exhausted;
                break;
            };

            match frame.next_candidate() {
                Some(next) => {
                    if self.enter(next, area, deadline, progress) {
                        frames.push(self.frame_for(next, area));
                    }
                }
                None => {
                    frames.pop();
                    self.retreat();
                }
            }
        }

        let elapsed = started.elapsed();
        match self.state {
            SearchState::TimedOut => info!(
                "Backtracking ({}) timed out after {:.2}s at depth {}",
                self.strategy.name(),
                elapsed.as_secs_f64(),
                self.path.len()
            ),
            state => debug!(
                "Backtracking ({}) finished: {:?} | calls={} backtracks={}",
                self.strategy.name(),
                state,
                self.recursive_calls,
                self.backtrack_count
            ),
        }

        SearchReport {
            state: self.state,
            path: self.path.clone(),
            recursive_calls: self.recursive_calls,
            backtrack_count: self.backtrack_count,
            timed_out: self.timed_out,
            elapsed,
        }
    }

    /// Marks `pos` as the next step. Returns `true` if the search should keep
    /// descending from it, `false` if it reached a terminal state instead.
    fn enter(
        &mut self,
        pos: Position,
        area: usize,
        deadline: Option<Instant>,
        progress: &dyn ProgressObserver,
    ) -> bool {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            self.timed_out = true;
            self.state = SearchState::TimedOut;
            return false;
        }

        self.recursive_calls += 1;
        let step = self.path.len();
        self.board.mark(pos, step);
        self.path.push(pos);
        self.state = SearchState::Exploring(step);

        let interval = self.options.progress_interval;
        if interval > 0 && self.recursive_calls % interval == 0 {
            let percent = step as f64 / area as f64 * 100.0;
            progress.on_progress(percent, &format!("Exploring move {}/{}", step, area));
        }

        if step + 1 == area {
            self.state = SearchState::Success;
            return false;
        }
        true
    }

    fn retreat(&mut self) {
        if let Some(pos) = self.path.pop() {
            self.board.unmark(pos);
            self.backtrack_count += 1;
            self.state = SearchState::Backtracked(self.path.len());
        }
    }

    fn frame_for(&mut self, pos: Position, area: usize) -> Frame {
        let mut candidates = legal_moves(pos, &self.board);
        if self.options.isolation_lookahead {
            let remaining_after = area.saturating_sub(self.path.len() + 1);
            candidates.retain(|&c| !isolates_neighbour(&mut self.board, c, remaining_after));
        }
        self.strategy.order(&mut candidates, &self.board);
        Frame {
            candidates,
            next: 0,
        }
    }
}

/// Would visiting `candidate` leave an unvisited neighbour with no way out?
/// A stranded cell is only acceptable as the very last cell of the tour.
fn isolates_neighbour(board: &mut Board, candidate: Position, remaining_after: usize) -> bool {
    if remaining_after <= 1 {
        return false;
    }
    let n = board.board_size();
    // Probe mark; any non-negative step reads as visited.
    board.mark(candidate, n * n);
    let stranded = neighbours(candidate, n)
        .filter(|&nb| board.is_unvisited(nb))
        .any(|nb| degree(nb, board) == 0);
    board.unmark(candidate);
    stranded
}

/// Adapts a [`BacktrackingSearch`] to the [`Solver`] contract.
pub struct BacktrackingSolver<S: MoveSelectionStrategy> {
    label: String,
    search: BacktrackingSearch<S>,
    default_timeout: Option<Duration>,
}

impl<S: MoveSelectionStrategy> BacktrackingSolver<S> {
    pub fn new(
        label: impl Into<String>,
        strategy: S,
        options: BacktrackOptions,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            label: label.into(),
            search: BacktrackingSearch::new(strategy, options),
            default_timeout,
        }
    }
}

impl<S: MoveSelectionStrategy> Solver for BacktrackingSolver<S> {
    fn name(&self) -> &str {
        &self.label
    }

    fn solve(
        &mut self,
        request: &SolveRequest,
        progress: &dyn ProgressObserver,
    ) -> TourResult<SolveOutcome> {
        if let Err(err) = request.validate() {
            debug!("Backtracking ({}) rejected request: {}", self.label, err);
            let mut outcome = SolveOutcome::failure(&err);
            outcome.stats.insert("algorithm", self.label.as_str());
            outcome.stats.insert("recursive_calls", 0u64);
            outcome.stats.insert("backtrack_count", 0u64);
            outcome.stats.insert("timed_out", false);
            return Ok(outcome);
        }
        if let Some(seed) = request.seed {
            self.search.strategy.reseed(seed);
        }
        let timeout = request.timeout.or(self.default_timeout);

        let report = self
            .search
            .run(request.board_size, request.start, timeout, progress);

        let mut stats = Stats::new()
            .with("algorithm", self.label.as_str())
            .with("strategy", self.search.strategy_name())
            .with("execution_time", report.elapsed.as_secs_f64())
            .with("recursive_calls", report.recursive_calls)
            .with("nodes_explored", report.recursive_calls)
            .with("backtrack_count", report.backtrack_count)
            .with("solution_length", report.path.len())
            .with("timed_out", report.timed_out);

        if let (true, Some(after)) = (report.timed_out, timeout) {
            stats.insert("error", TourError::Timeout { after }.to_string());
        }

        Ok(SolveOutcome {
            success: report.state == SearchState::Success,
            path: report.path,
            stats,
        })
    }
}
