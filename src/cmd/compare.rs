use crate::reports::{self, CompareRow};
use clap::Args;
use rayon::prelude::*;
use tourforge::api::{solve_with, Algorithm, SolverRegistry};
use tourforge::config::Config;
use tourforge::core_types::Position;
use tourforge::solver::{NoProgress, SolveRequest, StatValue};
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short = 'n', long, default_value_t = 5)]
    pub board_size: usize,

    #[arg(short, long, default_value = "0,0", allow_hyphen_values = true)]
    pub start: Position,

    /// Runs per variant
    #[arg(short, long, default_value_t = 1)]
    pub runs: usize,

    /// Restrict the comparison to one algorithm family
    #[arg(short, long)]
    pub algorithm: Option<Algorithm>,

    /// Base seed; run `i` of every variant uses `seed + i` (wrapping)
    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
}

pub fn run(args: CompareArgs, config: &Config) -> i32 {
    let registry = SolverRegistry::default();
    let variants: Vec<(Algorithm, u8)> = registry
        .keys()
        .filter(|(a, _)| args.algorithm.map_or(true, |only| only == *a))
        .collect();
    let runs = args.runs.max(1);

    info!(
        "Comparing {} variants x {} runs on {}x{}",
        variants.len(),
        runs,
        args.board_size,
        args.board_size
    );

    let jobs: Vec<(usize, usize)> = (0..variants.len())
        .flat_map(|v| (0..runs).map(move |r| (v, r)))
        .collect();

    let results: Vec<(usize, bool, bool, f64, usize)> = jobs
        .par_iter()
        .map(|&(v, r)| {
            let (algorithm, level) = variants[v];
            let mut request = SolveRequest::new(args.board_size, args.start);
            request.timeout = config.search.timeout();
            request.seed = args.seed.map(|s| s.wrapping_add(r as u64));

            let outcome = solve_with(&registry, algorithm, level, &request, config, &NoProgress);
            let verified = outcome
                .stats
                .get("verified")
                .and_then(StatValue::as_bool)
                .unwrap_or(false);
            (
                v,
                outcome.success,
                verified,
                outcome.execution_time(),
                outcome.path.len(),
            )
        })
        .collect();

    let mut rows: Vec<CompareRow> = variants
        .iter()
        .map(|&(algorithm, level)| CompareRow {
            algorithm,
            level,
            runs: 0,
            successes: 0,
            verified: 0,
            total_time: 0.0,
            total_steps: 0,
        })
        .collect();
    for (v, success, verified, time, steps) in results {
        let row = &mut rows[v];
        row.runs += 1;
        row.successes += success as usize;
        row.verified += verified as usize;
        row.total_time += time;
        row.total_steps += steps;
    }

    reports::print_comparison_report(args.board_size, &rows);
    0
}
