use crate::reports;
use clap::Args;
use std::fs;
use tourforge::api::{solve_with, Algorithm, RunRecord, SolverRegistry};
use tourforge::config::Config;
use tourforge::core_types::Position;
use tourforge::solver::SolveRequest;
use tracing::{debug, error, info};

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short = 'n', long, default_value_t = 8)]
    pub board_size: usize,

    /// Starting cell as "x,y"
    #[arg(short, long, default_value = "0,0", allow_hyphen_values = true)]
    pub start: Position,

    #[arg(short, long, default_value = "backtracking")]
    pub algorithm: Algorithm,

    #[arg(short, long, default_value_t = 4)]
    pub level: u8,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Write the run record as JSON to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the run record as JSON instead of tables
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: SolveArgs, config: &Config) -> i32 {
    let mut request = SolveRequest::new(args.board_size, args.start);
    request.timeout = config.search.timeout();
    request.seed = args.seed;

    info!(
        "Solving {}x{} from {} with {} level {}",
        args.board_size, args.board_size, args.start, args.algorithm, args.level
    );

    let observer = |percent: f64, message: &str| debug!(percent, "{}", message);
    let outcome = solve_with(
        &SolverRegistry::default(),
        args.algorithm,
        args.level,
        &request,
        config,
        &observer,
    );

    let label = format!("{} level {}", args.algorithm, args.level);
    let record = RunRecord::from_outcome(label.clone(), &request, &outcome);

    if let Some(path) = &args.output {
        let written = serde_json::to_string_pretty(&record)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => info!("Run record written to {}", path),
            Err(e) => {
                error!("Could not write {}: {}", path, e);
                return 1;
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("{}", e);
                return 1;
            }
        }
        return 0;
    }

    reports::print_tour_grid(args.board_size, &outcome.path);
    reports::print_stats_report(&label, &outcome);

    println!("\nResult: {}", record.result);
    println!(
        "Steps: {}/{}",
        record.steps,
        args.board_size.saturating_mul(args.board_size)
    );
    if let Some(err) = outcome.error() {
        println!("Error: {}", err);
    }
    println!("Time: {:.4}s", record.execution_time);
    0
}
