use crate::reports;
use clap::Args;
use serde::Deserialize;
use std::fs;
use tourforge::api::RunRecord;
use tourforge::core_types::Path;
use tourforge::consts::MAX_BOARD_SIZE;
use tourforge::error::{TourError, TourResult};
use tourforge::verifier::verify_tour;
use tracing::error;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// A run record written by `solve --output`, or a JSON array of cells
    pub file: String,

    /// Board edge; taken from the run record when omitted
    #[arg(short = 'n', long)]
    pub board_size: Option<usize>,

    /// Accept incomplete paths
    #[arg(long, default_value_t = false)]
    pub partial: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TourFile {
    Record(RunRecord),
    Path(Path),
}

fn load(file: &str) -> TourResult<TourFile> {
    let content = fs::read_to_string(file)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn run(args: ValidateArgs) -> i32 {
    let (path, recorded_size) = match load(&args.file) {
        Ok(TourFile::Record(record)) => (record.solution_path, Some(record.board_size)),
        Ok(TourFile::Path(path)) => (path, None),
        Err(e) => {
            error!("{}: {}", args.file, e);
            return 1;
        }
    };

    let Some(n) = args.board_size.or(recorded_size) else {
        error!("--board-size is required for a bare path");
        return 1;
    };
    if n == 0 || n > MAX_BOARD_SIZE {
        error!("{}", TourError::InvalidBoardSize(n));
        return 1;
    }

    reports::print_tour_grid(n, &path);
    match verify_tour(&path, n, !args.partial) {
        Ok(()) => {
            println!("\nVALID: {} cells on a {}x{} board", path.len(), n, n);
            0
        }
        Err(violation) => {
            println!("\nINVALID: {}", violation);
            2
        }
    }
}
