use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use tourforge::config::Config;
use tourforge::error::TourResult;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Knight's Tour solvers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file; flags given explicitly on the command line win
    #[arg(global = true, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Solve(cmd::solve::SolveArgs),
    Compare(cmd::compare::CompareArgs),
    Validate(cmd::validate::ValidateArgs),
}

fn resolve_config(
    path: Option<&str>,
    cli_config: &Config,
    sub_matches: Option<&ArgMatches>,
) -> TourResult<Config> {
    let config = match (path, sub_matches) {
        (Some(path), Some(matches)) => {
            info!("Loading configuration from {}", path);
            let mut file_config = Config::load_from_file(path)?;
            file_config.merge_from_cli(cli_config, matches);
            file_config
        }
        (Some(path), None) => Config::load_from_file(path)?,
        (None, _) => cli_config.clone(),
    };
    config.validate()?;
    Ok(config)
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let sub_matches = matches.subcommand().map(|(_, m)| m);
    let load = |cli_config: &Config| {
        resolve_config(cli.config.as_deref(), cli_config, sub_matches).unwrap_or_else(|e| {
            error!("{}", e);
            process::exit(1);
        })
    };

    let code = match cli.command {
        Commands::Solve(args) => {
            let config = load(&args.config);
            cmd::solve::run(args, &config)
        }
        Commands::Compare(args) => {
            let config = load(&args.config);
            cmd::compare::run(args, &config)
        }
        Commands::Validate(args) => cmd::validate::run(args),
    };
    process::exit(code);
}
