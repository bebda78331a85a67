//! Powerduel CLI - Command-line interface
//!
//! Commands:
//! - suggest: Choose a move for a given pair of hands
//! - match: Play the engine against a random bot

mod match_cmd;
mod suggest;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use powerduel_ai::EngineConfig;
use tracing_subscriber::EnvFilter;

use match_cmd::MatchArgs;
use suggest::SuggestArgs;

#[derive(Parser)]
#[command(name = "powerduel")]
#[command(about = "Move engine for the power duel card game", version)]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Engine config JSON file (missing fields use defaults)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose a move for the acting hand
    Suggest(SuggestArgs),
    /// Play the engine against a uniformly random bot
    Match(MatchArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.seed)?;

    match cli.command {
        Commands::Suggest(args) => suggest::run(args, config),
        Commands::Match(args) => match_cmd::run(args, config, cli.seed),
    }
}

/// Logs go to stderr so `--json` output stays clean
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file (or defaults), with `--seed` taking precedence
fn load_config(path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = Some(seed);
    }
    Ok(config)
}
