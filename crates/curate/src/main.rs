//! Curate CLI - Prioritize classifier predictions for human labeling.
//!
//! Curate reads per-item label confidences produced by an external
//! classifier, orders the items so the most informative ones get labeled
//! first, and, when ground truth is available, reports per-label F-scores.
//!
//! # Usage
//!
//! ```bash
//! # Least-confident items first, one identifier per line
//! curate rank predictions.jsonl > order.txt
//!
//! # Evaluate against a labeled directory tree on a 5% seeded sample
//! curate rank predictions.jsonl --labels-dir test_data --sample-fraction 0.05 --seed 7
//!
//! # Interleave across predicted label pairs, nearly-tied items first
//! curate rank predictions.jsonl -s label-pair-stratified --presort closest-ratio
//!
//! # View configuration
//! curate config show
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod cli;
mod logging;

/// Curate - Prioritize classifier predictions for human labeling.
#[derive(Parser, Debug)]
#[command(name = "curate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "CURATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Order items for labeling and report accuracy metrics
    Rank(cli::rank::RankArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

/// Load the config, falling back to defaults when the default file is broken.
///
/// An explicit `--config` file must load cleanly.
fn load_config(path: Option<&Path>) -> anyhow::Result<curate_core::Config> {
    if let Some(path) = path {
        return Ok(curate_core::Config::load_from(path)?);
    }
    match curate_core::Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            // Logging isn't initialized yet
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `curate config path`."
            );
            Ok(curate_core::Config::default())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(cli::rank::expand_path);
    let config = load_config(config_path.as_deref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Curate v{}", curate_core::VERSION);

    match cli.command {
        Commands::Rank(args) => cli::rank::execute(args, config),
        Commands::Config(args) => cli::config::execute(args, &config, config_path.as_deref()),
    }
}
