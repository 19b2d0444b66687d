//! CLI enum types for the rank command: strategy, presort, tie-break, formats.

use clap::ValueEnum;
use curate_core::ranking::{Presort, Strategy, TieBreak};

/// Prioritization strategy.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyArg {
    /// Lowest top confidence first
    LeastConfidentFirst,
    /// Smallest ratio between the top two confidences first
    ClosestRatioFirst,
    /// Round-robin across predicted labels
    LabelStratified,
    /// Round-robin across predicted (top, second) label pairs
    LabelPairStratified,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::LeastConfidentFirst => Strategy::LeastConfidentFirst,
            StrategyArg::ClosestRatioFirst => Strategy::ClosestRatioFirst,
            StrategyArg::LabelStratified => Strategy::LabelStratified,
            StrategyArg::LabelPairStratified => Strategy::LabelPairStratified,
        }
    }
}

/// Ordering inside each stratum before interleaving.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PresortArg {
    /// Keep input order
    None,
    LeastConfident,
    ClosestRatio,
}

impl From<PresortArg> for Presort {
    fn from(arg: PresortArg) -> Self {
        match arg {
            PresortArg::None => Presort::None,
            PresortArg::LeastConfident => Presort::LeastConfident,
            PresortArg::ClosestRatio => Presort::ClosestRatio,
        }
    }
}

/// Tie-break rule for equal confidences.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TieBreakArg {
    /// Earlier label in the score map wins
    FirstSeen,
    /// Alphabetically smaller label wins
    Lexicographic,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::FirstSeen => TieBreak::FirstSeen,
            TieBreakArg::Lexicographic => TieBreak::Lexicographic,
        }
    }
}

/// Supported formats for the ordered output.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// One item identifier per line
    Text,
    /// JSON array of ranked records
    Json,
    /// One ranked record per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Supported formats for the metrics report.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}
