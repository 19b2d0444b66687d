//! Curate Core - Active-learning prioritization over classifier predictions.
//!
//! Curate takes per-item label → confidence maps from an external classifier
//! and decides which items a human should label next. For a labeled
//! evaluation set it also reports per-label F-scores and micro/macro F.
//!
//! # Architecture
//!
//! ```text
//! Oracle → ScoreMap → top-2 extraction → RankingRecord ─┬→ MetricsAccumulator → AggregateReport
//!                                                       └→ PrioritizationEngine → ordered items
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use curate_core::source::PredictionSet;
//! use curate_core::{ActiveLearningRun, Config};
//!
//! fn main() -> curate_core::Result<()> {
//!     let config = Config::load()?;
//!     let predictions = PredictionSet::load("predictions.jsonl".as_ref(), &config.input)?;
//!     let items: Vec<String> = predictions.items().map(String::from).collect();
//!
//!     let run = ActiveLearningRun::new(&config, &predictions, Some(&predictions))?;
//!     let outcome = run.run(items)?;
//!     for item in outcome.order() {
//!         println!("{item}");
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod driver;
pub mod error;
pub mod ranking;
pub mod report;
pub mod sampling;
pub mod source;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use driver::{ActiveLearningRun, ItemOutcome, RunOutcome};
pub use error::{ConfigError, CurateError, RankingError, Result, SourceError};
pub use ranking::{
    AggregateReport, ConfidenceExtractor, MetricsAccumulator, PrioritizationEngine, Strategy,
};
pub use report::{OrderWriter, OutputFormat};
pub use types::{RankingRecord, RunStats, ScoreMap};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
