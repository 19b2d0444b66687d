//! Error types for the Curate prioritization pipeline.
//!
//! Errors are split by concern: configuration, ranking (extraction, metrics,
//! record set), and the external prediction / ground-truth sources. Per-item
//! failures are recovered by the driver; corpus-level failures propagate.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Curate operations.
#[derive(Error, Debug)]
pub enum CurateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ranking and metrics errors
    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),

    /// Prediction or ground-truth source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while extracting, scoring, or ordering items.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankingError {
    /// Fewer than two candidate labels, so the confidence ratio is undefined
    #[error("Insufficient predictions: need 2 candidate labels, found {found}")]
    InsufficientPredictions { found: usize },

    /// No items (or no labels) were scored, so aggregate metrics are undefined
    #[error("Empty corpus: no scored items to compute metrics over")]
    EmptyCorpus,

    /// An item identifier was added to the record set twice
    #[error("Duplicate item: {0}")]
    DuplicateItem(String),

    /// A label name was blank after normalization
    #[error("Blank label name (score {score})")]
    BlankLabel { score: f32 },

    /// A confidence score was NaN or infinite
    #[error("Invalid score for label {label:?}: {score}")]
    InvalidScore { label: String, score: f32 },
}

/// Errors surfaced by the external prediction and ground-truth sources.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The oracle does not handle this kind of item (e.g. wrong file type)
    #[error("Not applicable: {item} ({reason})")]
    NotApplicable { item: String, reason: String },

    /// The oracle has no prediction for this item
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// A required file or directory is unavailable
    #[error("Missing resource: {0}")]
    MissingResource(PathBuf),

    /// A source file could not be parsed
    #[error("Malformed input at {path}:{line}: {message}")]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl SourceError {
    /// Whether the driver should skip the item and keep going.
    pub fn is_per_item(&self) -> bool {
        matches!(self, Self::NotApplicable { .. } | Self::ItemNotFound(_))
    }
}

/// Convenience type alias for Curate results.
pub type Result<T> = std::result::Result<T, CurateError>;

/// Convenience type alias for ranking-specific results.
pub type RankingResult<T> = std::result::Result<T, RankingError>;
