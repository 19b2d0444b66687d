//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

use crate::ranking::{Presort, Strategy, TieBreak};

/// Oracle input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// How many candidate labels the oracle keeps per item.
    /// Only the top two feed the ranking; the rest bound the score map.
    pub num_top_predictions: usize,

    /// Item extensions the oracle accepts. Empty accepts every item.
    pub supported_formats: Vec<String>,

    /// Optional labels file, one label per line (supports ~)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_file: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            num_top_predictions: 5,
            supported_formats: vec!["jpg".to_string(), "jpeg".to_string()],
            labels_file: None,
        }
    }
}

/// Subsampling settings for faster evaluation runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Fraction of items to process, in (0, 1]. Absent processes all items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fraction: Option<f64>,

    /// RNG seed for reproducible sampling
    pub seed: u64,
}

/// Prioritization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritizationConfig {
    /// Ordering strategy
    pub strategy: Strategy,

    /// Ordering inside each stratum (stratified strategies only)
    pub presort: Presort,

    /// Tie-break rule for top-2 extraction
    pub tie_break: TieBreak,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Ordered output format ("text", "json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
