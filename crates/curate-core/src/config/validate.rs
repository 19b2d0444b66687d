//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::report::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.num_top_predictions == 0 {
            return Err(ConfigError::ValidationError(
                "input.num_top_predictions must be > 0".into(),
            ));
        }
        if let Some(f) = self.sampling.fraction {
            if !(f > 0.0 && f <= 1.0) {
                return Err(ConfigError::ValidationError(
                    "sampling.fraction must be in (0.0, 1.0]".into(),
                ));
            }
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be text, json or jsonl (got {:?})",
                self.output.format
            )));
        }
        if self.input.num_top_predictions < 2 {
            tracing::warn!(
                "input.num_top_predictions is 1: every confidence ratio will be undefined"
            );
        }
        Ok(())
    }
}
