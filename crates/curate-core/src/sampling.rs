//! Seeded subsampling of the item stream.
//!
//! Evaluation over a large labeled corpus can be sped up by scoring only a
//! fraction of it. The draw is seeded, so the same seed and item order always
//! select the same items.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SamplingConfig;
use crate::error::ConfigError;

/// Decides, item by item, whether to process or skip.
#[derive(Debug, Clone)]
pub struct SamplingPolicy {
    fraction: Option<f64>,
    rng: StdRng,
}

impl SamplingPolicy {
    /// Keep roughly `fraction` of items; `None` keeps everything.
    pub fn new(fraction: Option<f64>, seed: u64) -> Result<Self, ConfigError> {
        if let Some(f) = fraction {
            if !(f > 0.0 && f <= 1.0) {
                return Err(ConfigError::ValidationError(format!(
                    "sampling fraction must be in (0, 1], got {f}"
                )));
            }
        }
        Ok(Self {
            fraction: fraction.filter(|f| *f < 1.0),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Process every item.
    pub fn all() -> Self {
        Self {
            fraction: None,
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn from_config(config: &SamplingConfig) -> Result<Self, ConfigError> {
        Self::new(config.fraction, config.seed)
    }

    /// Whether the next item should be processed.
    pub fn keep(&mut self) -> bool {
        match self.fraction {
            None => true,
            Some(f) => self.rng.gen_bool(f),
        }
    }
}
