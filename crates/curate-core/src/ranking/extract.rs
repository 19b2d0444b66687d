//! Single-pass top-2 selection over an item's score map.

use serde::{Deserialize, Serialize};

use crate::error::{RankingError, RankingResult};
use crate::types::{Prediction, RankingRecord, ScoreMap};

/// How equal scores are resolved when picking the top two labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// The label that appears first in the score map wins.
    #[default]
    FirstSeen,
    /// The lexicographically smaller label wins, independent of map order.
    Lexicographic,
}

impl TieBreak {
    /// Whether `candidate` should rank above `incumbent`.
    fn beats(self, candidate: &Prediction, incumbent: &Prediction) -> bool {
        if candidate.score > incumbent.score {
            return true;
        }
        match self {
            TieBreak::FirstSeen => false,
            TieBreak::Lexicographic => {
                candidate.score == incumbent.score && candidate.label < incumbent.label
            }
        }
    }
}

/// The two most confident predictions for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct TopTwo {
    pub top: Prediction,
    pub second: Option<Prediction>,
}

impl TopTwo {
    /// `top / second`.
    ///
    /// Fails with `InsufficientPredictions` when there is no second label or
    /// its score is zero.
    pub fn confidence_ratio(&self) -> RankingResult<f32> {
        match &self.second {
            Some(second) if second.score > 0.0 => Ok(self.top.score / second.score),
            Some(_) => Err(RankingError::InsufficientPredictions { found: 2 }),
            None => Err(RankingError::InsufficientPredictions { found: 1 }),
        }
    }

    /// Freeze into an immutable ranking record for `item`.
    pub fn into_record(self, item: impl Into<String>) -> RankingRecord {
        let ratio = self.confidence_ratio().ok();
        RankingRecord::new(item, self.top, self.second, ratio)
    }
}

/// Extracts the top-2 predictions from score maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceExtractor {
    tie_break: TieBreak,
}

impl ConfidenceExtractor {
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    /// Pick the two highest-scoring labels in one pass.
    ///
    /// A displaced top always becomes the new second, even when it only ties
    /// the current second. `[p 0.5, q 0.5, r 0.9]` yields second `p`, not `q`,
    /// so equal scores stay in first-seen order in both slots.
    ///
    /// An empty map fails with `InsufficientPredictions { found: 0 }`. A map
    /// with one label succeeds with `second == None`.
    pub fn extract(&self, scores: &ScoreMap) -> RankingResult<TopTwo> {
        let mut top: Option<&Prediction> = None;
        let mut second: Option<&Prediction> = None;

        for candidate in scores.iter() {
            match top {
                None => top = Some(candidate),
                Some(current) if self.tie_break.beats(candidate, current) => {
                    // top >= second always holds, so the old top is the new second
                    second = Some(current);
                    top = Some(candidate);
                }
                Some(_) => match second {
                    Some(current) if !self.tie_break.beats(candidate, current) => {}
                    _ => second = Some(candidate),
                },
            }
        }

        let top = top.ok_or(RankingError::InsufficientPredictions { found: 0 })?;
        Ok(TopTwo {
            top: top.clone(),
            second: second.cloned(),
        })
    }

    /// Extract and build the ranking record for `item` in one step.
    pub fn record(&self, item: &str, scores: &ScoreMap) -> RankingResult<RankingRecord> {
        Ok(self.extract(scores)?.into_record(item))
    }
}
