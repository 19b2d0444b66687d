//! Running classification-quality counters and the end-of-run F-score report.
//!
//! Counters are keyed by normalized label. On a miss, the ground-truth label
//! takes a false negative and the predicted label a false positive. Only
//! labels that have been registered or observed as ground truth appear in the
//! report; a label that was only ever predicted is counted but not reported.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{RankingError, RankingResult};
use crate::types::RankingRecord;

/// Per-label confusion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounters {
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    /// Scored items whose ground truth is this label
    pub count: u64,
}

impl ClassCounters {
    pub fn precision(&self) -> Option<f64> {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    pub fn recall(&self) -> Option<f64> {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    /// Harmonic mean of precision and recall; 0 when there are no true positives.
    pub fn f_score(&self) -> f64 {
        if self.true_positives == 0 {
            return 0.0;
        }
        match (self.precision(), self.recall()) {
            (Some(p), Some(r)) if p + r > 0.0 => 2.0 * p * r / (p + r),
            _ => 0.0,
        }
    }

    /// Fraction of this label's items whose top prediction was correct.
    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.true_positives, self.count)
    }
}

fn ratio(num: u64, den: u64) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

/// Final scores for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub f_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recall: Option<f64>,
    pub counters: ClassCounters,
}

/// Corpus-wide accuracy summary, computed once after all items are scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub labels: BTreeMap<String, LabelScore>,
    /// Item-count weighted mean of per-label F-scores
    pub micro_f: f64,
    /// Unweighted mean of per-label F-scores
    pub macro_f: f64,
    pub total_items: u64,
    pub total_labels: usize,
}

#[derive(Debug, Clone, Default)]
struct Entry {
    counters: ClassCounters,
    reported: bool,
}

/// Accumulates per-label counters one scored item at a time.
#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    entries: BTreeMap<String, Entry>,
    total_items: u64,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `label` part of the report even if none of its items get scored.
    pub fn register_label(&mut self, label: &str) {
        self.entries.entry(label.to_string()).or_default().reported = true;
    }

    /// Record one scored item whose ground truth is `ground_truth`.
    pub fn observe(&mut self, ground_truth: &str, record: &RankingRecord) {
        let predicted = record.top_label();

        let truth = self.entries.entry(ground_truth.to_string()).or_default();
        truth.reported = true;
        truth.counters.count += 1;
        if predicted == ground_truth {
            truth.counters.true_positives += 1;
        } else {
            truth.counters.false_negatives += 1;
            self.entries
                .entry(predicted.to_string())
                .or_default()
                .counters
                .false_positives += 1;
        }
        self.total_items += 1;
    }

    pub fn counters(&self, label: &str) -> Option<&ClassCounters> {
        self.entries.get(label).map(|e| &e.counters)
    }

    /// Compute per-label F-scores plus micro-F and macro-F.
    ///
    /// Fails with `EmptyCorpus` when no items were observed or no labels
    /// are reportable.
    pub fn report(&self) -> RankingResult<AggregateReport> {
        let labels: BTreeMap<String, LabelScore> = self
            .entries
            .iter()
            .filter(|(_, e)| e.reported)
            .map(|(label, e)| {
                let c = e.counters;
                let score = LabelScore {
                    f_score: c.f_score(),
                    precision: c.precision(),
                    recall: c.recall(),
                    counters: c,
                };
                (label.clone(), score)
            })
            .collect();

        if self.total_items == 0 || labels.is_empty() {
            return Err(RankingError::EmptyCorpus);
        }

        let weighted: f64 = labels
            .values()
            .map(|s| s.f_score * s.counters.count as f64)
            .sum();
        let unweighted: f64 = labels.values().map(|s| s.f_score).sum();

        tracing::debug!(
            "Metrics over {} item(s), {} label(s)",
            self.total_items,
            labels.len()
        );

        Ok(AggregateReport {
            micro_f: weighted / self.total_items as f64,
            macro_f: unweighted / labels.len() as f64,
            total_items: self.total_items,
            total_labels: labels.len(),
            labels,
        })
    }
}
