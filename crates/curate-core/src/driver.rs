//! Run orchestration: oracle → top-2 extraction → metrics and record set →
//! final priority order.
//!
//! The run is strictly sequential. Per-item failures are logged and counted
//! in [`RunStats`]; only corpus-level failures abort the run.

use crate::config::Config;
use crate::error::{Result, SourceError};
use crate::ranking::{
    AggregateReport, ConfidenceExtractor, MetricsAccumulator, PrioritizationEngine,
    RankingStrategy, Strategy,
};
use crate::sampling::SamplingPolicy;
use crate::source::{GroundTruth, LabelSet, Oracle};
use crate::types::{normalize_label, RankingRecord, RunStats};

/// What happened to one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Ranked, no ground truth available
    Scored,
    /// Ranked and counted toward metrics
    Evaluated,
    /// Dropped by the sampling policy
    SampledOut,
    /// The oracle does not handle this item
    NotApplicable,
    /// The oracle has no prediction for this item
    NotFound,
    /// Predictions were unusable (empty, invalid score, duplicate item)
    Rejected,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Records in priority order (front is labeled first)
    pub records: Vec<RankingRecord>,

    /// Accuracy report, present when a ground-truth source was supplied
    pub metrics: Option<AggregateReport>,

    pub stats: RunStats,

    pub strategy: Strategy,
}

impl RunOutcome {
    /// Item identifiers in priority order.
    pub fn order(&self) -> Vec<&str> {
        self.records.iter().map(RankingRecord::item).collect()
    }
}

/// One prioritization run over a stream of items.
pub struct ActiveLearningRun<'a> {
    oracle: &'a dyn Oracle,
    truth: Option<&'a dyn GroundTruth>,
    labels: Option<LabelSet>,
    extractor: ConfidenceExtractor,
    sampling: SamplingPolicy,
    strategy: Strategy,
    ranker: Box<dyn RankingStrategy>,
    metrics: MetricsAccumulator,
    engine: PrioritizationEngine,
    stats: RunStats,
}

impl<'a> ActiveLearningRun<'a> {
    /// Set up a run from configuration.
    ///
    /// Loads the configured labels file, if any; a missing file aborts here,
    /// before any item is processed.
    pub fn new(
        config: &Config,
        oracle: &'a dyn Oracle,
        truth: Option<&'a dyn GroundTruth>,
    ) -> Result<Self> {
        config.validate()?;

        let labels = match config.labels_file() {
            Some(path) => Some(LabelSet::load(&path)?),
            None => None,
        };

        let prioritization = &config.prioritization;
        if !prioritization.strategy.is_stratified()
            && prioritization.presort != crate::ranking::Presort::None
        {
            tracing::warn!(
                "presort is ignored by the {} strategy",
                prioritization.strategy
            );
        }

        let mut metrics = MetricsAccumulator::new();
        if let Some(truth) = truth {
            for label in truth.known_labels() {
                metrics.register_label(&label);
            }
        }

        Ok(Self {
            oracle,
            truth,
            labels,
            extractor: ConfidenceExtractor::new(prioritization.tie_break),
            sampling: SamplingPolicy::from_config(&config.sampling)?,
            strategy: prioritization.strategy,
            ranker: prioritization.strategy.build(prioritization.presort),
            metrics,
            engine: PrioritizationEngine::new(),
            stats: RunStats::default(),
        })
    }

    /// Process every item, then finish.
    pub fn run<I, S>(mut self, items: I) -> Result<RunOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in items {
            self.step(item.as_ref());
        }
        self.finish()
    }

    /// Process a single item.
    pub fn step(&mut self, item: &str) -> ItemOutcome {
        let outcome = self.process(item);
        match outcome {
            ItemOutcome::Scored => self.stats.scored += 1,
            ItemOutcome::Evaluated => {
                self.stats.scored += 1;
                self.stats.evaluated += 1;
            }
            ItemOutcome::SampledOut => self.stats.sampled_out += 1,
            ItemOutcome::NotApplicable => self.stats.not_applicable += 1,
            ItemOutcome::NotFound => self.stats.not_found += 1,
            ItemOutcome::Rejected => self.stats.rejected += 1,
        }
        outcome
    }

    fn process(&mut self, item: &str) -> ItemOutcome {
        if !self.sampling.keep() {
            return ItemOutcome::SampledOut;
        }

        let mut scores = match self.oracle.predict(item) {
            Ok(scores) => scores,
            Err(SourceError::NotApplicable { reason, .. }) => {
                tracing::debug!("Skipping {item}: {reason}");
                return ItemOutcome::NotApplicable;
            }
            Err(SourceError::ItemNotFound(_)) => {
                tracing::warn!("No prediction for {item}");
                return ItemOutcome::NotFound;
            }
            Err(e) => {
                tracing::warn!("Oracle failed for {item}: {e}");
                return ItemOutcome::Rejected;
            }
        };

        if let Some(labels) = &self.labels {
            scores.retain_labels(|l| labels.contains(l));
        }

        let record = match scores
            .validate()
            .and_then(|_| self.extractor.record(item, &scores))
        {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping {item}: {e}");
                return ItemOutcome::Rejected;
            }
        };

        let truth = self
            .truth
            .and_then(|t| t.label_of(item))
            .map(|l| normalize_label(&l));

        // Metrics only count items that made it into the record set
        let snapshot = truth.as_ref().map(|_| record.clone());
        if let Err(e) = self.engine.push(record) {
            tracing::warn!("Skipping {item}: {e}");
            return ItemOutcome::Rejected;
        }

        match (truth, snapshot) {
            (Some(label), Some(record)) => {
                self.metrics.observe(&label, &record);
                ItemOutcome::Evaluated
            }
            _ => ItemOutcome::Scored,
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Compute the report and the priority order.
    ///
    /// With a ground-truth source, an empty corpus is an error.
    pub fn finish(self) -> Result<RunOutcome> {
        let metrics = match self.truth {
            Some(_) => Some(self.metrics.report()?),
            None => None,
        };

        let records: Vec<RankingRecord> = self
            .engine
            .order(self.ranker.as_ref())
            .into_iter()
            .cloned()
            .collect();

        tracing::info!(
            "Ranked {} item(s) with {} ({} evaluated, {} skipped)",
            records.len(),
            self.strategy,
            self.stats.evaluated,
            self.stats.skipped()
        );

        Ok(RunOutcome {
            records,
            metrics,
            stats: self.stats,
            strategy: self.strategy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CurateError, RankingError};
    use crate::types::ScoreMap;
    use std::collections::HashMap;

    struct MapOracle(HashMap<&'static str, Vec<(&'static str, f32)>>);

    impl Oracle for MapOracle {
        fn predict(&self, item: &str) -> std::result::Result<ScoreMap, SourceError> {
            if item.ends_with(".txt") {
                return Err(SourceError::NotApplicable {
                    item: item.to_string(),
                    reason: "not an image".into(),
                });
            }
            self.0
                .get(item)
                .map(|pairs| ScoreMap::from_pairs(pairs.iter().copied()))
                .ok_or_else(|| SourceError::ItemNotFound(item.to_string()))
        }
    }

    struct MapTruth(HashMap<&'static str, &'static str>);

    impl GroundTruth for MapTruth {
        fn label_of(&self, item: &str) -> Option<String> {
            self.0.get(item).map(|l| l.to_string())
        }
    }

    fn oracle() -> MapOracle {
        MapOracle(HashMap::from([
            ("i0", vec![("cat", 0.9), ("dog", 0.1)]),
            ("i1", vec![("dog", 0.3), ("cat", 0.25)]),
            ("i2", vec![("cat", 0.6), ("dog", 0.4)]),
            ("empty", vec![]),
        ]))
    }

    #[test]
    fn test_run_without_ground_truth() {
        let oracle = oracle();
        let run = ActiveLearningRun::new(&Config::default(), &oracle, None).unwrap();
        let outcome = run.run(["i0", "i1", "i2"]).unwrap();
        assert_eq!(outcome.order(), ["i1", "i2", "i0"]);
        assert!(outcome.metrics.is_none());
        assert_eq!(outcome.stats.scored, 3);
    }

    #[test]
    fn test_run_skips_per_item_failures() {
        let oracle = oracle();
        let run = ActiveLearningRun::new(&Config::default(), &oracle, None).unwrap();
        let outcome = run
            .run(["i0", "notes.txt", "missing", "empty", "i0"])
            .unwrap();
        assert_eq!(outcome.order(), ["i0"]);
        assert_eq!(outcome.stats.not_applicable, 1);
        assert_eq!(outcome.stats.not_found, 1);
        // empty score map and the duplicate i0
        assert_eq!(outcome.stats.rejected, 2);
    }

    #[test]
    fn test_run_with_ground_truth() {
        let oracle = oracle();
        let truth = MapTruth(HashMap::from([("i0", "cat"), ("i1", "Cat"), ("i2", "cat")]));
        let run = ActiveLearningRun::new(&Config::default(), &oracle, Some(&truth)).unwrap();
        let outcome = run.run(["i0", "i1", "i2"]).unwrap();

        let metrics = outcome.metrics.unwrap();
        let cat = &metrics.labels["cat"];
        assert_eq!(cat.counters.true_positives, 2);
        assert_eq!(cat.counters.false_negatives, 1);
        assert_eq!(metrics.total_items, 3);
        assert_eq!(outcome.stats.evaluated, 3);
    }

    #[test]
    fn test_empty_corpus_is_fatal_with_ground_truth() {
        let oracle = oracle();
        let truth = MapTruth(HashMap::new());
        let run = ActiveLearningRun::new(&Config::default(), &oracle, Some(&truth)).unwrap();
        let err = run.run(["i0"]).unwrap_err();
        assert!(matches!(
            err,
            CurateError::Ranking(RankingError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_missing_labels_file_is_fatal() {
        let oracle = oracle();
        let mut config = Config::default();
        config.input.labels_file = Some("/nonexistent/output_labels.txt".into());
        let err = ActiveLearningRun::new(&config, &oracle, None).err().unwrap();
        assert!(matches!(
            err,
            CurateError::Source(SourceError::MissingResource(_))
        ));
    }

    #[test]
    fn test_labels_file_filters_scores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "cat\n").unwrap();

        let oracle = oracle();
        let mut config = Config::default();
        config.input.labels_file = Some(path.to_string_lossy().into_owned());
        let run = ActiveLearningRun::new(&config, &oracle, None).unwrap();
        let outcome = run.run(["i1"]).unwrap();
        let record = &outcome.records[0];
        assert_eq!(record.top_label(), "cat");
        assert!(record.ratio().is_none());
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let oracle = oracle();
        let mut config = Config::default();
        config.sampling.fraction = Some(0.5);
        config.sampling.seed = 3;
        let items = ["i0", "i1", "i2"];

        let a = ActiveLearningRun::new(&config, &oracle, None)
            .unwrap()
            .run(items)
            .unwrap();
        let b = ActiveLearningRun::new(&config, &oracle, None)
            .unwrap()
            .run(items)
            .unwrap();
        assert_eq!(a.order(), b.order());
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.stats.scored + a.stats.sampled_out, 3);
    }
}
