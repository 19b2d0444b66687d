//! Prioritization strategies for choosing which items to label next.
//!
//! Each strategy turns the full record set into a priority order (front is
//! labeled first). Sorting strategies are stable, so records with equal keys
//! keep their input order. Stratified strategies interleave per-key queues
//! one record per queue per round, visiting queues in first-seen key order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;

use crate::types::RankingRecord;

/// A policy for ordering ranked items.
pub trait RankingStrategy: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Return `records` in priority order.
    fn order<'a>(&self, records: &'a [RankingRecord]) -> Vec<&'a RankingRecord>;
}

/// Strategy selection, as it appears in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Lowest top confidence first
    #[default]
    LeastConfidentFirst,
    /// Smallest top/second ratio first
    ClosestRatioFirst,
    /// Round-robin across predicted labels
    LabelStratified,
    /// Round-robin across (top, second) predicted label pairs
    LabelPairStratified,
}

impl Strategy {
    /// Instantiate the selected strategy.
    ///
    /// `presort` only affects the stratified strategies.
    pub fn build(self, presort: Presort) -> Box<dyn RankingStrategy> {
        match self {
            Strategy::LeastConfidentFirst => Box::new(LeastConfidentFirst),
            Strategy::ClosestRatioFirst => Box::new(ClosestRatioFirst),
            Strategy::LabelStratified => Box::new(LabelStratified { presort }),
            Strategy::LabelPairStratified => Box::new(LabelPairStratified { presort }),
        }
    }

    pub fn is_stratified(self) -> bool {
        matches!(
            self,
            Strategy::LabelStratified | Strategy::LabelPairStratified
        )
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::LeastConfidentFirst => write!(f, "least-confident-first"),
            Strategy::ClosestRatioFirst => write!(f, "closest-ratio-first"),
            Strategy::LabelStratified => write!(f, "label-stratified"),
            Strategy::LabelPairStratified => write!(f, "label-pair-stratified"),
        }
    }
}

/// Ordering applied inside each stratum before interleaving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Presort {
    /// Keep input order
    #[default]
    None,
    LeastConfident,
    ClosestRatio,
}

impl Presort {
    fn apply<'a>(self, records: &'a [RankingRecord]) -> Vec<&'a RankingRecord> {
        let mut refs: Vec<&RankingRecord> = records.iter().collect();
        match self {
            Presort::None => {}
            Presort::LeastConfident => refs.sort_by(|a, b| by_top_score(a, b)),
            Presort::ClosestRatio => refs.sort_by(|a, b| by_ratio(a, b)),
        }
        refs
    }
}

fn by_top_score(a: &RankingRecord, b: &RankingRecord) -> Ordering {
    a.top_score().total_cmp(&b.top_score())
}

/// Undefined ratios sort after every defined one.
fn by_ratio(a: &RankingRecord, b: &RankingRecord) -> Ordering {
    match (a.ratio(), b.ratio()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Interleave records across per-key queues until every queue is drained.
fn round_robin<'a, K, F>(records: Vec<&'a RankingRecord>, key: F) -> Vec<&'a RankingRecord>
where
    K: Eq + Hash,
    F: Fn(&'a RankingRecord) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut queues: Vec<VecDeque<&'a RankingRecord>> = Vec::new();

    for record in records {
        let slot = *index.entry(key(record)).or_insert_with(|| {
            queues.push(VecDeque::new());
            queues.len() - 1
        });
        queues[slot].push_back(record);
    }

    let total = queues.iter().map(VecDeque::len).sum();
    let mut out = Vec::with_capacity(total);
    while out.len() < total {
        for queue in queues.iter_mut() {
            if let Some(record) = queue.pop_front() {
                out.push(record);
            }
        }
    }
    out
}

/// Items the oracle is least sure about come first.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastConfidentFirst;

impl RankingStrategy for LeastConfidentFirst {
    fn name(&self) -> &'static str {
        "least-confident-first"
    }

    fn order<'a>(&self, records: &'a [RankingRecord]) -> Vec<&'a RankingRecord> {
        Presort::LeastConfident.apply(records)
    }
}

/// Items whose top two labels are nearly tied come first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosestRatioFirst;

impl RankingStrategy for ClosestRatioFirst {
    fn name(&self) -> &'static str {
        "closest-ratio-first"
    }

    fn order<'a>(&self, records: &'a [RankingRecord]) -> Vec<&'a RankingRecord> {
        Presort::ClosestRatio.apply(records)
    }
}

/// Spreads output evenly across predicted labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelStratified {
    pub presort: Presort,
}

impl RankingStrategy for LabelStratified {
    fn name(&self) -> &'static str {
        "label-stratified"
    }

    fn order<'a>(&self, records: &'a [RankingRecord]) -> Vec<&'a RankingRecord> {
        round_robin(self.presort.apply(records), |r| r.top_label())
    }
}

/// Spreads output evenly across (top, second) predicted label pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelPairStratified {
    pub presort: Presort,
}

impl RankingStrategy for LabelPairStratified {
    fn name(&self) -> &'static str {
        "label-pair-stratified"
    }

    fn order<'a>(&self, records: &'a [RankingRecord]) -> Vec<&'a RankingRecord> {
        round_robin(self.presort.apply(records), |r| {
            (r.top_label(), r.second_label())
        })
    }
}
