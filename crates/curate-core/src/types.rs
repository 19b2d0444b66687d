//! Core data types for the Curate prioritization pipeline.
//!
//! These types carry per-item oracle output through extraction and into the
//! ranked record set.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{RankingError, RankingResult};

/// Normalize a label name: lowercase, with every run of characters outside
/// `[a-z0-9]` collapsed to a single space.
///
/// `"Golden_Retriever"` becomes `"golden retriever"`. Leading and trailing
/// separators are kept as a single space so that names derived from
/// directories match names the classifier was trained with.
pub fn normalize_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_gap = false;
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
            in_gap = false;
        } else if !in_gap {
            out.push(' ');
            in_gap = true;
        }
    }
    out
}

/// A single (label, confidence) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Normalized label name
    pub label: String,

    /// Confidence score, expected in [0, 1]
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Label → confidence mapping returned by the oracle for one item.
///
/// Iteration follows insertion order, which is what first-seen tie-breaking
/// in top-2 extraction relies on. Scores do not need to sum to 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreMap {
    entries: Vec<Prediction>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a score map from raw (label, score) pairs, normalizing labels.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for (label, score) in pairs {
            map.insert(label.as_ref(), score);
        }
        map
    }

    /// Insert a score. A label that is already present keeps its position and
    /// takes the new score.
    pub fn insert(&mut self, label: &str, score: f32) {
        let label = normalize_label(label);
        match self.entries.iter_mut().find(|p| p.label == label) {
            Some(existing) => existing.score = score,
            None => self.entries.push(Prediction { label, score }),
        }
    }

    pub fn get(&self, label: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.score)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prediction> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject blank label names and NaN or infinite scores.
    pub fn validate(&self) -> RankingResult<()> {
        if let Some(blank) = self.entries.iter().find(|p| p.label.trim().is_empty()) {
            return Err(RankingError::BlankLabel { score: blank.score });
        }
        match self.entries.iter().find(|p| !p.score.is_finite()) {
            Some(bad) => Err(RankingError::InvalidScore {
                label: bad.label.clone(),
                score: bad.score,
            }),
            None => Ok(()),
        }
    }

    /// Keep only the `k` highest-scoring labels.
    ///
    /// Surviving entries keep their original relative order. Among equal
    /// scores at the cut-off, earlier entries survive.
    pub fn truncate_top_k(&mut self, k: usize) {
        if self.entries.len() <= k {
            return;
        }
        let mut ranked: Vec<usize> = (0..self.entries.len()).collect();
        ranked.sort_by(|&a, &b| {
            self.entries[b]
                .score
                .total_cmp(&self.entries[a].score)
        });
        let mut keep = vec![false; self.entries.len()];
        for &idx in ranked.iter().take(k) {
            keep[idx] = true;
        }
        let mut flags = keep.into_iter();
        self.entries.retain(|_| flags.next().unwrap_or(false));
    }

    /// Drop entries whose label fails the predicate.
    pub fn retain_labels<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.entries.retain(|p| keep(&p.label));
    }
}

impl Serialize for ScoreMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for p in &self.entries {
            map.serialize_entry(&p.label, &p.score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreMapVisitor;

        impl<'de> Visitor<'de> for ScoreMapVisitor {
            type Value = ScoreMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of label names to confidence scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ScoreMap, A::Error> {
                let mut map = ScoreMap::new();
                while let Some((label, score)) = access.next_entry::<String, f32>()? {
                    map.insert(&label, score);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ScoreMapVisitor)
    }
}

/// What the prioritization engine knows about one item.
///
/// Built once from the item's top-2 predictions and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRecord {
    item: String,
    top: Prediction,
    #[serde(skip_serializing_if = "Option::is_none")]
    second: Option<Prediction>,
    /// `top / second`, absent when there is no usable second prediction
    ratio: Option<f32>,
}

impl RankingRecord {
    pub(crate) fn new(
        item: impl Into<String>,
        top: Prediction,
        second: Option<Prediction>,
        ratio: Option<f32>,
    ) -> Self {
        Self {
            item: item.into(),
            top,
            second,
            ratio,
        }
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn top_label(&self) -> &str {
        &self.top.label
    }

    pub fn top_score(&self) -> f32 {
        self.top.score
    }

    /// Second label, empty when the oracle returned a single label.
    pub fn second_label(&self) -> &str {
        self.second.as_ref().map_or("", |p| p.label.as_str())
    }

    /// Second score, zero when the oracle returned a single label.
    pub fn second_score(&self) -> f32 {
        self.second.as_ref().map_or(0.0, |p| p.score)
    }

    pub fn ratio(&self) -> Option<f32> {
        self.ratio
    }
}

/// Counters for one prioritization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Items that produced a ranking record
    pub scored: usize,

    /// Scored items that also had ground truth
    pub evaluated: usize,

    /// Items dropped by the sampling policy
    pub sampled_out: usize,

    /// Items the oracle could not handle
    pub not_applicable: usize,

    /// Items the oracle had no prediction for
    pub not_found: usize,

    /// Items with no usable predictions (empty map, bad score, duplicate id)
    pub rejected: usize,
}

impl RunStats {
    pub fn skipped(&self) -> usize {
        self.sampled_out + self.not_applicable + self.not_found + self.rejected
    }
}
