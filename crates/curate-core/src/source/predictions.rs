//! Precomputed classifier output read from a JSON Lines file.
//!
//! Each line is one item:
//!
//! ```text
//! {"item": "raw/cat/001.jpg", "scores": {"cat": 0.81, "dog": 0.12}, "label": "cat"}
//! ```
//!
//! `label` is optional ground truth. Score-map key order is preserved.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::config::InputConfig;
use crate::error::SourceError;
use crate::types::{normalize_label, ScoreMap};

use super::{check_format, normalize_item, GroundTruth, Oracle};

#[derive(Debug, Deserialize)]
struct PredictionLine {
    item: String,
    scores: ScoreMap,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    scores: ScoreMap,
    label: Option<String>,
}

/// An oracle backed by predictions that were computed ahead of time.
#[derive(Debug, Clone)]
pub struct PredictionSet {
    items: Vec<String>,
    entries: HashMap<String, Entry>,
    num_top_predictions: usize,
    supported_formats: Vec<String>,
}

impl PredictionSet {
    /// Load a predictions file. A missing file is `MissingResource`.
    pub fn load(path: &Path, config: &InputConfig) -> Result<Self, SourceError> {
        if !path.is_file() {
            return Err(SourceError::MissingResource(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|_| SourceError::MissingResource(path.to_path_buf()))?;
        let set = Self::parse(&content, config).map_err(|(line, message)| {
            SourceError::Malformed {
                path: path.to_path_buf(),
                line,
                message,
            }
        })?;
        tracing::info!(
            "Loaded predictions for {} item(s) from {:?}",
            set.len(),
            path
        );
        Ok(set)
    }

    /// Parse JSONL content. Errors carry the 1-based line number.
    fn parse(content: &str, config: &InputConfig) -> Result<Self, (usize, String)> {
        let mut set = Self {
            items: Vec::new(),
            entries: HashMap::new(),
            num_top_predictions: config.num_top_predictions,
            supported_formats: config.supported_formats.clone(),
        };

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parsed: PredictionLine =
                serde_json::from_str(line).map_err(|e| (idx + 1, e.to_string()))?;
            set.insert(
                parsed.item,
                parsed.scores,
                parsed.label.as_deref().map(normalize_label),
            );
        }
        Ok(set)
    }

    fn insert(&mut self, item: String, scores: ScoreMap, label: Option<String>) {
        let item = normalize_item(&item);
        let entry = Entry { scores, label };
        if self.entries.insert(item.clone(), entry).is_some() {
            tracing::warn!("Duplicate predictions for {item}; keeping the last one");
        } else {
            self.items.push(item);
        }
    }

    /// Item identifiers in file order.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether there is a prediction for `item`.
    pub fn contains(&self, item: &str) -> bool {
        self.entries.contains_key(&normalize_item(item))
    }

    /// Whether any item carries a ground-truth label.
    pub fn has_labels(&self) -> bool {
        self.entries.values().any(|e| e.label.is_some())
    }
}

impl Oracle for PredictionSet {
    fn predict(&self, item: &str) -> Result<ScoreMap, SourceError> {
        check_format(item, &self.supported_formats)?;
        let entry = self
            .entries
            .get(&normalize_item(item))
            .ok_or_else(|| SourceError::ItemNotFound(item.to_string()))?;
        let mut scores = entry.scores.clone();
        scores.truncate_top_k(self.num_top_predictions);
        Ok(scores)
    }
}

impl GroundTruth for PredictionSet {
    fn label_of(&self, item: &str) -> Option<String> {
        self.entries
            .get(&normalize_item(item))
            .and_then(|e| e.label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"item": "raw/cat/1.jpg", "scores": {"cat": 0.7, "dog": 0.2, "fox": 0.1}, "label": "Cat"}

{"item": "raw/dog/2.jpg", "scores": {"dog": 0.55, "cat": 0.45}}
{"item": "raw/dog/3.png", "scores": {"dog": 0.9}}
"#;

    fn config(k: usize) -> InputConfig {
        InputConfig {
            num_top_predictions: k,
            ..InputConfig::default()
        }
    }

    #[test]
    fn test_parse_items_in_order() {
        let set = PredictionSet::parse(SAMPLE, &config(5)).unwrap();
        let items: Vec<&str> = set.items().collect();
        assert_eq!(items, ["raw/cat/1.jpg", "raw/dog/2.jpg", "raw/dog/3.png"]);
        assert!(set.has_labels());
    }

    #[test]
    fn test_ground_truth_normalized() {
        let set = PredictionSet::parse(SAMPLE, &config(5)).unwrap();
        assert_eq!(set.label_of("raw/cat/1.jpg").as_deref(), Some("cat"));
        assert_eq!(set.label_of("raw/dog/2.jpg"), None);
    }

    #[test]
    fn test_predict_truncates_to_top_k() {
        let set = PredictionSet::parse(SAMPLE, &config(2)).unwrap();
        let scores = set.predict("raw/cat/1.jpg").unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores.get("fox").is_none());
    }

    #[test]
    fn test_predict_unsupported_and_missing() {
        let set = PredictionSet::parse(SAMPLE, &config(5)).unwrap();
        assert!(matches!(
            set.predict("raw/dog/3.png"),
            Err(SourceError::NotApplicable { .. })
        ));
        assert!(matches!(
            set.predict("raw/dog/404.jpg"),
            Err(SourceError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_item_ids_ignore_leading_dot() {
        let content = "{\"item\": \"./raw/cat/1.jpg\", \"scores\": {\"cat\": 0.9}, \"label\": \"cat\"}\n";
        let set = PredictionSet::parse(content, &config(5)).unwrap();
        assert_eq!(set.items().collect::<Vec<_>>(), ["raw/cat/1.jpg"]);
        assert!(set.contains("raw/cat/1.jpg"));
        assert!(set.contains("./raw/cat/1.jpg"));
        assert!(set.predict("raw/cat/1.jpg").is_ok());
        assert_eq!(set.label_of("./raw/cat/1.jpg").as_deref(), Some("cat"));
    }

    #[test]
    fn test_parse_reports_line_number() {
        let content = "{\"item\": \"a.jpg\", \"scores\": {}}\nnot json\n";
        let (line, _) = PredictionSet::parse(content, &config(5)).unwrap_err();
        assert_eq!(line, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PredictionSet::load(Path::new("/nonexistent/preds.jsonl"), &config(5))
            .unwrap_err();
        assert!(matches!(err, SourceError::MissingResource(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preds.jsonl");
        std::fs::write(&path, SAMPLE).unwrap();
        let set = PredictionSet::load(&path, &config(5)).unwrap();
        assert_eq!(set.len(), 3);
    }
}
