//! External collaborators: the prediction oracle and the ground-truth source.
//!
//! The ranking core treats the classifier as opaque. It only needs a label →
//! confidence map per item, and, for evaluation runs, the item's true label.

pub mod directory;
pub mod labels;
pub mod predictions;

pub use directory::DirectoryLabels;
pub use labels::LabelSet;
pub use predictions::PredictionSet;

use std::path::{Component, Path, PathBuf};

use crate::error::SourceError;
use crate::types::ScoreMap;

/// Produces a score map for one item.
///
/// `NotApplicable` and `ItemNotFound` are per-item conditions: the driver
/// skips the item and continues.
pub trait Oracle {
    fn predict(&self, item: &str) -> Result<ScoreMap, SourceError>;
}

impl<F> Oracle for F
where
    F: Fn(&str) -> Result<ScoreMap, SourceError>,
{
    fn predict(&self, item: &str) -> Result<ScoreMap, SourceError> {
        self(item)
    }
}

/// Knows the true label of (some) items.
pub trait GroundTruth {
    /// Normalized true label, or `None` when unknown.
    fn label_of(&self, item: &str) -> Option<String>;

    /// Every label this source can produce, including labels with no items.
    ///
    /// These are reported even if none of their items end up scored.
    fn known_labels(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Canonical item identifier: `./` components are dropped, so `./data/a.jpg`
/// and `data/a.jpg` name the same item.
pub fn normalize_item(item: &str) -> String {
    Path::new(item)
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

/// Check an item's extension against an allow-list (case-insensitive).
///
/// An empty list accepts every item.
pub(crate) fn check_format(item: &str, supported: &[String]) -> Result<(), SourceError> {
    if supported.is_empty() {
        return Ok(());
    }
    let ext = Path::new(item)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext {
        Some(ext) if supported.iter().any(|f| f.to_lowercase() == ext) => Ok(()),
        Some(ext) => Err(SourceError::NotApplicable {
            item: item.to_string(),
            reason: format!("unsupported extension .{ext}"),
        }),
        None => Err(SourceError::NotApplicable {
            item: item.to_string(),
            reason: "no file extension".to_string(),
        }),
    }
}
