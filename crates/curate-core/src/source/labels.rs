//! Labels file: the set of class names the classifier can emit.

use std::collections::HashSet;
use std::path::Path;

use crate::error::SourceError;
use crate::types::normalize_label;

/// Known label names, normalized, in file order.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    labels: Vec<String>,
    index: HashSet<String>,
}

impl LabelSet {
    /// Read one label per line. Blank lines are ignored.
    ///
    /// A missing file is `MissingResource`.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        if !path.is_file() {
            return Err(SourceError::MissingResource(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|_| SourceError::MissingResource(path.to_path_buf()))?;
        let set = Self::from_labels(content.lines().map(str::trim_end).filter(|l| !l.is_empty()));
        tracing::debug!("Loaded {} label(s) from {:?}", set.len(), path);
        Ok(set)
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for raw in labels {
            let label = normalize_label(raw.as_ref());
            if set.index.insert(label.clone()) {
                set.labels.push(label);
            }
        }
        set
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains(label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_normalizes_and_dedups() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Golden_Retriever").unwrap();
        writeln!(file, "tabby cat  ").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "golden retriever").unwrap();

        let set = LabelSet::load(file.path()).unwrap();
        assert_eq!(set.labels(), ["golden retriever", "tabby cat"]);
        assert!(set.contains("tabby cat"));
        assert!(!set.contains("Tabby Cat"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = LabelSet::load(Path::new("/nonexistent/output_labels.txt")).unwrap_err();
        assert!(matches!(err, SourceError::MissingResource(_)));
    }
}
