//! Ground truth from a labeled directory tree.
//!
//! Layout: `<root>/<label>/<item files...>`. Each immediate subdirectory of
//! the root names one label (normalized); every file beneath it belongs to
//! that label.

use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::SourceError;
use crate::types::normalize_label;

use super::{normalize_item, GroundTruth};

/// Items and their labels discovered under a root directory.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLabels {
    labels: Vec<String>,
    items: Vec<String>,
    by_item: HashMap<String, String>,
}

impl DirectoryLabels {
    /// Scan `root`. A missing root is `MissingResource`.
    ///
    /// Labels and items come back sorted by path so repeated scans agree.
    pub fn scan(root: &Path) -> Result<Self, SourceError> {
        if !root.is_dir() {
            return Err(SourceError::MissingResource(root.to_path_buf()));
        }

        let mut label_dirs: Vec<_> = std::fs::read_dir(root)
            .map_err(|_| SourceError::MissingResource(root.to_path_buf()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        label_dirs.sort();

        let mut scanned = Self::default();
        for dir in label_dirs {
            let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!("Skipping label directory with non-UTF-8 name: {:?}", dir);
                continue;
            };
            let label = normalize_label(name);
            if !scanned.labels.contains(&label) {
                scanned.labels.push(label.clone());
            }

            let mut files: Vec<String> = WalkDir::new(&dir)
                .follow_links(true)
                .min_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| normalize_item(&e.path().to_string_lossy()))
                .collect();
            files.sort();

            for item in files {
                scanned.by_item.insert(item.clone(), label.clone());
                scanned.items.push(item);
            }
        }

        tracing::info!(
            "Found {} item(s) across {} label director(ies) in {:?}",
            scanned.items.len(),
            scanned.labels.len(),
            root
        );
        Ok(scanned)
    }

    /// Item identifiers (file paths), grouped by label directory.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl GroundTruth for DirectoryLabels {
    fn label_of(&self, item: &str) -> Option<String> {
        self.by_item.get(&normalize_item(item)).cloned()
    }

    fn known_labels(&self) -> Vec<String> {
        self.labels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_scan_labels_and_items() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("Tabby_Cat/b.jpg"));
        touch(&root.join("Tabby_Cat/a.jpg"));
        touch(&root.join("dog/x.jpg"));
        std::fs::create_dir_all(root.join("empty")).unwrap();
        touch(&root.join("stray.txt"));

        let labels = DirectoryLabels::scan(root).unwrap();
        assert_eq!(labels.labels(), ["tabby cat", "dog", "empty"]);
        assert_eq!(labels.len(), 3);

        let items: Vec<&str> = labels.items().collect();
        assert!(items[0].ends_with("a.jpg"));
        assert!(items[1].ends_with("b.jpg"));
        assert!(items[2].ends_with("x.jpg"));

        assert_eq!(labels.label_of(items[0]).as_deref(), Some("tabby cat"));
        assert_eq!(labels.label_of(items[2]).as_deref(), Some("dog"));
        assert_eq!(labels.known_labels().len(), 3);
    }

    #[test]
    fn test_item_ids_drop_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("cat/a.jpg"));
        let root = dir.path().join(".");

        let labels = DirectoryLabels::scan(&root).unwrap();
        let item = labels.items().next().unwrap().to_string();
        assert!(!item.contains("/./"));
        assert_eq!(item, dir.path().join("cat/a.jpg").to_string_lossy());
        assert_eq!(labels.label_of(&item).as_deref(), Some("cat"));
    }

    #[test]
    fn test_scan_missing_root() {
        let err = DirectoryLabels::scan(Path::new("/nonexistent/test_data")).unwrap_err();
        assert!(matches!(err, SourceError::MissingResource(_)));
    }
}
