//! Class index to label mapping stored next to the model

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ClassrError, Resource, Result};

/// Index-to-label lookup produced alongside a trained model
///
/// On disk this is a JSON object keyed by the decimal class index, e.g.
/// `{"0": "cat", "1": "dog"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    labels: BTreeMap<String, String>,
}

impl ClassMap {
    /// Load a class map from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ClassrError::not_found(Resource::ClassMap, path),
            _ => ClassrError::Io(e),
        })?;

        let labels: BTreeMap<String, String> =
            serde_json::from_str(&content).map_err(|e| ClassrError::ClassMap {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if labels.is_empty() {
            return Err(ClassrError::ClassMap {
                path: path.to_path_buf(),
                message: "no classes defined".to_string(),
            });
        }

        Ok(Self { labels })
    }

    /// Label for a class index
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(&index.to_string()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Whether `label` is one of the known classes
    pub fn contains_label(&self, label: &str) -> bool {
        self.labels.values().any(|l| l == label)
    }

    /// Iterate `(index key, label)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        std::fs::write(&path, r#"{"0": "cat", "1": "dog", "10": "fox"}"#).unwrap();

        let classes = ClassMap::load(&path).unwrap();
        assert_eq!(classes.len(), 3);
        assert_eq!(classes.label(0), Some("cat"));
        assert_eq!(classes.label(10), Some("fox"));
        assert_eq!(classes.label(2), None);
        assert!(classes.contains_label("dog"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClassMap::load(&dir.path().join("classes.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_map_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");

        std::fs::write(&path, r#"["cat", "dog"]"#).unwrap();
        assert!(matches!(
            ClassMap::load(&path),
            Err(ClassrError::ClassMap { .. })
        ));

        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(
            ClassMap::load(&path),
            Err(ClassrError::ClassMap { .. })
        ));
    }
}
