use crate::identity::ObjectIdentity;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

/// One rendered field traced back to its template line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingNode {
    pub object_identity: Arc<ObjectIdentity>,
    pub field_path: String,
    /// Scalar value; empty for container nodes.
    pub value: String,
    pub template_file: String,
    pub template_line: usize,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("field path `{path}` is already mapped to template line {existing_line}")]
pub struct DuplicatePathError {
    pub path: String,
    pub existing_line: usize,
}

/// All traced fields of one rendered document, keyed by field path.
///
/// Write-once per key: there is no update or removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingNodes {
    #[serde(rename = "nodes")]
    entries: BTreeMap<String, MappingNode>,
    template_file: String,
}

impl MappingNodes {
    pub fn new(template_file: impl Into<String>) -> Self {
        Self {
            entries: BTreeMap::new(),
            template_file: template_file.into(),
        }
    }

    /// # Errors
    ///
    /// Returns an error, leaving the existing entry untouched, if `path` is
    /// already present.
    pub fn insert(&mut self, path: impl Into<String>, node: MappingNode) -> Result<(), DuplicatePathError> {
        match self.entries.entry(path.into()) {
            Entry::Occupied(existing) => Err(DuplicatePathError {
                path: existing.key().clone(),
                existing_line: existing.get().template_line,
            }),
            Entry::Vacant(slot) => {
                slot.insert(node);
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn template_file(&self) -> &str {
        &self.template_file
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&MappingNode> {
        self.entries.get(path)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by field path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a MappingNodes {
    type Item = (&'a String, &'a MappingNode);
    type IntoIter = std::collections::btree_map::Iter<'a, String, MappingNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: &str, line: usize) -> MappingNode {
        MappingNode {
            object_identity: Arc::new(ObjectIdentity::new("v1", "ConfigMap")),
            field_path: path.to_string(),
            value: "x".to_string(),
            template_file: "cm.yaml".to_string(),
            template_line: line,
        }
    }

    #[test]
    fn duplicate_insert_is_rejected_and_keeps_first() {
        let mut nodes = MappingNodes::new("cm.yaml");
        assert_eq!(nodes.insert("data.a", node("data.a", 3)), Ok(()));
        assert_eq!(
            nodes.insert("data.a", node("data.a", 9)),
            Err(DuplicatePathError {
                path: "data.a".to_string(),
                existing_line: 3,
            })
        );
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes.get("data.a").map(|n| n.template_line), Some(3));
    }

    #[test]
    fn iteration_is_ordered_by_path() {
        let mut nodes = MappingNodes::new("cm.yaml");
        for (path, line) in [("data.b", 2), ("data.a", 1), ("data", 0)] {
            nodes.insert(path, node(path, line)).unwrap();
        }
        assert_eq!(nodes.paths().collect::<Vec<_>>(), vec!["data", "data.a", "data.b"]);
        assert_eq!(nodes.template_file(), "cm.yaml");
    }
}
