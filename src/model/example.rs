//! Example model for Lobe projects.
//!
//! An example is one labeled image in a Lobe project. The metadata reader
//! produces them in a fixed order, and every later stage relies on that
//! order: fingerprints are attached by position, not by id.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use serde::Serialize;

use crate::error::{Error, Result};

/// One labeled example read from the project database.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleRecord {
    /// Opaque example identifier, rendered as text.
    pub example_id: String,

    /// Content hash naming the blob file under `data/blobs`.
    pub content_hash: String,

    /// Original file name from the image metadata JSON.
    pub filename: Option<String>,

    /// Classification label; decides the output subdirectory.
    pub label: Option<String>,

    /// Label modification timestamp, passed through as stored.
    pub modified_at: Option<String>,

    /// Accuracy score reported by Lobe, rendered as stored.
    pub accuracy: Option<String>,

    /// Perceptual hash, `None` when not computed or the image was unreadable.
    pub perceptual_hash: Option<String>,
}

/// Ordered examples plus whether the fingerprint column was attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExampleTable {
    records: Vec<ExampleRecord>,
    fingerprinted: bool,
}

/// Number of examples carrying a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: Option<String>,
    pub count: usize,
}

impl ExampleTable {
    #[must_use]
    pub fn new(records: Vec<ExampleRecord>) -> Self {
        Self {
            records,
            fingerprinted: false,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[ExampleRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether [`attach_fingerprints`](Self::attach_fingerprints) ran.
    #[must_use]
    pub fn is_fingerprinted(&self) -> bool {
        self.fingerprinted
    }

    /// Content hashes in read order.
    #[must_use]
    pub fn content_hashes(&self) -> Vec<String> {
        self.records.iter().map(|r| r.content_hash.clone()).collect()
    }

    /// Attach fingerprint results by position.
    ///
    /// `fingerprints[i]` belongs to `records[i]`. The column must have exactly
    /// one entry per record.
    ///
    /// # Errors
    ///
    /// Returns an error if the lengths differ.
    pub fn attach_fingerprints(&mut self, fingerprints: Vec<Option<String>>) -> Result<()> {
        if fingerprints.len() != self.records.len() {
            return Err(Error::Other(format!(
                "fingerprint column has {} entries for {} records",
                fingerprints.len(),
                self.records.len()
            )));
        }

        for (record, fingerprint) in self.records.iter_mut().zip(fingerprints) {
            record.perceptual_hash = fingerprint;
        }
        self.fingerprinted = true;
        Ok(())
    }

    /// Count examples per label, sorted by label with unlabeled first.
    #[must_use]
    pub fn label_counts(&self) -> Vec<LabelCount> {
        let mut counts: BTreeMap<Option<&str>, usize> = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.label.as_deref()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(label, count)| LabelCount {
                label: label.map(String::from),
                count,
            })
            .collect()
    }
}

/// Whether `hash` can name a blob file: exactly one normal path component.
///
/// Rejects empty strings, `.`, `..`, separators and anything else that would
/// resolve outside the directory it is joined onto.
#[must_use]
pub fn is_blob_name(hash: &str) -> bool {
    if hash.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(hash).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
pub(crate) fn record(id: &str, hash: &str, label: Option<&str>) -> ExampleRecord {
    ExampleRecord {
        example_id: id.to_string(),
        content_hash: hash.to_string(),
        filename: Some(format!("{hash}.png")),
        label: label.map(String::from),
        modified_at: Some(format!("2024-01-0{id}T00:00:00Z")),
        accuracy: Some("0.5".to_string()),
        perceptual_hash: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ExampleTable {
        ExampleTable::new(vec![
            record("1", "a1", Some("cat")),
            record("2", "b2", Some("dog")),
            record("3", "c3", Some("cat")),
        ])
    }

    #[test]
    fn test_attach_fingerprints_is_positional() {
        let mut table = table();
        table
            .attach_fingerprints(vec![Some("ff00".into()), None, Some("00ff".into())])
            .unwrap();

        assert!(table.is_fingerprinted());
        let hashes: Vec<_> = table
            .records()
            .iter()
            .map(|r| r.perceptual_hash.as_deref())
            .collect();
        assert_eq!(hashes, vec![Some("ff00"), None, Some("00ff")]);
        // Order untouched
        assert_eq!(table.content_hashes(), vec!["a1", "b2", "c3"]);
    }

    #[test]
    fn test_attach_fingerprints_rejects_length_mismatch() {
        let mut table = table();
        let result = table.attach_fingerprints(vec![None]);
        assert!(result.is_err());
        assert!(!table.is_fingerprinted());
    }

    #[test]
    fn test_label_counts() {
        let mut records = table().records().to_vec();
        records.push(record("4", "d4", None));
        let counts = ExampleTable::new(records).label_counts();

        assert_eq!(
            counts,
            vec![
                LabelCount { label: None, count: 1 },
                LabelCount { label: Some("cat".into()), count: 2 },
                LabelCount { label: Some("dog".into()), count: 1 },
            ]
        );
    }

    #[test]
    fn test_empty_table() {
        let table = ExampleTable::default();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(table.label_counts().is_empty());
    }

    #[test]
    fn test_is_blob_name() {
        assert!(is_blob_name("3f2a9c"));
        assert!(is_blob_name("a.b"));
        for bad in ["", ".", "..", "../secret", "a/b", "a1/", "..\\x", "/etc/passwd"] {
            assert!(!is_blob_name(bad), "{bad:?}");
        }
    }
}
