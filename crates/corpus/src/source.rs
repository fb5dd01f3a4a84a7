//! Document identities and the [`DocumentSource`] seam.
//!
//! The engine never touches files directly. It asks a source for the entity
//! list, then for each entity's recognized versions, then reads each document's
//! text. Reading is per document so that one unreadable file fails only that
//! document.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::error::CorpusError;
use crate::label::{LabelPattern, VersionLabel};

/// (entity, version) identity of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentKey {
    pub entity: String,
    pub version: VersionLabel,
}

impl DocumentKey {
    pub fn new(entity: impl Into<String>, version: VersionLabel) -> Self {
        Self {
            entity: entity.into(),
            version,
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity, self.version)
    }
}

/// A listed document that has not been read yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub key: DocumentKey,
    /// File backing the document, for file-based sources.
    pub path: Option<PathBuf>,
}

/// A document whose text has been read. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub key: DocumentKey,
    pub text: Arc<str>,
}

/// Where documents come from.
///
/// Implementations must be shareable across worker threads: the engine reads
/// documents of a batch concurrently.
pub trait DocumentSource: Send + Sync {
    /// All entity names, in a stable order.
    fn entities(&self) -> Result<Vec<String>, CorpusError>;

    /// The recognized versions of one entity, current first then by offset.
    fn documents(&self, entity: &str) -> Result<Vec<DocumentRef>, CorpusError>;

    /// Read one document's text.
    fn read(&self, doc: &DocumentRef) -> Result<Document, CorpusError>;
}

/// Corpus held entirely in memory: entity name to `(label, text)` pairs.
///
/// Labels that the pattern does not recognize are dropped on insert, the
/// same way unrecognized file names are ignored on disk.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    pattern: LabelPattern,
    entities: BTreeMap<String, BTreeMap<VersionLabel, Arc<str>>>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(pattern: LabelPattern) -> Self {
        Self {
            pattern,
            entities: BTreeMap::new(),
        }
    }

    /// Build from the collaborator-facing mapping.
    pub fn from_map<E, L, T>(map: impl IntoIterator<Item = (E, Vec<(L, T)>)>) -> Self
    where
        E: Into<String>,
        L: AsRef<str>,
        T: Into<Arc<str>>,
    {
        let mut corpus = Self::new();
        for (entity, versions) in map {
            let entity = entity.into();
            corpus.entities.entry(entity.clone()).or_default();
            for (label, text) in versions {
                corpus.insert(entity.as_str(), label.as_ref(), text);
            }
        }
        corpus
    }

    /// Insert one version. Returns `false` if `label` is not a version label.
    ///
    /// The entity is registered even when the label is rejected, so an entity
    /// whose versions are all malformed still shows up (and gets skipped).
    pub fn insert(&mut self, entity: &str, label: &str, text: impl Into<Arc<str>>) -> bool {
        let versions = self.entities.entry(entity.to_string()).or_default();
        match self.pattern.parse(label) {
            Some(version) => {
                versions.insert(version, text.into());
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl DocumentSource for InMemoryCorpus {
    fn entities(&self) -> Result<Vec<String>, CorpusError> {
        Ok(self.entities.keys().cloned().collect())
    }

    fn documents(&self, entity: &str) -> Result<Vec<DocumentRef>, CorpusError> {
        let versions = self
            .entities
            .get(entity)
            .ok_or_else(|| CorpusError::UnknownEntity(entity.to_string()))?;
        Ok(versions
            .keys()
            .map(|version| DocumentRef {
                key: DocumentKey::new(entity, version.clone()),
                path: None,
            })
            .collect())
    }

    fn read(&self, doc: &DocumentRef) -> Result<Document, CorpusError> {
        let DocumentKey { entity, version } = &doc.key;
        let text = self
            .entities
            .get(entity)
            .ok_or_else(|| CorpusError::UnknownEntity(entity.clone()))?
            .get(version)
            .ok_or_else(|| CorpusError::UnknownVersion {
                entity: entity.clone(),
                version: version.to_string(),
            })?;
        Ok(Document {
            key: doc.key.clone(),
            text: Arc::clone(text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InMemoryCorpus {
        InMemoryCorpus::from_map([
            ("Austin_TX", vec![("C", "now"), ("C-2", "older"), ("C-1", "old")]),
            ("Boise_ID", vec![("current", "x"), ("old-5", "y")]),
        ])
    }

    #[test]
    fn lists_entities_in_order() {
        assert_eq!(sample().entities().unwrap(), vec!["Austin_TX", "Boise_ID"]);
    }

    #[test]
    fn documents_are_ordered_current_first() {
        let docs = sample().documents("Austin_TX").unwrap();
        let labels: Vec<_> = docs.iter().map(|d| d.key.version.as_str()).collect();
        assert_eq!(labels, vec!["C", "C-1", "C-2"]);
        assert!(docs.iter().all(|d| d.path.is_none()));
    }

    #[test]
    fn malformed_labels_are_dropped_but_entity_kept() {
        let corpus = sample();
        assert!(corpus.documents("Boise_ID").unwrap().is_empty());
        let mut corpus = InMemoryCorpus::new();
        assert!(!corpus.insert("e", "bogus", "t"));
        assert!(corpus.insert("e", "C-1", "t"));
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn reads_text() {
        let corpus = sample();
        let docs = corpus.documents("Austin_TX").unwrap();
        let doc = corpus.read(&docs[1]).unwrap();
        assert_eq!(&*doc.text, "old");
        assert_eq!(doc.key.to_string(), "Austin_TX/C-1");
    }

    #[test]
    fn unknown_lookups_are_errors() {
        let corpus = sample();
        assert_eq!(
            corpus.documents("Nowhere").unwrap_err(),
            CorpusError::UnknownEntity("Nowhere".into())
        );
        let missing = DocumentRef {
            key: DocumentKey::new("Austin_TX", VersionLabel::with_offset("C", 9)),
            path: None,
        };
        assert!(matches!(
            corpus.read(&missing),
            Err(CorpusError::UnknownVersion { .. })
        ));
    }

    #[test]
    fn custom_marker_pattern() {
        let mut corpus = InMemoryCorpus::with_pattern(LabelPattern::new("REV").unwrap());
        assert!(corpus.insert("page", "REV-3", "text"));
        assert!(!corpus.insert("page", "C-3", "text"));
    }
}
