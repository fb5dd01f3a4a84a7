use std::fmt;

use corpus::{CorpusError, VersionLabel};
use serde::Serialize;
use shingle::SketchSize;
use thiserror::Error;

use crate::config::ConfigError;

/// Similarity of one historical version to its entity's reference version,
/// for one shingle width and one sketch size.
///
/// Serialized field order and names are the persisted record shape:
/// `entity, shingleWidth, sketchSize, otherVersion, jaccardValue`, followed by
/// `referenceVersion`. `sketchSize` is an integer or `"unbounded"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityRecord {
    pub entity: String,
    pub shingle_width: usize,
    pub sketch_size: SketchSize,
    pub other_version: VersionLabel,
    pub jaccard_value: f64,
    pub reference_version: VersionLabel,
}

/// Why an entity produced no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No recognized versions, or the entity could not be listed.
    NoVersions,
    /// Neither a current version nor an offset-0 version exists.
    NoReferenceVersion,
    /// The reference version exists but its text could not be read.
    ReferenceUnavailable,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoVersions => "no_versions",
            SkipReason::NoReferenceVersion => "no_reference_version",
            SkipReason::ReferenceUnavailable => "reference_unavailable",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntity {
    pub entity: String,
    pub reason: SkipReason,
}

/// A document (or a whole entity listing, when `version` is `None`) that
/// could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    pub entity: String,
    pub version: Option<VersionLabel>,
    pub error: CorpusError,
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}/{}: {}", self.entity, version, self.error),
            None => write!(f, "{}: {}", self.entity, self.error),
        }
    }
}

/// Everything a full run produced.
///
/// Records are ordered by batch, then entity, then shingle width and sketch
/// size in configuration order, then version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub records: Vec<SimilarityRecord>,
    pub skipped: Vec<SkippedEntity>,
    pub failures: Vec<DocumentFailure>,
    pub batches: usize,
}

impl RunReport {
    /// Names of skipped entities, sorted.
    pub fn skipped_entities(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.skipped.iter().map(|s| s.entity.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Records belonging to one entity.
    pub fn records_for<'a>(
        &'a self,
        entity: &'a str,
    ) -> impl Iterator<Item = &'a SimilarityRecord> + 'a {
        self.records.iter().filter(move |r| r.entity == entity)
    }
}

/// Similarity of one version to the reference, as returned by
/// [`compare_versions`](crate::compare_versions).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSimilarity {
    pub version: VersionLabel,
    pub jaccard_value: f64,
}

/// Errors that stop a run.
///
/// Per-entity and per-document problems never surface here; they end up in
/// [`RunReport::skipped`] and [`RunReport::failures`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("failed to list corpus entities: {0}")]
    Corpus(#[from] CorpusError),

    #[error("cache entry {key} at w={width} written twice")]
    DuplicateCacheEntry { key: String, width: usize },
}
