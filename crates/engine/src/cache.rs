//! Batch-scoped store of full fingerprints.
//!
//! One cache lives for one batch. It is filled on the scheduler thread from
//! fingerprinting results, each entry written exactly once, and then shared
//! read-only with every compare task of that batch. Dropping it releases the
//! batch.

use std::collections::{BTreeMap, HashMap};

use corpus::DocumentKey;
use shingle::Fingerprint;

use crate::types::EngineError;

/// Full fingerprints keyed by `(entity, version, w)`.
#[derive(Debug, Default)]
pub struct CorpusCache {
    entries: HashMap<DocumentKey, BTreeMap<usize, Fingerprint>>,
    len: usize,
}

impl CorpusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the fingerprint of `key` at width `width`.
    ///
    /// A second write for the same key is an error: every fingerprinting task
    /// owns a distinct key.
    pub fn insert(
        &mut self,
        key: DocumentKey,
        width: usize,
        fingerprint: Fingerprint,
    ) -> Result<(), EngineError> {
        if self.get(&key, width).is_some() {
            return Err(EngineError::DuplicateCacheEntry {
                key: key.to_string(),
                width,
            });
        }
        self.entries
            .entry(key)
            .or_default()
            .insert(width, fingerprint);
        self.len += 1;
        Ok(())
    }

    pub fn get(&self, key: &DocumentKey, width: usize) -> Option<&Fingerprint> {
        self.entries.get(key)?.get(&width)
    }

    pub fn contains(&self, key: &DocumentKey, width: usize) -> bool {
        self.get(key, width).is_some()
    }

    /// Number of `(document, w)` entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct documents with at least one entry.
    pub fn documents(&self) -> usize {
        self.entries.len()
    }

    /// Total hash values held across all entries.
    pub fn total_hashes(&self) -> usize {
        self.entries
            .values()
            .flat_map(BTreeMap::values)
            .map(Fingerprint::len)
            .sum()
    }
}
