//! Per-entity comparison: reference resolution, sketch reuse, record emission.

use corpus::{resolve_reference, Document, DocumentKey, VersionLabel};
use shingle::{fingerprint_with, select, similarity, Fingerprint, FingerprintOptions, SketchSize};

use crate::cache::CorpusCache;
use crate::config::EngineConfig;
use crate::types::{SimilarityRecord, SkipReason, VersionSimilarity};

/// Resolved comparison layout of one entity: its reference document and
/// every other recognized version.
#[derive(Debug, Clone)]
pub(crate) struct EntityPlan<'a> {
    pub(crate) entity: &'a str,
    pub(crate) reference: DocumentKey,
    pub(crate) others: Vec<DocumentKey>,
}

impl<'a> EntityPlan<'a> {
    /// `versions` are all recognized labels of the entity, readable or not.
    pub(crate) fn resolve(entity: &'a str, versions: &[VersionLabel]) -> Result<Self, SkipReason> {
        if versions.is_empty() {
            return Err(SkipReason::NoVersions);
        }
        let reference = resolve_reference(versions).ok_or(SkipReason::NoReferenceVersion)?;
        let others = versions
            .iter()
            .filter(|version| *version != reference)
            .map(|version| DocumentKey::new(entity, version.clone()))
            .collect();
        Ok(Self {
            entity,
            reference: DocumentKey::new(entity, reference.clone()),
            others,
        })
    }

    pub(crate) fn reference_fingerprint<'c>(
        &self,
        cache: &'c CorpusCache,
        width: usize,
    ) -> Result<&'c Fingerprint, SkipReason> {
        cache
            .get(&self.reference, width)
            .ok_or(SkipReason::ReferenceUnavailable)
    }

    /// Cached fingerprints of the other versions at `width`. Versions whose
    /// text could not be read have no entry and are left out.
    pub(crate) fn other_fingerprints<'c>(
        &'c self,
        cache: &'c CorpusCache,
        width: usize,
    ) -> Vec<(&'c VersionLabel, &'c Fingerprint)> {
        self.others
            .iter()
            .filter_map(|key| cache.get(key, width).map(|fp| (&key.version, fp)))
            .collect()
    }
}

/// Compare every other version of `entity` to its reference version, for
/// every configured width and sketch size.
///
/// The reference sketch is selected once per `(w, λ)` and reused for every
/// version. Sketches are prefix views, so selection itself does not copy.
pub(crate) fn compare_entity(
    entity: &str,
    versions: &[VersionLabel],
    cache: &CorpusCache,
    config: &EngineConfig,
) -> Result<Vec<SimilarityRecord>, SkipReason> {
    let plan = EntityPlan::resolve(entity, versions)?;
    let mut records =
        Vec::with_capacity(plan.others.len() * config.shingle_widths.len() * config.sketch_sizes.len());

    for &width in &config.shingle_widths {
        let reference = plan.reference_fingerprint(cache, width)?;
        let others = plan.other_fingerprints(cache, width);
        for &size in &config.sketch_sizes {
            let reference_sketch = select(reference, size);
            for &(version, fingerprint) in &others {
                records.push(SimilarityRecord {
                    entity: entity.to_string(),
                    shingle_width: width,
                    sketch_size: size,
                    other_version: version.clone(),
                    jaccard_value: similarity(reference_sketch, select(fingerprint, size)),
                    reference_version: plan.reference.version.clone(),
                });
            }
        }
    }
    Ok(records)
}

/// Compare one entity's documents at a single `(w, λ)`.
///
/// Returns the similarity of every non-reference version to the reference,
/// current first then by increasing offset. Needs no scheduler: the caller
/// already holds the text.
pub fn compare_versions(
    documents: &[Document],
    width: usize,
    size: SketchSize,
    options: &FingerprintOptions,
) -> Result<Vec<VersionSimilarity>, SkipReason> {
    if documents.is_empty() {
        return Err(SkipReason::NoVersions);
    }
    let reference = resolve_reference(documents.iter().map(|doc| &doc.key.version))
        .ok_or(SkipReason::NoReferenceVersion)?;
    let reference_doc = documents
        .iter()
        .find(|doc| &doc.key.version == reference)
        .ok_or(SkipReason::ReferenceUnavailable)?;

    let reference_fp = fingerprint_with(&reference_doc.text, width, options);
    let reference_sketch = select(&reference_fp, size);

    let mut out: Vec<VersionSimilarity> = documents
        .iter()
        .filter(|doc| &doc.key.version != reference)
        .map(|doc| {
            let fp = fingerprint_with(&doc.text, width, options);
            VersionSimilarity {
                version: doc.key.version.clone(),
                jaccard_value: similarity(reference_sketch, select(&fp, size)),
            }
        })
        .collect();
    out.sort_by(|a, b| a.version.cmp(&b.version));
    Ok(out)
}
