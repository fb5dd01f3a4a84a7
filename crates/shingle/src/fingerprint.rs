//! Fingerprint type and construction.
//!
//! A [`Fingerprint`] is the set of distinct shingle hashes of one document at
//! one shingle width. It is stored as a sorted, deduplicated `Vec<u64>`: bottom-k
//! selection then becomes a prefix slice and set overlap a linear merge.

use serde::{Deserialize, Serialize};

use crate::shingles::{shingle_hashes, tokenize, ShingleMode, DEFAULT_SEED};
use crate::sketch::{Sketch, SketchSize};

/// Options controlling how shingles are formed and hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintOptions {
    /// Window behavior near the end of the document.
    #[serde(default)]
    pub mode: ShingleMode,
    /// XXH3 seed.
    #[serde(default)]
    pub seed: u64,
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self {
            mode: ShingleMode::Strict,
            seed: DEFAULT_SEED,
        }
    }
}

impl FingerprintOptions {
    pub fn with_mode(mut self, mode: ShingleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// The set of distinct shingle hashes of a document.
///
/// Invariant: `hashes` is strictly ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<u64>", into = "Vec<u64>")]
pub struct Fingerprint {
    hashes: Vec<u64>,
}

impl Fingerprint {
    /// The empty fingerprint.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a fingerprint from arbitrary hashes; duplicates collapse.
    pub fn from_hashes(mut hashes: Vec<u64>) -> Self {
        hashes.sort_unstable();
        hashes.dedup();
        Self { hashes }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn contains(&self, hash: u64) -> bool {
        self.hashes.binary_search(&hash).is_ok()
    }

    /// Hashes in ascending order.
    pub fn as_slice(&self) -> &[u64] {
        &self.hashes
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.hashes.iter().copied()
    }

    /// Bottom-`size` sketch of this fingerprint. See [`crate::select`].
    pub fn sketch(&self, size: SketchSize) -> Sketch<'_> {
        crate::sketch::select(self, size)
    }

    /// The whole fingerprint viewed as an unbounded sketch.
    pub fn as_sketch(&self) -> Sketch<'_> {
        Sketch::new(&self.hashes)
    }
}

impl From<Vec<u64>> for Fingerprint {
    fn from(hashes: Vec<u64>) -> Self {
        Self::from_hashes(hashes)
    }
}

impl From<Fingerprint> for Vec<u64> {
    fn from(fp: Fingerprint) -> Self {
        fp.hashes
    }
}

impl FromIterator<u64> for Fingerprint {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self::from_hashes(iter.into_iter().collect())
    }
}

/// Fingerprint `text` at shingle width `w` with default options.
///
/// Pure and total: identical inputs always give identical sets, and texts with
/// fewer than `w` tokens (including the empty text) give the empty set.
pub fn fingerprint(text: &str, w: usize) -> Fingerprint {
    fingerprint_with(text, w, &FingerprintOptions::default())
}

/// Fingerprint `text` at shingle width `w` with explicit options.
pub fn fingerprint_with(text: &str, w: usize, opts: &FingerprintOptions) -> Fingerprint {
    let tokens = tokenize(text);
    Fingerprint::from_hashes(shingle_hashes(&tokens, w, opts.mode, opts.seed))
}
