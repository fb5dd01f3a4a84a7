//! Jaccard similarity over sketches.
//!
//! The estimator is sketch-agnostic: it computes the exact Jaccard index of
//! whatever two sets it is given, whether full fingerprints or bottom-k
//! sketches. Inputs are strictly ascending, so overlap is a linear merge.

use std::cmp::Ordering;

use crate::sketch::Sketch;

/// Intersection and union sizes of two sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub intersection: usize,
    pub union: usize,
}

/// Count the overlap of two strictly ascending hash slices.
pub fn overlap(a: &[u64], b: &[u64]) -> Overlap {
    let (mut i, mut j) = (0, 0);
    let mut intersection = 0;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                intersection += 1;
                i += 1;
                j += 1;
            }
        }
    }
    Overlap {
        intersection,
        union: a.len() + b.len() - intersection,
    }
}

/// Jaccard similarity of two strictly ascending hash slices.
///
/// Both empty gives 1.0, exactly one empty gives 0.0.
pub fn jaccard(a: &[u64], b: &[u64]) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let Overlap {
                intersection,
                union,
            } = overlap(a, b);
            intersection as f64 / union as f64
        }
    }
}

/// Jaccard similarity of two sketches (or fingerprints via
/// [`crate::Fingerprint::as_sketch`]). Symmetric, in `[0, 1]`.
pub fn similarity(a: Sketch<'_>, b: Sketch<'_>) -> f64 {
    jaccard(a.as_slice(), b.as_slice())
}
