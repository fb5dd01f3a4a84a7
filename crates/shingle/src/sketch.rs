//! Bottom-k sketch selection.
//!
//! A sketch keeps the `λ` numerically smallest hashes of a fingerprint. With a
//! uniform hash this approximates a KMV / min-hash sketch, and because the
//! selection is deterministic, sketches of one fingerprint at increasing `λ`
//! are prefixes of each other.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::fingerprint::Fingerprint;

/// Token used for [`SketchSize::Unbounded`] in text and serialized forms.
pub const UNBOUNDED_TOKEN: &str = "unbounded";

/// Requested sketch size `λ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SketchSize {
    /// Keep at most this many of the smallest hashes.
    Bounded(usize),
    /// Keep the full fingerprint.
    Unbounded,
}

impl SketchSize {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, SketchSize::Unbounded)
    }

    /// Number of hashes a sketch of this size keeps from a set of `len` hashes.
    pub fn bound(&self, len: usize) -> usize {
        match *self {
            SketchSize::Bounded(k) => k.min(len),
            SketchSize::Unbounded => len,
        }
    }
}

impl fmt::Display for SketchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SketchSize::Bounded(k) => write!(f, "{k}"),
            SketchSize::Unbounded => f.write_str(UNBOUNDED_TOKEN),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid sketch size '{0}': expected a non-negative integer or 'unbounded'")]
pub struct ParseSketchSizeError(pub String);

impl FromStr for SketchSize {
    type Err = ParseSketchSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            UNBOUNDED_TOKEN | "inf" | "infinity" | "∞" | "-1" => Ok(SketchSize::Unbounded),
            other => other
                .parse::<usize>()
                .map(SketchSize::Bounded)
                .map_err(|_| ParseSketchSizeError(s.to_string())),
        }
    }
}

impl Serialize for SketchSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            SketchSize::Bounded(k) => serializer.serialize_u64(k as u64),
            SketchSize::Unbounded => serializer.serialize_str(UNBOUNDED_TOKEN),
        }
    }
}

impl<'de> Deserialize<'de> for SketchSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SketchSizeVisitor;

        impl Visitor<'_> for SketchSizeVisitor {
            type Value = SketchSize;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer, -1, or \"unbounded\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<SketchSize, E> {
                usize::try_from(v)
                    .map(SketchSize::Bounded)
                    .map_err(|_| E::custom(format!("sketch size {v} out of range")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<SketchSize, E> {
                match v {
                    -1 => Ok(SketchSize::Unbounded),
                    v if v >= 0 => self.visit_u64(v as u64),
                    v => Err(E::custom(format!("negative sketch size {v}"))),
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<SketchSize, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(SketchSizeVisitor)
    }
}

/// A bounded view over the smallest hashes of a fingerprint.
///
/// Sketches borrow from their fingerprint, so building one is free and the
/// reference sketch of an entity can be reused across every comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sketch<'a> {
    hashes: &'a [u64],
}

impl<'a> Sketch<'a> {
    /// Wrap a strictly ascending slice.
    pub(crate) fn new(hashes: &'a [u64]) -> Self {
        debug_assert!(hashes.windows(2).all(|pair| pair[0] < pair[1]));
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
    pub fn as_slice(&self) -> &'a [u64] {
        self.hashes
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + 'a {
        self.hashes.iter().copied()
    }

    /// Whether every hash of `self` is also in `other`.
    pub fn is_subset(&self, other: &Sketch<'_>) -> bool {
        self.hashes.iter().all(|&h| other.contains(h))
    }

    /// Copy the sketch out into an owned fingerprint.
    pub fn to_fingerprint(&self) -> Fingerprint {
        Fingerprint::from_hashes(self.hashes.to_vec())
    }
}

/// Select the bottom-`size` sketch of `fingerprint`.
///
/// `Unbounded` returns the whole fingerprint; `Bounded(k)` returns the `k`
/// smallest hashes, or all of them when fewer than `k` exist.
pub fn select(fingerprint: &Fingerprint, size: SketchSize) -> Sketch<'_> {
    let all = fingerprint.as_slice();
    Sketch::new(&all[..size.bound(all.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(values: &[u64]) -> Fingerprint {
        Fingerprint::from_hashes(values.to_vec())
    }

    #[test]
    fn select_keeps_smallest() {
        let a = fp(&[5, 3, 1, 4, 2]);
        assert_eq!(select(&a, SketchSize::Bounded(2)).as_slice(), &[1, 2]);
    }

    #[test]
    fn select_unbounded_is_identity() {
        let a = fp(&[1, 2, 3, 4, 5]);
        assert_eq!(select(&a, SketchSize::Unbounded).as_slice(), a.as_slice());
    }

    #[test]
    fn select_larger_than_fingerprint_returns_all() {
        let a = fp(&[10, 20]);
        assert_eq!(select(&a, SketchSize::Bounded(64)).len(), 2);
    }

    #[test]
    fn select_zero_is_empty() {
        let a = fp(&[10, 20]);
        assert!(select(&a, SketchSize::Bounded(0)).is_empty());
    }

    #[test]
    fn sketches_nest() {
        let a = fp(&[9, 8, 7, 6, 5, 4, 3, 2, 1]);
        let small = a.sketch(SketchSize::Bounded(3));
        let large = a.sketch(SketchSize::Bounded(6));
        let full = a.sketch(SketchSize::Unbounded);
        assert!(small.is_subset(&large));
        assert!(large.is_subset(&full));
    }

    #[test]
    fn to_fingerprint_round_trips_contents() {
        let a = fp(&[4, 2, 8]);
        let owned = a.sketch(SketchSize::Bounded(2)).to_fingerprint();
        assert_eq!(owned.as_slice(), &[2, 4]);
    }

    #[test]
    fn parse_sketch_sizes() {
        assert_eq!("16".parse::<SketchSize>().unwrap(), SketchSize::Bounded(16));
        for token in ["unbounded", "UNBOUNDED", "-1", "inf", "∞"] {
            assert_eq!(token.parse::<SketchSize>().unwrap(), SketchSize::Unbounded);
        }
        assert!("-2".parse::<SketchSize>().is_err());
        assert!("lots".parse::<SketchSize>().is_err());
    }

    #[test]
    fn display_uses_unbounded_token() {
        assert_eq!(SketchSize::Bounded(8).to_string(), "8");
        assert_eq!(SketchSize::Unbounded.to_string(), "unbounded");
    }

    #[test]
    fn serde_integer_or_token() {
        assert_eq!(serde_json::to_string(&SketchSize::Bounded(32)).unwrap(), "32");
        assert_eq!(
            serde_json::to_string(&SketchSize::Unbounded).unwrap(),
            "\"unbounded\""
        );
        let sizes: Vec<SketchSize> = serde_json::from_str("[8, -1, \"unbounded\", \"64\"]").unwrap();
        assert_eq!(
            sizes,
            vec![
                SketchSize::Bounded(8),
                SketchSize::Unbounded,
                SketchSize::Unbounded,
                SketchSize::Bounded(64),
            ]
        );
        assert!(serde_json::from_str::<SketchSize>("-5").is_err());
    }
}
