//! # revdrift shingling
//!
//! Deterministic w-shingling fingerprints, bottom-k sketches, and Jaccard
//! similarity for measuring how far two versions of a document have drifted.
//!
//! ## Contract
//!
//! - Every function here is pure: no I/O, no clocks, no global state.
//! - [`fingerprint`] is total over any text. Texts shorter than `w` tokens give
//!   the empty fingerprint; that is an expected outcome, not an error.
//! - For a fingerprint `F` and sizes `λ1 <= λ2`,
//!   `select(F, λ1) ⊆ select(F, λ2) ⊆ F` and `|select(F, λ)| = min(λ, |F|)`.
//! - [`similarity`] is symmetric and returns a value in `[0, 1]`.
//!
//! The hash is XXH3-64. It is uniform, which the bottom-k selection relies
//! on, but it is not cryptographic.
//!
//! ## Pipeline
//!
//! 1. **Tokenize**: split on Unicode whitespace.
//! 2. **Shingle**: join every run of `w` consecutive tokens with one space.
//! 3. **Hash**: XXH3-64 over the shingle's UTF-8 bytes; the distinct hashes
//!    form the [`Fingerprint`].
//! 4. **Select**: keep the `λ` smallest hashes as a [`Sketch`].
//! 5. **Compare**: exact Jaccard over two sketches.
//!
//! ## Example
//!
//! ```
//! use shingle::{fingerprint, select, similarity, SketchSize};
//!
//! let current = fingerprint("the quick brown fox jumps over the lazy dog", 3);
//! let older = fingerprint("the quick brown fox leaps over the lazy dog", 3);
//!
//! let size = SketchSize::Bounded(16);
//! let score = similarity(select(&current, size), select(&older, size));
//! assert!(score > 0.0 && score < 1.0);
//! ```
pub mod fingerprint;
pub mod shingles;
pub mod similarity;
pub mod sketch;

pub use crate::fingerprint::{fingerprint, fingerprint_with, Fingerprint, FingerprintOptions};
pub use crate::shingles::{hash_shingle, shingle_hashes, tokenize, ShingleMode, DEFAULT_SEED};
pub use crate::similarity::{jaccard, overlap, similarity, Overlap};
pub use crate::sketch::{select, ParseSketchSizeError, Sketch, SketchSize, UNBOUNDED_TOKEN};
