//! # revdrift engine
//!
//! Batched, parallel similarity computation over a versioned corpus.
//!
//! The engine takes a [`DocumentSource`](corpus::DocumentSource) and an
//! [`EngineConfig`] and, for every entity, compares each historical version
//! against the entity's reference version at every configured shingle width
//! `w` and sketch size `λ`.
//!
//! ## Batch lifecycle
//!
//! Entities are processed in fixed-size batches, strictly one batch at a time:
//!
//! 1.  **Collect**: list each entity's recognized versions and read their text.
//!     Unreadable documents are reported and left out.
//! 2.  **Fingerprint**: one task per `(document, w)` runs on the worker pool.
//!     Every result carries its key into the [`CorpusCache`].
//! 3.  **Compare**: one task per entity resolves the reference version, selects
//!     the reference sketch once per `(w, λ)`, and emits a
//!     [`SimilarityRecord`] for every other version.
//! 4.  **Release**: the batch's cache is dropped before the next batch starts.
//!
//! Batch size and worker count bound memory and parallelism; they never change
//! the records produced.
//!
//! ## Example
//!
//! ```
//! use corpus::InMemoryCorpus;
//! use engine::{BatchScheduler, EngineConfig};
//! use shingle::SketchSize;
//!
//! let corpus = InMemoryCorpus::from_map([
//!     ("Austin_TX", vec![("C", "a b c d e"), ("C-1", "a b c d x")]),
//!     ("Boise_ID", vec![("C-7", "only history")]),
//! ]);
//! let config = EngineConfig::new()
//!     .with_shingle_widths([2])
//!     .with_sketch_sizes([SketchSize::Bounded(2), SketchSize::Unbounded])
//!     .with_workers(2);
//!
//! let report = BatchScheduler::new(config).unwrap().run(&corpus).unwrap();
//! assert_eq!(report.records.len(), 2);
//! assert_eq!(report.skipped_entities(), vec!["Boise_ID"]);
//! ```
mod cache;
mod compare;
pub mod config;
mod scheduler;
pub mod timing;
mod types;

pub use crate::cache::CorpusCache;
pub use crate::compare::compare_versions;
pub use crate::config::{available_parallelism, ConfigError, EngineConfig};
pub use crate::scheduler::BatchScheduler;
pub use crate::timing::{ComboTiming, EntityTiming, TimingConfig, TimingReport};
pub use crate::types::{
    DocumentFailure, EngineError, RunReport, SimilarityRecord, SkipReason, SkippedEntity,
    VersionSimilarity,
};
