//! Engine configuration and validation.
//!
//! An [`EngineConfig`] is built once, validated, and handed to
//! [`BatchScheduler::new`](crate::BatchScheduler::new). Nothing in the engine
//! reads process-wide settings.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::thread;

use serde::{Deserialize, Serialize};
use shingle::{FingerprintOptions, ShingleMode, SketchSize, DEFAULT_SEED};
use thiserror::Error;

/// Parameters of one engine run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Shingle widths `w`; every document is fingerprinted once per width.
    #[serde(default = "EngineConfig::default_shingle_widths")]
    pub shingle_widths: Vec<usize>,
    /// Sketch sizes `λ`, bounded or [`SketchSize::Unbounded`].
    #[serde(default = "EngineConfig::default_sketch_sizes")]
    pub sketch_sizes: Vec<SketchSize>,
    /// Entities per batch. Bounds peak cache memory; never changes results.
    #[serde(default = "EngineConfig::default_batch_size")]
    pub batch_size: usize,
    /// Worker threads. Capped at available parallelism when the pool is built.
    #[serde(default = "available_parallelism")]
    pub workers: usize,
    #[serde(default)]
    pub shingle_mode: ShingleMode,
    /// XXH3 seed. Fingerprints built with different seeds are not comparable.
    #[serde(default)]
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shingle_widths: Self::default_shingle_widths(),
            sketch_sizes: Self::default_sketch_sizes(),
            batch_size: Self::default_batch_size(),
            workers: available_parallelism(),
            shingle_mode: ShingleMode::Strict,
            seed: DEFAULT_SEED,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn default_shingle_widths() -> Vec<usize> {
        vec![25, 50]
    }

    pub(crate) fn default_sketch_sizes() -> Vec<SketchSize> {
        vec![
            SketchSize::Bounded(8),
            SketchSize::Bounded(16),
            SketchSize::Bounded(32),
            SketchSize::Bounded(64),
            SketchSize::Unbounded,
        ]
    }

    pub(crate) fn default_batch_size() -> usize {
        10
    }

    pub fn with_shingle_widths(mut self, widths: impl IntoIterator<Item = usize>) -> Self {
        self.shingle_widths = widths.into_iter().collect();
        self
    }

    pub fn with_sketch_sizes(mut self, sizes: impl IntoIterator<Item = SketchSize>) -> Self {
        self.sketch_sizes = sizes.into_iter().collect();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_shingle_mode(mut self, mode: ShingleMode) -> Self {
        self.shingle_mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Options handed to every fingerprinting task.
    pub fn fingerprint_options(&self) -> FingerprintOptions {
        FingerprintOptions::default()
            .with_mode(self.shingle_mode)
            .with_seed(self.seed)
    }

    /// Worker count the pool will actually use.
    pub fn effective_workers(&self) -> usize {
        self.workers.min(available_parallelism())
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shingle_widths.is_empty() {
            return Err(ConfigError::NoShingleWidths);
        }
        let mut seen = HashSet::new();
        for &width in &self.shingle_widths {
            if width == 0 {
                return Err(ConfigError::InvalidShingleWidth { width });
            }
            if !seen.insert(width) {
                return Err(ConfigError::DuplicateShingleWidth { width });
            }
        }

        if self.sketch_sizes.is_empty() {
            return Err(ConfigError::NoSketchSizes);
        }
        let mut seen = HashSet::new();
        for &size in &self.sketch_sizes {
            if size == SketchSize::Bounded(0) {
                return Err(ConfigError::ZeroSketchSize);
            }
            if !seen.insert(size) {
                return Err(ConfigError::DuplicateSketchSize { size });
            }
        }

        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize {
                batch_size: self.batch_size,
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers {
                workers: self.workers,
            });
        }
        Ok(())
    }
}

/// Number of threads the host can run in parallel, at least 1.
pub fn available_parallelism() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Invalid engine configuration. Raised before any batch starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid config: at least one shingle width is required")]
    NoShingleWidths,

    #[error("invalid config: shingle width must be >= 1 (got {width})")]
    InvalidShingleWidth { width: usize },

    #[error("invalid config: shingle width {width} listed more than once")]
    DuplicateShingleWidth { width: usize },

    #[error("invalid config: at least one sketch size is required")]
    NoSketchSizes,

    #[error("invalid config: sketch size must be >= 1 or unbounded (got 0)")]
    ZeroSketchSize,

    #[error("invalid config: sketch size {size} listed more than once")]
    DuplicateSketchSize { size: SketchSize },

    #[error("invalid config: batch_size must be >= 1 (got {batch_size})")]
    InvalidBatchSize { batch_size: usize },

    #[error("invalid config: workers must be >= 1 (got {workers})")]
    InvalidWorkers { workers: usize },

    #[error("invalid config: measured_runs must be >= 1 (got {runs})")]
    InvalidMeasuredRuns { runs: usize },
}
