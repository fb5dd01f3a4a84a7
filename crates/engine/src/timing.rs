//! Timing harness for the compare phase.
//!
//! Two measurements per resolved entity, both taken against the batch cache
//! so fingerprinting cost is excluded:
//!
//! - [`EntityTiming`]: one pass over every `(w, λ, version)` comparison, with
//!   wall time and the share spent inside the similarity estimator.
//! - [`ComboTiming`]: for each `(w, λ)`, the comparison loop is run
//!   `warmup_runs` times unmeasured, then `measured_runs` times measured; mean
//!   and population standard deviation are reported.

use std::hint::black_box;
use std::time::{Duration, Instant};

use corpus::VersionLabel;
use serde::{Deserialize, Serialize};
use shingle::{select, similarity, Fingerprint, SketchSize};

use crate::cache::CorpusCache;
use crate::compare::EntityPlan;
use crate::config::{ConfigError, EngineConfig};
use crate::types::{DocumentFailure, SkipReason, SkippedEntity};

/// Repetition counts for combination timing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimingConfig {
    #[serde(default = "TimingConfig::default_warmup_runs")]
    pub warmup_runs: usize,
    #[serde(default = "TimingConfig::default_measured_runs")]
    pub measured_runs: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            warmup_runs: Self::default_warmup_runs(),
            measured_runs: Self::default_measured_runs(),
        }
    }
}

impl TimingConfig {
    pub(crate) fn default_warmup_runs() -> usize {
        3
    }

    pub(crate) fn default_measured_runs() -> usize {
        5
    }

    pub fn with_warmup_runs(mut self, runs: usize) -> Self {
        self.warmup_runs = runs;
        self
    }

    pub fn with_measured_runs(mut self, runs: usize) -> Self {
        self.measured_runs = runs;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.measured_runs == 0 {
            return Err(ConfigError::InvalidMeasuredRuns {
                runs: self.measured_runs,
            });
        }
        Ok(())
    }
}

/// Compare-phase cost of one entity across all widths and sketch sizes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTiming {
    pub entity: String,
    pub comparisons: usize,
    pub total_secs: f64,
    pub similarity_secs: f64,
}

/// Repeated-run cost of one entity at one `(w, λ)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboTiming {
    pub entity: String,
    pub shingle_width: usize,
    pub sketch_size: SketchSize,
    pub runs: usize,
    pub mean_total_secs: f64,
    pub std_total_secs: f64,
    pub mean_similarity_secs: f64,
    pub std_similarity_secs: f64,
}

/// Output of [`BatchScheduler::bench`](crate::BatchScheduler::bench).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingReport {
    pub entities: Vec<EntityTiming>,
    pub combos: Vec<ComboTiming>,
    pub skipped: Vec<SkippedEntity>,
    pub failures: Vec<DocumentFailure>,
    pub batches: usize,
}

/// One pass of the comparison loop at `(w, λ)`; returns the time spent in the
/// estimator and the number of comparisons.
fn compare_loop(
    reference: &Fingerprint,
    others: &[(&VersionLabel, &Fingerprint)],
    size: SketchSize,
) -> (Duration, usize) {
    let reference_sketch = select(reference, size);
    let mut in_similarity = Duration::ZERO;
    for &(_, fingerprint) in others {
        let sketch = select(fingerprint, size);
        let start = Instant::now();
        black_box(similarity(reference_sketch, sketch));
        in_similarity += start.elapsed();
    }
    (in_similarity, others.len())
}

pub(crate) fn time_entity(
    plan: &EntityPlan<'_>,
    cache: &CorpusCache,
    config: &EngineConfig,
) -> Result<EntityTiming, SkipReason> {
    let start = Instant::now();
    let mut in_similarity = Duration::ZERO;
    let mut comparisons = 0;
    for &width in &config.shingle_widths {
        let reference = plan.reference_fingerprint(cache, width)?;
        let others = plan.other_fingerprints(cache, width);
        for &size in &config.sketch_sizes {
            let (elapsed, count) = compare_loop(reference, &others, size);
            in_similarity += elapsed;
            comparisons += count;
        }
    }
    Ok(EntityTiming {
        entity: plan.entity.to_string(),
        comparisons,
        total_secs: start.elapsed().as_secs_f64(),
        similarity_secs: in_similarity.as_secs_f64(),
    })
}

pub(crate) fn time_combos(
    plan: &EntityPlan<'_>,
    cache: &CorpusCache,
    config: &EngineConfig,
    timing: &TimingConfig,
) -> Result<Vec<ComboTiming>, SkipReason> {
    let mut out = Vec::with_capacity(config.shingle_widths.len() * config.sketch_sizes.len());
    for &width in &config.shingle_widths {
        let reference = plan.reference_fingerprint(cache, width)?;
        let others = plan.other_fingerprints(cache, width);
        for &size in &config.sketch_sizes {
            for _ in 0..timing.warmup_runs {
                compare_loop(reference, &others, size);
            }

            let mut totals = Vec::with_capacity(timing.measured_runs);
            let mut in_similarity = Vec::with_capacity(timing.measured_runs);
            for _ in 0..timing.measured_runs {
                let start = Instant::now();
                let (elapsed, _) = compare_loop(reference, &others, size);
                totals.push(start.elapsed().as_secs_f64());
                in_similarity.push(elapsed.as_secs_f64());
            }

            let (mean_total_secs, std_total_secs) = mean_std(&totals);
            let (mean_similarity_secs, std_similarity_secs) = mean_std(&in_similarity);
            out.push(ComboTiming {
                entity: plan.entity.to_string(),
                shingle_width: width,
                sketch_size: size,
                runs: timing.measured_runs,
                mean_total_secs,
                std_total_secs,
                mean_similarity_secs,
                std_similarity_secs,
            });
        }
    }
    Ok(out)
}

/// Mean and population standard deviation. `(0, 0)` for no samples.
pub(crate) fn mean_std(samples: &[f64]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
