//! Workspace umbrella crate for revdrift.
//!
//! Measures how far each historical version of a document drifts from its
//! current version. This crate stitches the workspace together:
//!
//! - [`shingle`]: w-shingle fingerprints, bottom-k sketches, Jaccard similarity
//! - [`corpus`]: version labels, reference resolution, document sources
//! - [`engine`]: the batch scheduler and corpus cache
//!
//! plus the YAML [`config`] and the result writers in [`output`]. The
//! `revdrift` binary is a thin layer over [`run_pipeline`] and
//! [`bench_pipeline`].

pub mod config;
pub mod output;

pub use corpus::{
    resolve_reference, CorpusError, DirectoryCorpus, Document, DocumentKey, DocumentRef,
    DocumentSource, InMemoryCorpus, LabelPattern, VersionLabel, DEFAULT_MARKER,
};
pub use engine::{
    available_parallelism, compare_versions, BatchScheduler, ComboTiming, DocumentFailure,
    EngineConfig, EngineError, EntityTiming, RunReport, SimilarityRecord, SkipReason,
    SkippedEntity, TimingConfig, TimingReport, VersionSimilarity,
};
pub use shingle::{
    fingerprint, fingerprint_with, jaccard, select, similarity, Fingerprint, FingerprintOptions,
    ShingleMode, Sketch, SketchSize,
};

pub use crate::config::{ConfigLoadError, CorpusSection, OutputSection, RevdriftConfig};
pub use crate::output::{create_output, write_records, write_skip_list, write_timings, OutputError};

use std::io;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, Level};

/// Errors that can occur while running a configured pipeline end to end.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration failure: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("no corpus root configured")]
    MissingCorpusRoot,

    #[error("corpus failure: {0}")]
    Corpus(#[from] CorpusError),

    #[error("engine failure: {0}")]
    Engine(#[from] EngineError),

    #[error("output failure: {0}")]
    Output(#[from] OutputError),
}

/// Open the directory corpus named by `config.corpus`.
pub fn open_corpus(config: &RevdriftConfig) -> Result<DirectoryCorpus, PipelineError> {
    let root = config
        .corpus
        .root
        .as_ref()
        .ok_or(PipelineError::MissingCorpusRoot)?;
    let pattern = config.corpus.label_pattern()?;
    Ok(DirectoryCorpus::with_pattern(root, pattern)?)
}

/// Run the similarity engine over the configured corpus and write the
/// configured outputs. Records go to stdout when no records path is set.
pub fn run_pipeline(config: &RevdriftConfig) -> Result<RunReport, PipelineError> {
    config.validate()?;
    let corpus = open_corpus(config)?;
    let span = tracing::span!(
        Level::INFO,
        "revdrift.run",
        root = %corpus.root().display(),
        marker = %config.corpus.marker
    );
    let _guard = span.enter();

    let started = Instant::now();
    let report = BatchScheduler::new(config.engine.clone())?.run(&corpus)?;
    write_run(&report, &config.output)?;

    info!(
        records = report.records.len(),
        skipped = report.skipped.len(),
        failures = report.failures.len(),
        elapsed_micros = started.elapsed().as_micros() as u64,
        "pipeline_run_complete"
    );
    Ok(report)
}

/// Time the comparison workload over the configured corpus.
pub fn bench_pipeline(config: &RevdriftConfig) -> Result<TimingReport, PipelineError> {
    config.validate()?;
    let corpus = open_corpus(config)?;
    let report = BatchScheduler::new(config.engine.clone())?.bench(&corpus, &config.timing)?;

    match &config.output.timings {
        Some(path) => {
            write_timings(create_output(path)?, &report)?;
        }
        None => {
            write_timings(io::stdout().lock(), &report)?;
        }
    }
    if let Some(path) = &config.output.skipped {
        write_skip_list(create_output(path)?, &report.skipped)?;
    }
    Ok(report)
}

/// Write records and the skip list to the destinations in `output`.
pub fn write_run(report: &RunReport, output: &OutputSection) -> Result<(), PipelineError> {
    match &output.records {
        Some(path) => {
            write_records(create_output(path)?, &report.records)?;
        }
        None => {
            write_records(io::stdout().lock(), &report.records)?;
        }
    }
    if let Some(path) = &output.skipped {
        write_skip_list(create_output(path)?, &report.skipped)?;
    }
    Ok(())
}
