//! Batch scheduler: drives `COLLECT → FINGERPRINT → COMPARE → RELEASE` for
//! each batch of entities on a bounded worker pool.
//!
//! Every phase submits self-contained tasks to the pool and gathers their
//! outputs over a channel. Each task carries its own key, so results are
//! matched by key and never by submission order. A phase returns only after
//! all of its tasks finished, and batches run strictly one after another.

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use corpus::{CorpusError, Document, DocumentKey, DocumentRef, DocumentSource, VersionLabel};
use rayon::{ThreadPool, ThreadPoolBuilder};
use shingle::{fingerprint_with, Fingerprint};
use tracing::{debug, info, warn, Level};

use crate::cache::CorpusCache;
use crate::compare::{compare_entity, EntityPlan};
use crate::config::EngineConfig;
use crate::timing::{time_combos, time_entity, TimingConfig, TimingReport};
use crate::types::{
    DocumentFailure, EngineError, RunReport, SimilarityRecord, SkipReason, SkippedEntity,
};


/// Runs the batch pipeline over a [`DocumentSource`].
pub struct BatchScheduler {
    config: EngineConfig,
    pool: ThreadPool,
}

/// Entities of one batch after COLLECT.
#[derive(Debug, Default)]
struct Collected {
    /// Entities with at least one recognized version, and all their labels.
    entities: BTreeMap<String, Vec<VersionLabel>>,
    documents: Vec<Document>,
    skipped: Vec<SkippedEntity>,
    failures: Vec<DocumentFailure>,
}

/// One fingerprinting task and, after it ran, its result under the same key.
struct FingerprintTask {
    key: DocumentKey,
    width: usize,
    text: Arc<str>,
}

struct FingerprintOutput {
    key: DocumentKey,
    width: usize,
    fingerprint: Fingerprint,
}

#[derive(Debug, Default)]
struct BatchOutcome {
    records: Vec<SimilarityRecord>,
    skipped: Vec<SkippedEntity>,
    failures: Vec<DocumentFailure>,
}

impl BatchScheduler {
    /// Validate `config` and build the worker pool.
    ///
    /// A worker count above available parallelism is capped.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let workers = config.effective_workers();
        if workers < config.workers {
            warn!(
                requested = config.workers,
                available = workers,
                "engine_workers_capped"
            );
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("revdrift-worker-{i}"))
            .build()
            .map_err(|err| EngineError::ThreadPool(err.to_string()))?;

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Threads in the worker pool.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every batch and return all records, skips and document failures.
    ///
    /// Only a failure to list the corpus's entities aborts the run.
    pub fn run<S>(&self, source: &S) -> Result<RunReport, EngineError>
    where
        S: DocumentSource + ?Sized,
    {
        let start = Instant::now();
        let entities = source.entities()?;
        let mut report = RunReport::default();

        for (index, batch) in entities.chunks(self.config.batch_size).enumerate() {
            let outcome = self.run_batch(index, batch, source)?;
            report.records.extend(outcome.records);
            report.skipped.extend(outcome.skipped);
            report.failures.extend(outcome.failures);
            report.batches += 1;
        }

        info!(
            entities = entities.len(),
            batches = report.batches,
            records = report.records.len(),
            skipped = report.skipped.len(),
            failures = report.failures.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "engine_run_complete"
        );
        Ok(report)
    }

    /// Time the compare phase of every resolved entity.
    ///
    /// Batches go through COLLECT and FINGERPRINT exactly as in [`run`](Self::run).
    /// Per-entity passes run on the pool; combination timing runs on the
    /// calling thread, one entity at a time.
    pub fn bench<S>(&self, source: &S, timing: &TimingConfig) -> Result<TimingReport, EngineError>
    where
        S: DocumentSource + ?Sized,
    {
        timing.validate()?;
        let entities = source.entities()?;
        let mut report = TimingReport::default();

        for (index, batch) in entities.chunks(self.config.batch_size).enumerate() {
            let span = tracing::span!(
                Level::INFO,
                "engine.bench_batch",
                batch = index,
                entities = batch.len()
            );
            let _guard = span.enter();

            let mut collected = self.collect(batch, source);
            let cache = self.fingerprint(&collected.documents)?;

            let mut plans = Vec::with_capacity(collected.entities.len());
            for (entity, versions) in &collected.entities {
                match EntityPlan::resolve(entity, versions) {
                    Ok(plan) => plans.push(plan),
                    Err(reason) => collected.skipped.push(skip(entity, reason)),
                }
            }

            let config = &self.config;
            let cache_ref = &cache;
            let tasks: Vec<&EntityPlan<'_>> = plans.iter().collect();
            let mut timed = run_phase(&self.pool, tasks, |plan| {
                (plan.entity, time_entity(plan, cache_ref, config))
            });
            timed.sort_by(|a, b| a.0.cmp(b.0));

            for (entity, result) in timed {
                match result {
                    Ok(entity_timing) => report.entities.push(entity_timing),
                    Err(reason) => collected.skipped.push(skip(entity, reason)),
                }
            }
            for plan in &plans {
                // Entities skipped above fail here with the same reason.
                if let Ok(rows) = time_combos(plan, &cache, &self.config, timing) {
                    report.combos.extend(rows);
                }
            }

            drop(plans);
            self.release(cache);
            collected.skipped.sort_by(|a, b| a.entity.cmp(&b.entity));
            report.skipped.extend(collected.skipped);
            report.failures.extend(collected.failures);
            report.batches += 1;
        }
        Ok(report)
    }

    fn run_batch<S>(
        &self,
        index: usize,
        entities: &[String],
        source: &S,
    ) -> Result<BatchOutcome, EngineError>
    where
        S: DocumentSource + ?Sized,
    {
        let span = tracing::span!(
            Level::INFO,
            "engine.batch",
            batch = index,
            entities = entities.len()
        );
        let _guard = span.enter();

        let collected = self.collect(entities, source);
        let cache = self.fingerprint(&collected.documents)?;
        let outcome = self.compare(collected, &cache);
        self.release(cache);
        Ok(outcome)
    }

    /// COLLECT: list each entity's versions, then read every listed document.
    fn collect<S>(&self, entities: &[String], source: &S) -> Collected
    where
        S: DocumentSource + ?Sized,
    {
        let start = Instant::now();
        let mut collected = Collected::default();

        let tasks: Vec<&String> = entities.iter().collect();
        let listings = run_phase(&self.pool, tasks, |entity| {
            (entity.clone(), source.documents(entity))
        });

        let mut refs: Vec<DocumentRef> = Vec::new();
        for (entity, listing) in listings {
            match listing {
                Ok(docs) if docs.is_empty() => {
                    collected.skipped.push(skip(&entity, SkipReason::NoVersions));
                }
                Ok(docs) => {
                    let versions = docs.iter().map(|doc| doc.key.version.clone()).collect();
                    collected.entities.insert(entity, versions);
                    refs.extend(docs);
                }
                Err(error) => {
                    warn!(entity = %entity, error = %error, "entity_listing_failure");
                    collected.failures.push(DocumentFailure {
                        entity: entity.clone(),
                        version: None,
                        error,
                    });
                    collected.skipped.push(skip(&entity, SkipReason::NoVersions));
                }
            }
        }

        let listed = refs.len();
        let reads = run_phase(&self.pool, refs, |doc: DocumentRef| {
            let result: Result<Document, CorpusError> = source.read(&doc);
            (doc.key, result)
        });
        for (key, result) in reads {
            match result {
                Ok(document) => collected.documents.push(document),
                Err(error) => {
                    warn!(document = %key, error = %error, "document_read_failure");
                    collected.failures.push(DocumentFailure {
                        entity: key.entity,
                        version: Some(key.version),
                        error,
                    });
                }
            }
        }

        // Failures arrive in completion order.
        collected
            .failures
            .sort_by(|a, b| (&a.entity, &a.version).cmp(&(&b.entity, &b.version)));

        info!(
            entities = collected.entities.len(),
            documents = collected.documents.len(),
            listed,
            failures = collected.failures.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "batch_collect_complete"
        );
        collected
    }

    /// FINGERPRINT: one task per `(document, w)`, results stored by key.
    fn fingerprint(&self, documents: &[Document]) -> Result<CorpusCache, EngineError> {
        let start = Instant::now();
        let options = self.config.fingerprint_options();

        let tasks: Vec<FingerprintTask> = self
            .config
            .shingle_widths
            .iter()
            .flat_map(|&width| {
                documents.iter().map(move |doc| FingerprintTask {
                    key: doc.key.clone(),
                    width,
                    text: Arc::clone(&doc.text),
                })
            })
            .collect();
        let task_count = tasks.len();

        let outputs = run_phase(&self.pool, tasks, |task: FingerprintTask| FingerprintOutput {
            fingerprint: fingerprint_with(&task.text, task.width, &options),
            key: task.key,
            width: task.width,
        });

        let mut cache = CorpusCache::new();
        for output in outputs {
            cache.insert(output.key, output.width, output.fingerprint)?;
        }

        info!(
            tasks = task_count,
            entries = cache.len(),
            hashes = cache.total_hashes(),
            elapsed_micros = start.elapsed().as_micros(),
            "batch_fingerprint_complete"
        );
        Ok(cache)
    }

    /// COMPARE: one task per entity, reading the cache only.
    fn compare(&self, collected: Collected, cache: &CorpusCache) -> BatchOutcome {
        let start = Instant::now();
        let Collected {
            entities,
            mut skipped,
            failures,
            ..
        } = collected;

        let config = &self.config;
        let tasks: Vec<(&String, &Vec<VersionLabel>)> = entities.iter().collect();
        let mut results = run_phase(
            &self.pool,
            tasks,
            |(entity, versions)| {
                let result = compare_entity(entity, versions, cache, config);
                if let Ok(records) = &result {
                    debug!(entity = %entity, records = records.len(), "entity_compared");
                }
                (entity.as_str(), result)
            },
        );
        results.sort_by(|a, b| a.0.cmp(b.0));

        let mut records = Vec::new();
        for (entity, result) in results {
            match result {
                Ok(entity_records) => records.extend(entity_records),
                Err(reason) => skipped.push(skip(entity, reason)),
            }
        }
        skipped.sort_by(|a, b| a.entity.cmp(&b.entity));

        info!(
            entities = entities.len(),
            records = records.len(),
            skipped = skipped.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "batch_compare_complete"
        );
        BatchOutcome {
            records,
            skipped,
            failures,
        }
    }

    /// RELEASE: drop the batch's fingerprints.
    fn release(&self, cache: CorpusCache) {
        let entries = cache.len();
        drop(cache);
        info!(entries, "batch_release");
    }
}

fn skip(entity: &str, reason: SkipReason) -> SkippedEntity {
    warn!(entity, reason = %reason, "entity_skipped");
    SkippedEntity {
        entity: entity.to_string(),
        reason,
    }
}

/// Execute `work` over `tasks` on `pool` and collect every output.
///
/// Outputs arrive in completion order; callers key them through `R`.
/// Returns once all tasks have run.
fn run_phase<T, R, F>(pool: &ThreadPool, tasks: Vec<T>, work: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let expected = tasks.len();
    let (tx, rx) = mpsc::channel();
    let work = &work;
    pool.scope(move |scope| {
        for task in tasks {
            let tx = tx.clone();
            scope.spawn(move |_| {
                // The receiver outlives the scope, so sending cannot fail.
                let _ = tx.send(work(task));
            });
        }
    });
    let outputs: Vec<R> = rx.into_iter().collect();
    debug_assert_eq!(outputs.len(), expected);
    outputs
}
