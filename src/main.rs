use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use revdrift::{
    bench_pipeline, compare_versions, run_pipeline, DirectoryCorpus, DocumentSource,
    EngineConfig, RevdriftConfig, RunReport, SketchSize,
};

#[derive(Parser)]
#[command(
    name = "revdrift",
    about = "Measure how far historical document versions drift from the current one",
    version
)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare every version of every entity against its reference version
    Run {
        #[command(flatten)]
        engine: EngineArgs,

        /// Write similarity records here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write the skip list here
        #[arg(long)]
        skipped: Option<PathBuf>,
    },

    /// Compare the versions of a single entity directory and print the scores
    Compare {
        /// Entity directory, e.g. corpus/Austin_TX
        #[arg(long)]
        dir: PathBuf,

        /// Shingle width
        #[arg(short = 'w', long, default_value_t = 25)]
        width: usize,

        /// Sketch size, or "unbounded"
        #[arg(short = 'l', long, default_value = "unbounded", allow_negative_numbers = true)]
        sketch_size: SketchSize,

        /// Reference marker
        #[arg(long, default_value = revdrift::DEFAULT_MARKER)]
        marker: String,
    },

    /// Time the comparison workload per entity and per (w, λ) combination
    Bench {
        #[command(flatten)]
        engine: EngineArgs,

        /// Write timing rows here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Untimed runs before measuring
        #[arg(long)]
        warmup_runs: Option<usize>,

        /// Timed runs per combination
        #[arg(long)]
        measured_runs: Option<usize>,
    },
}

/// Options shared by `run` and `bench`. Each one overrides the config file.
#[derive(Args)]
struct EngineArgs {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Corpus root: one subdirectory per entity
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Shingle widths, comma separated
    #[arg(short = 'w', long = "widths", value_delimiter = ',')]
    widths: Vec<usize>,

    /// Sketch sizes, comma separated; "unbounded" or -1 for the full fingerprint
    #[arg(
        short = 'l',
        long = "sketch-sizes",
        value_delimiter = ',',
        allow_negative_numbers = true
    )]
    sketch_sizes: Vec<SketchSize>,

    /// Entities per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Reference marker
    #[arg(long)]
    marker: Option<String>,
}

impl EngineArgs {
    fn load(&self) -> Result<RevdriftConfig> {
        let mut config = match &self.config {
            Some(path) => RevdriftConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RevdriftConfig::default(),
        };

        if let Some(root) = &self.corpus {
            config.corpus.root = Some(root.clone());
        }
        if let Some(marker) = &self.marker {
            config.corpus.marker = marker.clone();
        }
        if !self.widths.is_empty() {
            config.engine.shingle_widths = self.widths.clone();
        }
        if !self.sketch_sizes.is_empty() {
            config.engine.sketch_sizes = self.sketch_sizes.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.engine.batch_size = batch_size;
        }
        if let Some(workers) = self.workers {
            config.engine.workers = workers;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    match cli.command {
        Commands::Run {
            engine,
            out,
            skipped,
        } => {
            let mut config = engine.load()?;
            if out.is_some() {
                config.output.records = out;
            }
            if skipped.is_some() {
                config.output.skipped = skipped;
            }
            let report = run_pipeline(&config).context("similarity run failed")?;
            summarize(&report);
        }
        Commands::Compare {
            dir,
            width,
            sketch_size,
            marker,
        } => compare_dir(&dir, width, sketch_size, &marker)?,
        Commands::Bench {
            engine,
            out,
            warmup_runs,
            measured_runs,
        } => {
            let mut config = engine.load()?;
            if out.is_some() {
                config.output.timings = out;
            }
            if let Some(runs) = warmup_runs {
                config.timing = config.timing.with_warmup_runs(runs);
            }
            if let Some(runs) = measured_runs {
                config.timing = config.timing.with_measured_runs(runs);
            }
            let report = bench_pipeline(&config).context("benchmark failed")?;
            info!(
                entities = report.entities.len(),
                combos = report.combos.len(),
                skipped = report.skipped.len(),
                failures = report.failures.len(),
                "bench_complete"
            );
        }
    }

    Ok(())
}

fn summarize(report: &RunReport) {
    for failure in &report.failures {
        warn!(error = %failure.error, entity = %failure.entity, "document_failed");
    }
    eprintln!(
        "{} records, {} entities skipped, {} documents failed, {} batches",
        report.records.len(),
        report.skipped.len(),
        report.failures.len(),
        report.batches
    );
}

fn compare_dir(dir: &Path, width: usize, size: SketchSize, marker: &str) -> Result<()> {
    let entity = dir
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable directory name", dir.display()))?;
    let root = match dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let engine = EngineConfig::new()
        .with_shingle_widths([width])
        .with_sketch_sizes([size]);
    engine.validate()?;

    let pattern = revdrift::LabelPattern::new(marker)?;
    let corpus = DirectoryCorpus::with_pattern(&root, pattern)?;
    let documents = corpus
        .documents(entity)?
        .iter()
        .map(|doc| corpus.read(doc))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading versions of {entity}"))?;

    let scores = match compare_versions(&documents, width, size, &engine.fingerprint_options()) {
        Ok(scores) => scores,
        Err(reason) => bail!("{entity} skipped: {reason}"),
    };
    for score in scores {
        println!("{}\t{:.6}", score.version, score.jaccard_value);
    }
    Ok(())
}
