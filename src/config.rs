//! YAML configuration file support for revdrift.
//!
//! One file describes a whole run: engine parameters, where the prepared corpus
//! lives, and where results go. Command-line flags override file values.
//!
//! ## Example YAML configuration
//!
//! ```yaml
//! version: "1"
//! name: "city revisions"
//!
//! engine:
//!   shingle_widths: [25, 50]
//!   sketch_sizes: [8, 16, 32, 64, unbounded]
//!   batch_size: 10
//!   workers: 8
//!   shingle_mode: strict
//!   seed: 0
//!
//! corpus:
//!   root: full_corpus_cleaned
//!   marker: C
//!
//! output:
//!   records: results/similarity.jsonl
//!   skipped: results/skipped_entities.log
//!   timings: results/timings.jsonl
//!
//! timing:
//!   warmup_runs: 3
//!   measured_runs: 5
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use corpus::{LabelPattern, DEFAULT_MARKER};
use engine::{EngineConfig, TimingConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevdriftConfig {
    /// Configuration format version.
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub corpus: CorpusSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub timing: TimingConfig,
}

impl RevdriftConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: RevdriftConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    ///
    /// Called by the loaders; call it again after applying overrides.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1" | "1.0" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }
        self.engine
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("engine: {err}")))?;
        self.timing
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("timing: {err}")))?;
        self.corpus.label_pattern()?;
        Ok(())
    }
}

impl Default for RevdriftConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            engine: EngineConfig::default(),
            corpus: CorpusSection::default(),
            output: OutputSection::default(),
            timing: TimingConfig::default(),
        }
    }
}

/// Where the prepared corpus lives and how versions are labeled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpusSection {
    /// Corpus root; one subdirectory per entity.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Reference marker in version labels (`C`, `C-1`, ...).
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl CorpusSection {
    pub fn label_pattern(&self) -> Result<LabelPattern, ConfigLoadError> {
        LabelPattern::new(&self.marker)
            .map_err(|err| ConfigLoadError::Validation(format!("corpus: {err}")))
    }
}

impl Default for CorpusSection {
    fn default() -> Self {
        Self {
            root: None,
            marker: default_marker(),
        }
    }
}

/// Output destinations. Unset paths mean stdout for records and no file for
/// the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputSection {
    #[serde(default)]
    pub records: Option<PathBuf>,

    #[serde(default)]
    pub skipped: Option<PathBuf>,

    #[serde(default)]
    pub timings: Option<PathBuf>,
}

fn default_version() -> String {
    "1".to_string()
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}
