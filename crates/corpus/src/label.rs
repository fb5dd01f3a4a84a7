//! Version labels and reference resolution.
//!
//! A version label is the reference marker on its own (`C`, the current
//! snapshot) or the marker followed by a dash and a recency offset (`C-12`,
//! twelve snapshots older). Labels are recognized at the end of a name, with an
//! optional `.txt` extension, so `Austin_TX_C-12.txt` carries label `C-12`.
//! Names that carry no label are simply not versions.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CorpusError;

/// Reference marker used by prepared corpora unless configured otherwise.
pub const DEFAULT_MARKER: &str = "C";

static DEFAULT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&label_regex_source(DEFAULT_MARKER)).expect("default label regex is valid")
});

fn label_regex_source(marker: &str) -> String {
    format!(r"({}(?:-(\d+))?)(?:\.txt)?$", regex::escape(marker))
}

/// One recognized version label.
///
/// Labels order the current snapshot first, then by increasing offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct VersionLabel {
    offset: Option<u32>,
    label: String,
}

impl VersionLabel {
    /// The bare marker: the current snapshot.
    pub fn current(marker: &str) -> Self {
        Self {
            offset: None,
            label: marker.to_string(),
        }
    }

    /// The marker with an explicit offset, e.g. `C-3`.
    pub fn with_offset(marker: &str, offset: u32) -> Self {
        Self {
            offset: Some(offset),
            label: format!("{marker}-{offset}"),
        }
    }

    /// True for the bare marker.
    pub fn is_current(&self) -> bool {
        self.offset.is_none()
    }

    /// Recency offset; `None` for the bare marker.
    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl From<VersionLabel> for String {
    fn from(label: VersionLabel) -> Self {
        label.label
    }
}

/// Recognizes version labels for a given reference marker.
#[derive(Debug, Clone)]
pub struct LabelPattern {
    marker: String,
    regex: Regex,
}

impl LabelPattern {
    pub fn new(marker: &str) -> Result<Self, CorpusError> {
        if marker.is_empty() || marker.chars().any(char::is_whitespace) {
            return Err(CorpusError::InvalidMarker(marker.to_string()));
        }
        let regex = Regex::new(&label_regex_source(marker))
            .map_err(|_| CorpusError::InvalidMarker(marker.to_string()))?;
        Ok(Self {
            marker: marker.to_string(),
            regex,
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Extract the version label carried by `name`, if any.
    ///
    /// Offsets that do not fit a `u32` make the name unrecognized.
    pub fn parse(&self, name: &str) -> Option<VersionLabel> {
        let caps = self.regex.captures(name)?;
        let label = caps.get(1)?.as_str().to_string();
        let offset = match caps.get(2) {
            Some(digits) => Some(digits.as_str().parse::<u32>().ok()?),
            None => None,
        };
        Some(VersionLabel { offset, label })
    }
}

impl Default for LabelPattern {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            regex: DEFAULT_REGEX.clone(),
        }
    }
}

/// Pick the reference version among `labels`.
///
/// The bare marker wins; otherwise offset 0; otherwise there is no reference.
pub fn resolve_reference<'a, I>(labels: I) -> Option<&'a VersionLabel>
where
    I: IntoIterator<Item = &'a VersionLabel>,
{
    let mut zero = None;
    for label in labels {
        match label.offset {
            None => return Some(label),
            Some(0) if zero.is_none() => zero = Some(label),
            _ => {}
        }
    }
    zero
}
