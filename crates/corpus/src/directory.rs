//! File-system document source.
//!
//! Layout of a prepared corpus:
//!
//! ```text
//! root/
//! ├── Austin_TX/
//! │   ├── Austin_TX_C.txt      current snapshot
//! │   ├── Austin_TX_C-1.txt    one revision older
//! │   └── notes.md             ignored: no version label
//! └── Boise_ID/
//!     └── Boise_ID/            nested copy left behind by extraction
//!         └── Boise_ID_C-0.txt
//! ```
//!
//! Each immediate subdirectory of the root is one entity. When an entity
//! directory holds no regular files but has a subdirectory with the same name
//! (case-insensitively), that subdirectory is searched instead.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::CorpusError;
use crate::label::{LabelPattern, VersionLabel};
use crate::source::{Document, DocumentKey, DocumentRef, DocumentSource};

/// Corpus read lazily from a directory tree.
#[derive(Debug, Clone)]
pub struct DirectoryCorpus {
    root: PathBuf,
    pattern: LabelPattern,
}

impl DirectoryCorpus {
    /// Open `root` with the default reference marker.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CorpusError> {
        Self::with_pattern(root, LabelPattern::default())
    }

    pub fn with_pattern(root: impl Into<PathBuf>, pattern: LabelPattern) -> Result<Self, CorpusError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CorpusError::NotADirectory { path: root });
        }
        Ok(Self { root, pattern })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding an entity's files, after the nested-directory fallback.
    fn search_dir(&self, entity: &str) -> Result<PathBuf, CorpusError> {
        let dir = self.root.join(entity);
        if !dir.is_dir() {
            return Err(CorpusError::UnknownEntity(entity.to_string()));
        }

        let mut has_files = false;
        let mut nested = None;
        for entry in read_dir(&dir)? {
            let path = entry.path();
            if path.is_file() {
                has_files = true;
                break;
            }
            if path.is_dir()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| same_name_ignoring_case(name, entity))
            {
                nested = Some(path);
            }
        }

        match (has_files, nested) {
            (false, Some(nested)) => {
                debug!(entity, path = %nested.display(), "corpus_nested_directory");
                Ok(nested)
            }
            _ => Ok(dir),
        }
    }
}

/// Unicode-aware, so `Évry_FR` matches a nested `évry_fr`.
fn same_name_ignoring_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

fn read_dir(dir: &Path) -> Result<Vec<fs::DirEntry>, CorpusError> {
    fs::read_dir(dir)
        .map_err(|err| CorpusError::io(dir, &err))?
        .map(|entry| entry.map_err(|err| CorpusError::io(dir, &err)))
        .collect()
}

impl DocumentSource for DirectoryCorpus {
    fn entities(&self) -> Result<Vec<String>, CorpusError> {
        let mut names = Vec::new();
        for entry in read_dir(&self.root)? {
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!(name = ?raw, "corpus_entity_name_not_utf8"),
            }
        }
        names.sort();
        Ok(names)
    }

    fn documents(&self, entity: &str) -> Result<Vec<DocumentRef>, CorpusError> {
        let dir = self.search_dir(entity)?;

        // Sorted by file name so duplicate labels resolve the same way every run.
        let mut files: Vec<(String, PathBuf)> = read_dir(&dir)?
            .into_iter()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                Some((name, entry.path()))
            })
            .collect();
        files.sort();

        let mut by_label: BTreeMap<VersionLabel, PathBuf> = BTreeMap::new();
        for (name, path) in files {
            let Some(version) = self.pattern.parse(&name) else {
                debug!(entity, file = %name, "corpus_unlabeled_file");
                continue;
            };
            if let Some(existing) = by_label.get(&version) {
                warn!(
                    entity,
                    version = %version,
                    kept = %existing.display(),
                    ignored = %path.display(),
                    "corpus_duplicate_version"
                );
                continue;
            }
            by_label.insert(version, path);
        }

        Ok(by_label
            .into_iter()
            .map(|(version, path)| DocumentRef {
                key: DocumentKey::new(entity, version),
                path: Some(path),
            })
            .collect())
    }

    fn read(&self, doc: &DocumentRef) -> Result<Document, CorpusError> {
        let path = match &doc.path {
            Some(path) => path.clone(),
            None => {
                return Err(CorpusError::UnknownVersion {
                    entity: doc.key.entity.clone(),
                    version: doc.key.version.to_string(),
                })
            }
        };
        let bytes = fs::read(&path).map_err(|err| CorpusError::io(&path, &err))?;
        let text = String::from_utf8(bytes).map_err(|_| CorpusError::InvalidUtf8 { path })?;
        Ok(Document {
            key: doc.key.clone(),
            text: Arc::from(text),
        })
    }
}
