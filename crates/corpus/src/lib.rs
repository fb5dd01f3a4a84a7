//! # revdrift corpus
//!
//! The boundary between prepared document text and the similarity engine.
//!
//! A corpus is a set of **entities** (one article, one city page), each owning
//! a family of **versions** named by a label: the bare reference marker for the
//! current snapshot, or `marker-N` for the snapshot `N` revisions older. This
//! crate recognizes those labels, resolves each entity's reference version,
//! and reads document text through the [`DocumentSource`] trait.
//!
//! Two sources ship here:
//!
//! - [`InMemoryCorpus`]: entity name to `(label, text)` pairs, for callers that
//!   already hold cleaned text.
//! - [`DirectoryCorpus`]: a prepared directory tree, read lazily so one bad
//!   file fails only its own document.
//!
//! Text cleaning, crawling and archive extraction happen upstream and are not
//! part of this crate.
//!
//! ## Example
//!
//! ```
//! use corpus::{resolve_reference, DocumentSource, InMemoryCorpus};
//!
//! let corpus = InMemoryCorpus::from_map([(
//!     "Austin_TX",
//!     vec![("C-0", "latest text"), ("C-4", "older text"), ("draft", "ignored")],
//! )]);
//!
//! let docs = corpus.documents("Austin_TX").unwrap();
//! assert_eq!(docs.len(), 2);
//!
//! let reference = resolve_reference(docs.iter().map(|d| &d.key.version)).unwrap();
//! assert_eq!(reference.as_str(), "C-0");
//! ```
mod directory;
mod error;
mod label;
mod source;

pub use crate::directory::DirectoryCorpus;
pub use crate::error::CorpusError;
pub use crate::label::{resolve_reference, LabelPattern, VersionLabel, DEFAULT_MARKER};
pub use crate::source::{Document, DocumentKey, DocumentRef, DocumentSource, InMemoryCorpus};
