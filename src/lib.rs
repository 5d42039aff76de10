//! Ingestion of RIS citation exports into a local database, with duplicate
//! detection across sources.
//!
//! `risdedupe` reads RIS files exported from bibliographic databases (Scopus,
//! PubMed, Web of Science, ...), normalizes every entry into a
//! [`NormalizedRecord`], and compares it with what is already stored before
//! anything is written.
//!
//! # Key Features
//!
//! - **Mapping-driven parsing**: exporters disagree on tag codes, so a
//!   [`TagMapping`] says which code holds the title, authors, journal, year,
//!   keywords and abstract of a given file
//! - **Lenient input**: malformed chunks, untitled entries and odd dates
//!   degrade to absent fields instead of failing the file
//! - **Three-way duplicate classification**: unique, full duplicate (one
//!   stored record matches on title and abstract) or partial duplicate
//!   (needs a human decision)
//! - **Atomic ingestion**: the unique records of one file are stored in a
//!   single transaction, all or nothing
//! - **SQLite storage** with journals, authors and keywords normalized into
//!   their own tables
//!
//! # Basic Usage
//!
//! ```rust
//! use risdedupe::{ingest, SqliteStore, TagMapping};
//!
//! let mapping = TagMapping::from_json(
//!     r#"{"title":"TI","author":"AU","journal_name":"JO","publication_year":"PY","keywords":"KW","abstract":"AB"}"#,
//! ).unwrap();
//!
//! let input = r#"TY  - JOUR
//! TI  - Example Article
//! AU  - Smith, John
//! PY  - 2023
//! ER  -"#;
//!
//! let mut store = SqliteStore::open_in_memory().unwrap();
//! let report = ingest(input, &mapping, "Scopus", &mut store).unwrap();
//! assert_eq!(report.counts.stored, 1);
//!
//! // The same file again is now a duplicate of what was just stored.
//! let report = ingest(input, &mapping, "Scopus", &mut store).unwrap();
//! assert_eq!(report.counts.stored, 0);
//! assert_eq!(report.counts.partial_duplicates, 1);
//! ```
//!
//! # Reviewing Partial Duplicates
//!
//! Partial duplicates are never stored automatically. Load them into a
//! [`ReviewQueue`], decide each one, then commit the records judged unique:
//!
//! ```rust
//! use risdedupe::{ingest, ReviewDecision, ReviewQueue, SqliteStore, TagMapping};
//!
//! let mapping = TagMapping::from_json(
//!     r#"{"title":"TI","author":null,"journal_name":null,"publication_year":null,"keywords":null,"abstract":"AB"}"#,
//! ).unwrap();
//! let mut store = SqliteStore::open_in_memory().unwrap();
//! ingest("TI  - Title\nAB  - First version\nER  -", &mapping, "Scopus", &mut store).unwrap();
//!
//! let report = ingest("TI  - Title\nAB  - Revised version\nER  -", &mapping, "PubMed", &mut store).unwrap();
//! let mut queue = ReviewQueue::from_report(&report);
//! queue.decide(0, ReviewDecision::Unique).unwrap();
//! let stored = queue.commit(&mut store).unwrap();
//! assert_eq!(stored.len(), 1);
//! ```
//!
//! # Error Handling
//!
//! Each layer has its own error type. Parsing never fails on input text;
//! failures come from invalid mappings ([`MappingError`]) or the store
//! ([`StoreError`]), and are reported per call by [`IngestError`]:
//!
//! ```rust
//! use risdedupe::{MappingError, TagMapping};
//!
//! let result = TagMapping::from_json(r#"{"title":"TITLE"}"#);
//! assert!(matches!(result, Err(MappingError::Json(_))));
//! ```

use serde::{Deserialize, Serialize};

pub mod dedupe;
pub mod error;
#[cfg(feature = "csv")]
pub mod export;
pub mod mapping;
pub mod pipeline;
mod regex;
pub mod review;
pub mod ris;
pub mod store;

// Reexports
pub use dedupe::{DuplicateEvidence, DuplicateLookup, DuplicateVerdict, RecordId, classify};
#[cfg(feature = "csv")]
pub use error::ExportError;
pub use error::{IngestError, MappingError, ReviewError, StoreError};
pub use mapping::{SemanticField, TagMapping};
pub use pipeline::{IngestionCounts, IngestionReport, ingest, ingest_with_mapping_json};
pub use review::{ReviewDecision, ReviewQueue};
pub use ris::{RisParser, RisTag};
pub use store::{CitationStore, SourcedRecord, SqliteStore, Statistics};

/// One bibliographic entry in mapping-independent form.
///
/// A record is only ever stored with a title; the parser drops entries
/// without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Title of the work
    pub title: Option<String>,
    /// Journal name
    pub journal: Option<String>,
    /// Publication year
    pub year: Option<i32>,
    /// Abstract text, continuation lines joined with single spaces
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Authors in file order, one entry per author line
    pub authors: Vec<String>,
    /// Keywords in file order
    pub keywords: Vec<String>,
}
