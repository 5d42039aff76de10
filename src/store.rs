//! Persistence of normalized records.
//!
//! [`CitationStore`] is what the ingestion pipeline writes through; it is a
//! [`DuplicateLookup`] as well, so the same handle answers the classifier's
//! queries. [`SqliteStore`] is the bundled implementation.

mod schema;
mod sqlite;
mod stats;

use crate::dedupe::{DuplicateLookup, RecordId};
use crate::{NormalizedRecord, StoreError};

pub use sqlite::SqliteStore;
pub use stats::{NameCount, Statistics, YearCount};

/// A record to store, paired with the label of the source it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcedRecord<'a> {
    pub source: &'a str,
    pub record: &'a NormalizedRecord,
}

impl<'a> SourcedRecord<'a> {
    pub fn new(source: &'a str, record: &'a NormalizedRecord) -> Self {
        Self { source, record }
    }
}

/// A record store that can persist batches atomically.
pub trait CitationStore: DuplicateLookup {
    /// Store every record of `batch` in one transaction.
    ///
    /// Returns the new ids in batch order. On error nothing from the batch is
    /// persisted.
    fn store_batch(&mut self, batch: &[SourcedRecord<'_>]) -> Result<Vec<RecordId>, StoreError>;
}
