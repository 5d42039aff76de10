//! One-call ingestion of a RIS file: split, extract, classify, store.
//!
//! Only records classified [`DuplicateVerdict::Unique`] are written, and they
//! are written through a single [`CitationStore::store_batch`] call, so a
//! batch is either stored completely or not at all. Full and partial
//! duplicates come back in the [`IngestionReport`] with their evidence.
//!
//! Records are classified against what the store held before the call.
//! Two copies of one record inside the same file are both unique.

use crate::dedupe::{DuplicateEvidence, DuplicateVerdict, RecordId, classify};
use crate::store::{CitationStore, SourcedRecord};
use crate::{IngestError, NormalizedRecord, RisParser, TagMapping};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Record counts of one ingestion call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestionCounts {
    /// Records with a title found in the file.
    pub parsed: usize,
    pub stored: usize,
    pub full_duplicates: usize,
    pub partial_duplicates: usize,
}

/// Outcome of [`ingest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionReport {
    pub source: String,
    pub mapping: TagMapping,
    pub counts: IngestionCounts,
    /// Ids of the stored unique records, in file order.
    pub stored_ids: Vec<RecordId>,
    pub full_duplicates: Vec<DuplicateEvidence>,
    /// Duplicates awaiting a human decision, see [`crate::ReviewQueue`].
    pub partial_duplicates: Vec<DuplicateEvidence>,
}

impl IngestionReport {
    /// Full duplicates followed by partial duplicates.
    pub fn duplicates(&self) -> impl Iterator<Item = &DuplicateEvidence> {
        self.full_duplicates.iter().chain(&self.partial_duplicates)
    }
}

/// Ingest the RIS `text` exported from `source` into `store`.
///
/// # Errors
///
/// - [`IngestError::Lookup`] if a duplicate query fails; nothing is stored.
/// - [`IngestError::Store`] if storing the unique records fails; the batch
///   is rolled back.
pub fn ingest<S>(
    text: &str,
    mapping: &TagMapping,
    source: &str,
    store: &mut S,
) -> Result<IngestionReport, IngestError>
where
    S: CitationStore + ?Sized,
{
    let records = RisParser::new(mapping.clone()).parse(text);
    let parsed = records.len();

    let mut unique: Vec<NormalizedRecord> = Vec::new();
    let mut full_duplicates = Vec::new();
    let mut partial_duplicates = Vec::new();

    for record in records {
        let classification = classify(&record, &*store).map_err(|error| IngestError::Lookup {
            title: record.title.clone().unwrap_or_default(),
            source: error,
        })?;
        debug!(
            title = record.title.as_deref().unwrap_or_default(),
            verdict = ?classification.verdict,
            title_matches = classification.title_matches.len(),
            abstract_matches = classification.abstract_matches.len(),
            "classified record"
        );
        match classification.verdict {
            DuplicateVerdict::Unique => unique.push(record),
            DuplicateVerdict::FullDuplicate => {
                full_duplicates.push(DuplicateEvidence::new(record, source, classification))
            }
            DuplicateVerdict::PartialDuplicate => {
                partial_duplicates.push(DuplicateEvidence::new(record, source, classification))
            }
        }
    }

    let batch: Vec<SourcedRecord<'_>> = unique
        .iter()
        .map(|record| SourcedRecord::new(source, record))
        .collect();
    let stored_ids = store.store_batch(&batch).map_err(|error| {
        warn!(source, records = batch.len(), %error, "rolled back batch of unique records");
        IngestError::Store(error)
    })?;

    let counts = IngestionCounts {
        parsed,
        stored: stored_ids.len(),
        full_duplicates: full_duplicates.len(),
        partial_duplicates: partial_duplicates.len(),
    };
    info!(
        source,
        parsed = counts.parsed,
        stored = counts.stored,
        full_duplicates = counts.full_duplicates,
        partial_duplicates = counts.partial_duplicates,
        "ingested batch"
    );

    Ok(IngestionReport {
        source: source.to_string(),
        mapping: mapping.clone(),
        counts,
        stored_ids,
        full_duplicates,
        partial_duplicates,
    })
}

/// [`ingest`] with the mapping still in the provider's JSON form.
///
/// # Errors
///
/// [`IngestError::Mapping`] if the JSON is not a valid mapping, before the
/// text is looked at; otherwise as [`ingest`].
pub fn ingest_with_mapping_json<S>(
    text: &str,
    mapping_json: &str,
    source: &str,
    store: &mut S,
) -> Result<IngestionReport, IngestError>
where
    S: CitationStore + ?Sized,
{
    let mapping = TagMapping::from_json(mapping_json)?;
    ingest(text, &mapping, source, store)
}
