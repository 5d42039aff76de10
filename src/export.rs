//! CSV export of duplicate evidence for offline review.
//!
//! # Example
//!
//! ```
//! use risdedupe::{ingest, SqliteStore, TagMapping};
//! use risdedupe::export::write_duplicates_csv;
//!
//! let mapping = TagMapping::from_json(
//!     r#"{"title":"TI","author":null,"journal_name":null,"publication_year":null,"keywords":null,"abstract":null}"#,
//! ).unwrap();
//! let mut store = SqliteStore::open_in_memory().unwrap();
//! ingest("TI  - Title\nER  -", &mapping, "Scopus", &mut store).unwrap();
//! let report = ingest("TI  - Title\nER  -", &mapping, "PubMed", &mut store).unwrap();
//!
//! let mut out = Vec::new();
//! write_duplicates_csv(&mut out, report.duplicates()).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("Title Match: Title (Scopus, n/a)"));
//! ```

use crate::ExportError;
use crate::dedupe::{DuplicateEvidence, ExistingRecordMatch, MatchField};
use itertools::Itertools;
use serde::Serialize;
use std::io::Write;

const MISSING: &str = "n/a";

#[derive(Debug, Serialize)]
struct DuplicateRow<'a> {
    #[serde(rename = "Duplicate_ID")]
    row: usize,
    #[serde(rename = "New_Record_Title")]
    title: Option<&'a str>,
    #[serde(rename = "New_Record_Source")]
    source: &'a str,
    #[serde(rename = "New_Record_Year")]
    year: Option<i32>,
    #[serde(rename = "New_Record_Abstract")]
    abstract_text: Option<&'a str>,
    #[serde(rename = "Duplicate_Type")]
    matched_on: String,
    #[serde(rename = "Existing_Records_Count")]
    existing_count: usize,
    #[serde(rename = "Existing_Duplicates")]
    existing: String,
}

impl<'a> DuplicateRow<'a> {
    fn new(row: usize, evidence: &'a DuplicateEvidence) -> Self {
        let matched_on = evidence
            .matched_on
            .iter()
            .map(|field| match field {
                MatchField::Title => "title",
                MatchField::Abstract => "abstract",
            })
            .join(", ");

        let existing = evidence
            .title_matches
            .iter()
            .map(|m| describe("Title Match", m))
            .chain(
                evidence
                    .abstract_matches
                    .iter()
                    .map(|m| describe("Abstract Match", m)),
            )
            .join("; ");

        Self {
            row,
            title: evidence.record.title.as_deref(),
            source: &evidence.source,
            year: evidence.record.year,
            abstract_text: evidence.record.abstract_text.as_deref(),
            matched_on,
            existing_count: evidence.existing_records().len(),
            existing,
        }
    }
}

fn describe(kind: &str, existing: &ExistingRecordMatch) -> String {
    let source = existing.source.as_deref().unwrap_or(MISSING);
    match existing.year {
        Some(year) => format!("{kind}: {} ({source}, {year})", existing.title),
        None => format!("{kind}: {} ({source}, {MISSING})", existing.title),
    }
}

/// Write one CSV row per duplicate, numbered from 1, with a header line.
///
/// `Existing_Records_Count` is the number of distinct stored records the
/// duplicate matched. A record matched on both title and abstract counts
/// once, so it can be lower than the number of entries listed in
/// `Existing_Duplicates`.
pub fn write_duplicates_csv<'a, W, I>(writer: W, duplicates: I) -> Result<(), ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a DuplicateEvidence>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (index, evidence) in duplicates.into_iter().enumerate() {
        csv_writer.serialize(DuplicateRow::new(index + 1, evidence))?;
    }
    csv_writer.flush()?;
    Ok(())
}
