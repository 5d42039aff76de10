//! Duplicate classification against already stored records.
//!
//! A new record is compared with the store on two fields, title and
//! abstract, using exact equality after [`normalize_key`]. The outcome is one
//! of three verdicts:
//!
//! - [`DuplicateVerdict::Unique`]: nothing matches on either field.
//! - [`DuplicateVerdict::FullDuplicate`]: one stored record matches on title
//!   **and** abstract at the same time.
//! - [`DuplicateVerdict::PartialDuplicate`]: something matches, but no single
//!   stored record matches on both fields. A human has to decide.
//!
//! Matching the title of one stored record and the abstract of another is
//! partial, not full: only the intersection of stored ids counts.
//!
//! ## Usage
//!
//! ```rust
//! use risdedupe::dedupe::{classify, DuplicateLookup, DuplicateVerdict, ExistingRecordMatch, normalize_key};
//! use risdedupe::{NormalizedRecord, StoreError};
//!
//! struct Stored(Vec<ExistingRecordMatch>);
//!
//! impl DuplicateLookup for Stored {
//!     fn find_by_title(&self, key: &str) -> Result<Vec<ExistingRecordMatch>, StoreError> {
//!         Ok(self.0.iter().filter(|m| normalize_key(&m.title) == key).cloned().collect())
//!     }
//!     fn find_by_abstract(&self, key: &str) -> Result<Vec<ExistingRecordMatch>, StoreError> {
//!         Ok(self.0.iter()
//!             .filter(|m| m.abstract_text.as_deref().map(normalize_key).as_deref() == Some(key))
//!             .cloned()
//!             .collect())
//!     }
//! }
//!
//! let store = Stored(vec![ExistingRecordMatch {
//!     id: 1,
//!     title: "Deep Learning".to_string(),
//!     source: Some("Scopus".to_string()),
//!     year: Some(2015),
//!     abstract_text: Some("A study of...".to_string()),
//! }]);
//!
//! let record = NormalizedRecord {
//!     title: Some("deep learning ".to_string()),
//!     abstract_text: Some("A STUDY OF...".to_string()),
//!     ..Default::default()
//! };
//!
//! let classification = classify(&record, &store).unwrap();
//! assert_eq!(classification.verdict, DuplicateVerdict::FullDuplicate);
//! ```

use crate::{NormalizedRecord, StoreError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Identifier of a stored record.
pub type RecordId = i64;

/// Comparison form of a title or abstract: trimmed and lowercased.
///
/// Stores must apply the same function to their side of the comparison.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A stored record returned by a duplicate lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingRecordMatch {
    pub id: RecordId,
    pub title: String,
    /// Name of the source the stored record was imported from.
    pub source: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

/// Read access to stored records, keyed by [`normalize_key`] output.
pub trait DuplicateLookup {
    /// Stored records whose normalized title equals `title_key`.
    fn find_by_title(&self, title_key: &str) -> Result<Vec<ExistingRecordMatch>, StoreError>;

    /// Stored records with a non-null abstract whose normalized form equals
    /// `abstract_key`.
    fn find_by_abstract(&self, abstract_key: &str) -> Result<Vec<ExistingRecordMatch>, StoreError>;
}

/// Outcome of comparing one record against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateVerdict {
    Unique,
    FullDuplicate,
    PartialDuplicate,
}

/// Field on which a stored record matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Title,
    Abstract,
}

/// A verdict together with the evidence it was reached from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub verdict: DuplicateVerdict,
    pub title_matches: Vec<ExistingRecordMatch>,
    pub abstract_matches: Vec<ExistingRecordMatch>,
}

impl Classification {
    /// Ids of stored records matching on both title and abstract.
    pub fn shared_ids(&self) -> BTreeSet<RecordId> {
        let title_ids: HashSet<RecordId> = self.title_matches.iter().map(|m| m.id).collect();
        self.abstract_matches
            .iter()
            .map(|m| m.id)
            .filter(|id| title_ids.contains(id))
            .collect()
    }

    /// Which fields produced at least one match, title first.
    pub fn matched_on(&self) -> Vec<MatchField> {
        let mut fields = Vec::with_capacity(2);
        if !self.title_matches.is_empty() {
            fields.push(MatchField::Title);
        }
        if !self.abstract_matches.is_empty() {
            fields.push(MatchField::Abstract);
        }
        fields
    }
}

/// Classify `record` against the records visible through `lookup`.
///
/// Read-only. A record without an abstract can only match on title; a record
/// without a title can only match on abstract.
///
/// # Errors
///
/// Lookup failures are returned as they are, never read as "no match".
pub fn classify<L>(record: &NormalizedRecord, lookup: &L) -> Result<Classification, StoreError>
where
    L: DuplicateLookup + ?Sized,
{
    let title_matches = match record.title.as_deref().map(normalize_key) {
        Some(key) if !key.is_empty() => lookup.find_by_title(&key)?,
        _ => Vec::new(),
    };

    let abstract_matches = match record.abstract_text.as_deref().map(normalize_key) {
        Some(key) if !key.is_empty() => lookup.find_by_abstract(&key)?,
        _ => Vec::new(),
    };

    let mut classification = Classification {
        verdict: DuplicateVerdict::Unique,
        title_matches,
        abstract_matches,
    };

    if classification.title_matches.is_empty() && classification.abstract_matches.is_empty() {
        return Ok(classification);
    }

    classification.verdict = if classification.shared_ids().is_empty() {
        DuplicateVerdict::PartialDuplicate
    } else {
        DuplicateVerdict::FullDuplicate
    };

    Ok(classification)
}

/// Everything a reviewer needs to judge a duplicate: the incoming record,
/// where it came from, and the stored records it collided with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEvidence {
    pub record: NormalizedRecord,
    pub source: String,
    pub verdict: DuplicateVerdict,
    pub matched_on: Vec<MatchField>,
    pub title_matches: Vec<ExistingRecordMatch>,
    pub abstract_matches: Vec<ExistingRecordMatch>,
}

impl DuplicateEvidence {
    pub fn new(record: NormalizedRecord, source: &str, classification: Classification) -> Self {
        Self {
            record,
            source: source.to_string(),
            verdict: classification.verdict,
            matched_on: classification.matched_on(),
            title_matches: classification.title_matches,
            abstract_matches: classification.abstract_matches,
        }
    }

    /// Title matches then abstract matches, each stored record once.
    pub fn existing_records(&self) -> Vec<&ExistingRecordMatch> {
        self.title_matches
            .iter()
            .chain(&self.abstract_matches)
            .unique_by(|m| m.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::cell::Cell;

    /// In-memory store comparing on [`normalize_key`] like the SQLite store.
    #[derive(Default)]
    struct MemoryLookup {
        rows: Vec<ExistingRecordMatch>,
        queries: Cell<usize>,
    }

    impl MemoryLookup {
        fn with(mut self, id: RecordId, title: &str, abstract_text: Option<&str>) -> Self {
            self.rows.push(ExistingRecordMatch {
                id,
                title: title.to_string(),
                source: Some("Scopus".to_string()),
                year: Some(2020),
                abstract_text: abstract_text.map(str::to_string),
            });
            self
        }
    }

    impl DuplicateLookup for MemoryLookup {
        fn find_by_title(&self, title_key: &str) -> Result<Vec<ExistingRecordMatch>, StoreError> {
            self.queries.set(self.queries.get() + 1);
            Ok(self
                .rows
                .iter()
                .filter(|row| normalize_key(&row.title) == title_key)
                .cloned()
                .collect())
        }

        fn find_by_abstract(
            &self,
            abstract_key: &str,
        ) -> Result<Vec<ExistingRecordMatch>, StoreError> {
            self.queries.set(self.queries.get() + 1);
            Ok(self
                .rows
                .iter()
                .filter(|row| {
                    row.abstract_text
                        .as_deref()
                        .is_some_and(|text| normalize_key(text) == abstract_key)
                })
                .cloned()
                .collect())
        }
    }

    struct FailingLookup;

    impl DuplicateLookup for FailingLookup {
        fn find_by_title(&self, _: &str) -> Result<Vec<ExistingRecordMatch>, StoreError> {
            Err(StoreError::Query("database is locked".to_string()))
        }

        fn find_by_abstract(&self, _: &str) -> Result<Vec<ExistingRecordMatch>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn record(title: &str, abstract_text: Option<&str>) -> NormalizedRecord {
        NormalizedRecord {
            title: Some(title.to_string()),
            abstract_text: abstract_text.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_duplicate() {
        let store = MemoryLookup::default().with(1, "Deep Learning", Some("A study of..."));
        let result = classify(&record("Deep Learning", Some("A study of...")), &store).unwrap();

        assert_eq!(result.verdict, DuplicateVerdict::FullDuplicate);
        assert_eq!(result.shared_ids(), BTreeSet::from([1]));
        assert_eq!(
            result.matched_on(),
            vec![MatchField::Title, MatchField::Abstract]
        );
    }

    #[test]
    fn test_partial_duplicate_when_matches_split_across_rows() {
        let store = MemoryLookup::default()
            .with(1, "Deep Learning", Some("Something else"))
            .with(2, "Another Title", Some("A study of..."));
        let result = classify(&record("Deep Learning", Some("A study of...")), &store).unwrap();

        assert_eq!(result.verdict, DuplicateVerdict::PartialDuplicate);
        assert_eq!(result.title_matches[0].id, 1);
        assert_eq!(result.abstract_matches[0].id, 2);
        assert!(result.shared_ids().is_empty());
    }

    #[test]
    fn test_partial_duplicate_title_only() {
        let store = MemoryLookup::default().with(1, "Deep Learning", Some("Original abstract"));
        let result = classify(&record("Deep Learning", Some("Revised abstract")), &store).unwrap();

        assert_eq!(result.verdict, DuplicateVerdict::PartialDuplicate);
        assert_eq!(result.matched_on(), vec![MatchField::Title]);
    }

    #[test]
    fn test_unique() {
        let store = MemoryLookup::default().with(1, "Deep Learning", Some("A study of..."));
        let result = classify(&record("Shallow Learning", Some("Another study")), &store).unwrap();

        assert_eq!(result.verdict, DuplicateVerdict::Unique);
        assert!(result.title_matches.is_empty());
        assert!(result.abstract_matches.is_empty());
    }

    #[rstest]
    #[case("DEEP LEARNING")]
    #[case("  deep learning\t")]
    #[case("Deep Learning")]
    fn test_title_comparison_ignores_case_and_padding(#[case] incoming: &str) {
        let store = MemoryLookup::default().with(1, "  Deep Learning  ", None);
        let result = classify(&record(incoming, None), &store).unwrap();
        assert_eq!(result.verdict, DuplicateVerdict::PartialDuplicate);
        assert_eq!(result.title_matches.len(), 1);
    }

    #[test]
    fn test_missing_abstract_only_matches_on_title() {
        let store = MemoryLookup::default().with(1, "Deep Learning", None);
        let result = classify(&record("Deep Learning", None), &store).unwrap();

        // Only the title query runs; a stored row without abstract can never
        // complete a full match.
        assert_eq!(store.queries.get(), 1);
        assert_eq!(result.verdict, DuplicateVerdict::PartialDuplicate);
    }

    #[test]
    fn test_blank_abstract_is_not_queried() {
        let store = MemoryLookup::default().with(1, "Other", Some("   "));
        let result = classify(&record("Deep Learning", Some("   ")), &store).unwrap();
        assert_eq!(store.queries.get(), 1);
        assert_eq!(result.verdict, DuplicateVerdict::Unique);
    }

    #[test]
    fn test_one_full_row_among_partial_rows() {
        let store = MemoryLookup::default()
            .with(1, "Deep Learning", None)
            .with(2, "Deep Learning", Some("A study of..."))
            .with(3, "Other", Some("A study of..."));
        let result = classify(&record("Deep Learning", Some("A study of...")), &store).unwrap();

        assert_eq!(result.verdict, DuplicateVerdict::FullDuplicate);
        assert_eq!(result.shared_ids(), BTreeSet::from([2]));
    }

    #[test]
    fn test_lookup_failure_propagates() {
        let result = classify(&record("Deep Learning", None), &FailingLookup);
        assert!(matches!(result, Err(StoreError::Query(_))));
    }

    #[test]
    fn test_existing_records_deduplicates_by_id() {
        let store = MemoryLookup::default()
            .with(1, "Deep Learning", Some("Other"))
            .with(2, "Deep Learning", Some("A study of..."))
            .with(3, "Other", Some("A study of..."));
        let incoming = record("Deep Learning", Some("A study of..."));
        let classification = classify(&incoming, &store).unwrap();
        let evidence = DuplicateEvidence::new(incoming, "PubMed", classification);

        let ids: Vec<RecordId> = evidence.existing_records().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(evidence.verdict, DuplicateVerdict::FullDuplicate);
        assert_eq!(evidence.source, "PubMed");
    }
}
