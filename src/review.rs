//! Human adjudication of partial duplicates.
//!
//! A [`ReviewQueue`] holds the partial duplicates of an ingestion until a
//! reviewer has decided each one. Records judged unique go to the store
//! through the same path as any unique record, without being classified
//! again. The queue is plain data and can be kept between requests, e.g.
//! serialized into a session.

use crate::ReviewError;
use crate::dedupe::{DuplicateEvidence, RecordId};
use crate::pipeline::IngestionReport;
use crate::store::{CitationStore, SourcedRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A reviewer's verdict on one partial duplicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    #[default]
    Pending,
    /// Same work as a stored record; discard.
    Duplicate,
    /// A distinct work; store it.
    Unique,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub evidence: DuplicateEvidence,
    pub decision: ReviewDecision,
}

/// Partial duplicates awaiting or carrying a decision, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewQueue {
    items: Vec<ReviewItem>,
}

impl ReviewQueue {
    pub fn new(evidence: impl IntoIterator<Item = DuplicateEvidence>) -> Self {
        Self {
            items: evidence
                .into_iter()
                .map(|evidence| ReviewItem {
                    evidence,
                    decision: ReviewDecision::Pending,
                })
                .collect(),
        }
    }

    /// Queue every partial duplicate of `report`.
    pub fn from_report(report: &IngestionReport) -> Self {
        Self::new(report.partial_duplicates.iter().cloned())
    }

    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items not decided yet.
    pub fn pending(&self) -> impl Iterator<Item = &ReviewItem> {
        self.items
            .iter()
            .filter(|item| item.decision == ReviewDecision::Pending)
    }

    /// Record `decision` for the item at `index`. Decisions can be changed
    /// until the next [`commit`](Self::commit).
    pub fn decide(&mut self, index: usize, decision: ReviewDecision) -> Result<(), ReviewError> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(ReviewError::UnknownItem { index, len })?;
        item.decision = decision;
        Ok(())
    }

    /// Store every item decided [`ReviewDecision::Unique`] in one batch, then
    /// drop all decided items from the queue.
    ///
    /// Returns the new ids in queue order. If storing fails, nothing is
    /// stored and the queue is left as it was.
    pub fn commit<S>(&mut self, store: &mut S) -> Result<Vec<RecordId>, ReviewError>
    where
        S: CitationStore + ?Sized,
    {
        let stored_ids = {
            let batch: Vec<SourcedRecord<'_>> = self
                .items
                .iter()
                .filter(|item| item.decision == ReviewDecision::Unique)
                .map(|item| SourcedRecord::new(&item.evidence.source, &item.evidence.record))
                .collect();
            store.store_batch(&batch)?
        };

        let discarded = self
            .items
            .iter()
            .filter(|item| item.decision == ReviewDecision::Duplicate)
            .count();
        self.items.retain(|item| item.decision == ReviewDecision::Pending);
        info!(
            stored = stored_ids.len(),
            discarded,
            pending = self.items.len(),
            "committed review decisions"
        );
        Ok(stored_ids)
    }
}
