//! Error types shared across the crate.

use thiserror::Error;

/// The tag mapping received from the mapping provider is not usable.
///
/// This is a caller contract violation, never a parse-time condition on the
/// RIS text itself.
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Tag mapping is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid tag for field {field}: '{tag}' (expected two characters)")]
    InvalidTag { field: &'static str, tag: String },
}

/// Failures raised by a record store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Record without title cannot be stored")]
    MissingTitle,
}

/// Failures of a whole ingestion call, labelled by the stage that failed.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("Duplicate lookup failed for '{title}': {source}")]
    Lookup {
        title: String,
        #[source]
        source: StoreError,
    },

    #[error("Storing unique records failed, batch rolled back: {0}")]
    Store(#[source] StoreError),
}

/// Errors raised while adjudicating partial duplicates.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("No review item at index {index} (queue holds {len})")]
    UnknownItem { index: usize, len: usize },

    #[error("Storing reviewed records failed, nothing was committed: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised while writing an export file.
#[cfg(feature = "csv")]
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
