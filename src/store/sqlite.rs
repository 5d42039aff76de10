use super::schema::{apply_pragmas, ensure_schema};
use super::stats::{Statistics, collect_statistics};
use super::{CitationStore, SourcedRecord};
use crate::dedupe::{DuplicateLookup, ExistingRecordMatch, RecordId, normalize_key};
use crate::{NormalizedRecord, StoreError};
use rusqlite::{Connection, Row, params};
use std::path::Path;
use tracing::debug;

const FIND_BY_TITLE_KEY: &str = "
    SELECT a.id, a.title, s.name, a.year, a.abstract
    FROM articles a
    LEFT JOIN sources s ON s.id = a.source_id
    WHERE a.title_key = ?1
    ORDER BY a.id
";

const FIND_BY_ABSTRACT_KEY: &str = "
    SELECT a.id, a.title, s.name, a.year, a.abstract
    FROM articles a
    LEFT JOIN sources s ON s.id = a.source_id
    WHERE a.abstract_key = ?1
    ORDER BY a.id
";

/// Lookup tables referenced from `articles` and its link tables.
#[derive(Debug, Clone, Copy)]
enum Dimension {
    Source,
    Journal,
    Author,
    Keyword,
}

impl Dimension {
    fn select_sql(self) -> &'static str {
        match self {
            Dimension::Source => "SELECT id FROM sources WHERE name = ?1",
            Dimension::Journal => "SELECT id FROM journals WHERE name = ?1",
            Dimension::Author => "SELECT id FROM authors WHERE name = ?1",
            Dimension::Keyword => "SELECT id FROM keywords WHERE term = ?1",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            Dimension::Source => "INSERT OR IGNORE INTO sources (name) VALUES (?1)",
            Dimension::Journal => "INSERT OR IGNORE INTO journals (name) VALUES (?1)",
            Dimension::Author => "INSERT OR IGNORE INTO authors (name) VALUES (?1)",
            Dimension::Keyword => "INSERT OR IGNORE INTO keywords (term) VALUES (?1)",
        }
    }
}

/// [`CitationStore`] backed by a SQLite database.
///
/// # Example
///
/// ```
/// use risdedupe::{CitationStore, NormalizedRecord, SourcedRecord, SqliteStore};
///
/// let mut store = SqliteStore::open_in_memory().unwrap();
/// let record = NormalizedRecord {
///     title: Some("Deep Learning".to_string()),
///     year: Some(2015),
///     ..Default::default()
/// };
///
/// let ids = store.store_batch(&[SourcedRecord::new("Scopus", &record)]).unwrap();
/// assert_eq!(ids.len(), 1);
/// assert_eq!(store.record_count().unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let connection = Connection::open(path.as_ref())?;
        apply_pragmas(&connection, true)?;
        ensure_schema(&connection)?;
        debug!(path = %path.as_ref().display(), "opened citation store");
        Ok(Self { connection })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory()?;
        apply_pragmas(&connection, false)?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    /// The underlying connection, for queries this type does not cover.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Number of stored articles.
    pub fn record_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Totals and top lists over the whole store.
    pub fn statistics(&self) -> Result<Statistics, StoreError> {
        Ok(collect_statistics(&self.connection)?)
    }

    fn find_matches(&self, sql: &str, key: &str) -> Result<Vec<ExistingRecordMatch>, StoreError> {
        let mut statement = self.connection.prepare_cached(sql)?;
        let matches = statement
            .query_map([key], existing_record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }
}

impl DuplicateLookup for SqliteStore {
    fn find_by_title(&self, title_key: &str) -> Result<Vec<ExistingRecordMatch>, StoreError> {
        self.find_matches(FIND_BY_TITLE_KEY, title_key)
    }

    fn find_by_abstract(&self, abstract_key: &str) -> Result<Vec<ExistingRecordMatch>, StoreError> {
        self.find_matches(FIND_BY_ABSTRACT_KEY, abstract_key)
    }
}

impl CitationStore for SqliteStore {
    fn store_batch(&mut self, batch: &[SourcedRecord<'_>]) -> Result<Vec<RecordId>, StoreError> {
        // Dropping the transaction without commit rolls it back.
        let tx = self.connection.transaction()?;
        let mut ids = Vec::with_capacity(batch.len());
        for item in batch {
            ids.push(insert_article(&tx, item.source, item.record)?);
        }
        tx.commit()?;
        Ok(ids)
    }
}

fn existing_record_from_row(row: &Row<'_>) -> rusqlite::Result<ExistingRecordMatch> {
    Ok(ExistingRecordMatch {
        id: row.get(0)?,
        title: row.get(1)?,
        source: row.get(2)?,
        year: row.get(3)?,
        abstract_text: row.get(4)?,
    })
}

/// Id of the row named exactly `name`, inserting it if missing. Blank
/// names have no row.
fn get_or_create(
    connection: &Connection,
    dimension: Dimension,
    name: &str,
) -> rusqlite::Result<Option<i64>> {
    if name.trim().is_empty() {
        return Ok(None);
    }
    connection
        .prepare_cached(dimension.insert_sql())?
        .execute([name])?;
    let id = connection
        .prepare_cached(dimension.select_sql())?
        .query_row([name], |row| row.get(0))?;
    Ok(Some(id))
}

fn insert_article(
    connection: &Connection,
    source: &str,
    record: &NormalizedRecord,
) -> Result<RecordId, StoreError> {
    let title = record
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or(StoreError::MissingTitle)?;
    let abstract_text = record
        .abstract_text
        .as_deref()
        .filter(|text| !text.trim().is_empty());

    let source_id = get_or_create(connection, Dimension::Source, source)?;
    let journal_id = match record.journal.as_deref() {
        Some(journal) => get_or_create(connection, Dimension::Journal, journal)?,
        None => None,
    };

    connection
        .prepare_cached(
            "INSERT INTO articles (title, journal_id, source_id, year, abstract, title_key, abstract_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?
        .execute(params![
            title,
            journal_id,
            source_id,
            record.year,
            abstract_text,
            normalize_key(title),
            abstract_text.map(normalize_key),
        ])?;
    let article_id = connection.last_insert_rowid();

    for author in &record.authors {
        if let Some(author_id) = get_or_create(connection, Dimension::Author, author)? {
            connection
                .prepare_cached(
                    "INSERT OR IGNORE INTO article_author (article_id, author_id) VALUES (?1, ?2)",
                )?
                .execute(params![article_id, author_id])?;
        }
    }

    for keyword in &record.keywords {
        if let Some(keyword_id) = get_or_create(connection, Dimension::Keyword, keyword)? {
            connection
                .prepare_cached(
                    "INSERT OR IGNORE INTO article_keyword (article_id, keyword_id) VALUES (?1, ?2)",
                )?
                .execute(params![article_id, keyword_id])?;
        }
    }

    Ok(article_id)
}
