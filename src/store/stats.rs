use rusqlite::{Connection, Row};
use serde::Serialize;

/// A name with the number of articles attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Overview of a store's content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_articles: usize,
    pub total_authors: usize,
    pub total_journals: usize,
    pub total_keywords: usize,
    pub total_sources: usize,
    /// Every source, most articles first.
    pub articles_by_source: Vec<NameCount>,
    /// The ten most recent publication years, newest first.
    pub articles_by_year: Vec<YearCount>,
    pub top_journals: Vec<NameCount>,
    pub top_keywords: Vec<NameCount>,
    pub top_authors: Vec<NameCount>,
}

pub(super) fn collect_statistics(connection: &Connection) -> rusqlite::Result<Statistics> {
    Ok(Statistics {
        total_articles: count(connection, "SELECT COUNT(*) FROM articles")?,
        total_authors: count(connection, "SELECT COUNT(*) FROM authors")?,
        total_journals: count(connection, "SELECT COUNT(*) FROM journals")?,
        total_keywords: count(connection, "SELECT COUNT(*) FROM keywords")?,
        total_sources: count(connection, "SELECT COUNT(*) FROM sources")?,
        articles_by_source: name_counts(
            connection,
            "SELECT s.name, COUNT(a.id) AS count
             FROM sources s
             LEFT JOIN articles a ON s.id = a.source_id
             GROUP BY s.id
             ORDER BY count DESC, s.name",
        )?,
        articles_by_year: year_counts(connection)?,
        top_journals: name_counts(
            connection,
            "SELECT j.name, COUNT(a.id) AS count
             FROM journals j
             LEFT JOIN articles a ON j.id = a.journal_id
             GROUP BY j.id
             ORDER BY count DESC, j.name
             LIMIT 10",
        )?,
        top_keywords: name_counts(
            connection,
            "SELECT k.term, COUNT(ak.article_id) AS count
             FROM keywords k
             LEFT JOIN article_keyword ak ON k.id = ak.keyword_id
             GROUP BY k.id
             ORDER BY count DESC, k.term
             LIMIT 15",
        )?,
        top_authors: name_counts(
            connection,
            "SELECT au.name, COUNT(aa.article_id) AS count
             FROM authors au
             LEFT JOIN article_author aa ON au.id = aa.author_id
             GROUP BY au.id
             ORDER BY count DESC, au.name
             LIMIT 10",
        )?,
    })
}

fn count(connection: &Connection, sql: &str) -> rusqlite::Result<usize> {
    connection.query_row(sql, [], |row| row.get::<_, i64>(0).map(|n| n as usize))
}

fn name_counts(connection: &Connection, sql: &str) -> rusqlite::Result<Vec<NameCount>> {
    let mut statement = connection.prepare(sql)?;
    let rows = statement.query_map([], |row: &Row<'_>| {
        Ok(NameCount {
            name: row.get(0)?,
            count: row.get::<_, i64>(1)? as usize,
        })
    })?;
    rows.collect()
}

fn year_counts(connection: &Connection) -> rusqlite::Result<Vec<YearCount>> {
    let mut statement = connection.prepare(
        "SELECT year, COUNT(*) AS count
         FROM articles
         WHERE year IS NOT NULL
         GROUP BY year
         ORDER BY year DESC
         LIMIT 10",
    )?;
    let rows = statement.query_map([], |row| {
        Ok(YearCount {
            year: row.get(0)?,
            count: row.get::<_, i64>(1)? as usize,
        })
    })?;
    rows.collect()
}
