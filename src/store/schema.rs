use rusqlite::Connection;

/// Connection settings applied to every store; WAL only makes sense for
/// file databases.
pub(super) fn apply_pragmas(connection: &Connection, file_backed: bool) -> rusqlite::Result<()> {
    connection.pragma_update(None, "foreign_keys", "ON")?;
    if file_backed {
        connection.pragma_update(None, "journal_mode", "WAL")?;
        connection.pragma_update(None, "synchronous", "NORMAL")?;
    }
    Ok(())
}

pub(super) fn ensure_schema(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS journals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS authors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS keywords (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            term TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            journal_id INTEGER REFERENCES journals(id),
            source_id INTEGER REFERENCES sources(id),
            year INTEGER,
            abstract TEXT,
            title_key TEXT NOT NULL,
            abstract_key TEXT
        );

        CREATE TABLE IF NOT EXISTS article_author (
            article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
            author_id INTEGER NOT NULL REFERENCES authors(id),
            PRIMARY KEY (article_id, author_id)
        );

        CREATE TABLE IF NOT EXISTS article_keyword (
            article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
            keyword_id INTEGER NOT NULL REFERENCES keywords(id),
            PRIMARY KEY (article_id, keyword_id)
        );

        CREATE INDEX IF NOT EXISTS idx_articles_title_key ON articles(title_key);
        CREATE INDEX IF NOT EXISTS idx_articles_abstract_key ON articles(abstract_key);
        CREATE INDEX IF NOT EXISTS idx_articles_source_id ON articles(source_id);
        CREATE INDEX IF NOT EXISTS idx_articles_journal_id ON articles(journal_id);
        ",
    )
}
