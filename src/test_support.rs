// MIT License
// Copyright (c) 2024 Graham King

//! Fixture database with the ingestion system's article tables.

use tempfile::TempDir;

pub fn create_article_tables(db_conn: &rusqlite::Connection) {
    db_conn
        .execute_batch(
            r#"
            CREATE TABLE Articles (
                id INTEGER PRIMARY KEY,
                url TEXT NULL,
                title TEXT NULL,
                description TEXT NULL
            );
            CREATE TABLE ArticleApproveds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                articleId INTEGER NOT NULL,
                headlineForPdfReport TEXT NULL,
                textForPdfReport TEXT NULL
            );
            "#,
        )
        .unwrap();
}

/// Fresh database, opened through the normal path. Keep the TempDir alive.
pub fn open() -> (rusqlite::Connection, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dedup.db");
    {
        let c = rusqlite::Connection::open(&path).unwrap();
        create_article_tables(&c);
    }
    (crate::ratings::open(&path).unwrap(), dir)
}

pub fn article(
    db_conn: &rusqlite::Connection,
    id: i64,
    url: Option<&str>,
    title: Option<&str>,
    description: Option<&str>,
) {
    db_conn
        .execute(
            "INSERT INTO Articles (id, url, title, description) VALUES (?1, ?2, ?3, ?4)",
            (id, url, title, description),
        )
        .unwrap();
}

pub fn approve(
    db_conn: &rusqlite::Connection,
    id: i64,
    headline: Option<&str>,
    text: Option<&str>,
) {
    db_conn
        .execute(
            "INSERT INTO ArticleApproveds (articleId, headlineForPdfReport, textForPdfReport)
             VALUES (?1, ?2, ?3)",
            (id, headline, text),
        )
        .unwrap();
}

/// Every pair row with its scores, in id order.
pub fn dump(db_conn: &rusqlite::Connection) -> Vec<String> {
    let mut stmt = db_conn
        .prepare(
            "SELECT id, articleIdNew, articleIdApproved, urlCheck, contentHash,
                    embeddingSearch, createdAt, updatedAt
             FROM ArticleDuplicateRatings ORDER BY id",
        )
        .unwrap();
    stmt.query_map([], |row| {
        Ok(format!(
            "{}:{}:{}:{:?}:{:?}:{:?}:{}:{}",
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, Option<f64>>(3)?,
            row.get::<_, Option<f64>>(4)?,
            row.get::<_, Option<f64>>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
        ))
    })
    .unwrap()
    .collect::<rusqlite::Result<Vec<_>>>()
    .unwrap()
}

/// Score column of one pair.
pub fn score(
    db_conn: &rusqlite::Connection,
    column: &str,
    new_id: i64,
    approved_id: i64,
) -> Option<f64> {
    db_conn
        .query_row(
            &format!(
                "SELECT {column} FROM ArticleDuplicateRatings
                 WHERE articleIdNew = ?1 AND articleIdApproved = ?2"
            ),
            (new_id, approved_id),
            |row| row.get(0),
        )
        .unwrap()
}
