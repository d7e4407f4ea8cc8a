// MIT License
// Copyright (c) 2024 Graham King

//! Read-only access to the article tables, which are owned by the ingestion system.
//!
//! `Articles` holds every ingested article. `ArticleApproveds` lists the approved pool
//! and carries the report headline and text, which are preferred over the raw
//! title and description when present.

use std::collections::HashMap;

use rusqlite::OptionalExtension;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: i64,
    pub url: Option<String>,
    pub headline: Option<String>,
    pub body: Option<String>,
}

const SELECT_ARTICLE: &str = r#"
SELECT a.id, a.url,
    COALESCE(
        (SELECT headlineForPdfReport FROM ArticleApproveds WHERE articleId = a.id LIMIT 1),
        a.title),
    COALESCE(
        (SELECT textForPdfReport FROM ArticleApproveds WHERE articleId = a.id LIMIT 1),
        a.description)
FROM Articles a
WHERE a.id = ?1
"#;

pub fn load(db_conn: &rusqlite::Connection, id: i64) -> Result<Option<Article>> {
    let mut stmt = db_conn.prepare_cached(SELECT_ARTICLE)?;
    let article = stmt
        .query_row([id], |row| {
            Ok(Article {
                id: row.get(0)?,
                url: row.get(1)?,
                headline: row.get(2)?,
                body: row.get(3)?,
            })
        })
        .optional()?;
    Ok(article)
}

/// Load every article referenced by a page of pairs. Ids with no article row are
/// absent from the map.
pub fn load_many(
    db_conn: &rusqlite::Connection,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, Article>> {
    let mut out = HashMap::new();
    for id in ids {
        if out.contains_key(&id) {
            continue;
        }
        if let Some(article) = load(db_conn, id)? {
            out.insert(id, article);
        }
    }
    Ok(out)
}

pub fn exists(db_conn: &rusqlite::Connection, id: i64) -> Result<bool> {
    let mut stmt = db_conn.prepare_cached("SELECT 1 FROM Articles WHERE id = ?1 LIMIT 1")?;
    Ok(stmt.exists([id])?)
}

/// The whole approved pool, ascending.
pub fn approved_ids(db_conn: &rusqlite::Connection) -> Result<Vec<i64>> {
    let mut stmt =
        db_conn.prepare("SELECT DISTINCT articleId FROM ArticleApproveds ORDER BY articleId")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn report_text_preferred() {
        let (db, _dir) = test_support::open();
        test_support::article(&db, 1, Some("https://a.com/1"), Some("Raw"), Some("raw body"));
        test_support::approve(&db, 1, Some("Report"), None);

        let a = load(&db, 1).unwrap().unwrap();
        assert_eq!(a.url.as_deref(), Some("https://a.com/1"));
        assert_eq!(a.headline.as_deref(), Some("Report"));
        assert_eq!(a.body.as_deref(), Some("raw body"));
    }

    #[test]
    fn missing_article() {
        let (db, _dir) = test_support::open();
        assert_eq!(load(&db, 42).unwrap(), None);
        assert!(!exists(&db, 42).unwrap());
    }

    #[test]
    fn approved_pool_is_distinct_and_sorted() {
        let (db, _dir) = test_support::open();
        for id in [3, 1, 2] {
            test_support::article(&db, id, None, None, None);
            test_support::approve(&db, id, None, None);
        }
        test_support::approve(&db, 2, None, None);
        assert_eq!(approved_ids(&db).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn load_many_skips_unknown() {
        let (db, _dir) = test_support::open();
        test_support::article(&db, 1, None, Some("t"), None);
        let got = load_many(&db, [1, 1, 9]).unwrap();
        assert_eq!(got.len(), 1);
        assert!(got.contains_key(&1));
    }
}
