// MIT License
// Copyright (c) 2024 Graham King

//! The `ArticleDuplicateRatings` pair table.

use std::path::Path;
use std::time::Duration;

use rusqlite::OpenFlags;

use crate::error::{DedupError, Result};
use crate::metric;

mod db;

pub const TABLE: &str = "ArticleDuplicateRatings";

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Open the database, check the article tables are there and bring the pair table
/// up to date with the metric registry.
pub fn open(db_path: &Path) -> Result<rusqlite::Connection> {
    let db_conn = rusqlite::Connection::open(db_path)?;
    // Before anything that takes a lock, so we wait out a running writer
    db_conn.busy_timeout(BUSY_TIMEOUT)?;
    // A status reader can run beside a metric job
    let _mode: String =
        db_conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    db_conn.pragma_update(None, "foreign_keys", "ON")?;

    check_required_tables(&db_conn)?;
    db_conn.execute(db::CREATE_RATINGS_TABLE, ())?;
    db_conn.execute(db::CREATE_APPROVED_INDEX, ())?;
    ensure_columns(&db_conn)?;
    Ok(db_conn)
}

/// Open for reading only. Nothing in the file changes, not even the journal mode,
/// and a missing pair table is left missing.
pub fn open_read_only(db_path: &Path) -> Result<rusqlite::Connection> {
    let db_conn = rusqlite::Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    db_conn.busy_timeout(BUSY_TIMEOUT)?;
    check_required_tables(&db_conn)?;
    Ok(db_conn)
}

fn check_required_tables(db_conn: &rusqlite::Connection) -> Result<()> {
    for table in db::REQUIRED_TABLES {
        if !table_exists(db_conn, table)? {
            return Err(DedupError::MissingTable(table));
        }
    }
    Ok(())
}

pub fn table_exists(db_conn: &rusqlite::Connection, name: &str) -> Result<bool> {
    let mut stmt =
        db_conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    Ok(stmt.exists([name])?)
}

pub fn column_exists(db_conn: &rusqlite::Connection, column: &str) -> Result<bool> {
    let mut stmt = db_conn.prepare(&format!("PRAGMA table_info({TABLE})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

// A table created before a metric existed gets its column on first open
fn ensure_columns(db_conn: &rusqlite::Connection) -> Result<()> {
    for m in metric::REGISTRY {
        if !column_exists(db_conn, m.column)? {
            tracing::info!(column = m.column, "adding score column");
            db_conn.execute(
                &format!("ALTER TABLE {TABLE} ADD COLUMN {} REAL NULL", m.column),
                (),
            )?;
        }
    }
    Ok(())
}

/// Insert pairs in one transaction, skipping any that already exist.
/// Returns how many rows were actually created.
pub fn insert_pairs(db_conn: &mut rusqlite::Connection, pairs: &[(i64, i64)]) -> Result<usize> {
    let now = chrono::Utc::now();
    let tx = db_conn.transaction()?;
    let mut inserted = 0;
    {
        let mut stmt = tx.prepare(db::INSERT_PAIR)?;
        for &(new_id, approved_id) in pairs {
            inserted += stmt.execute((new_id, approved_id, now))?;
        }
    }
    tx.commit()?;
    Ok(inserted)
}

pub fn count(db_conn: &rusqlite::Connection) -> Result<u64> {
    let n: i64 = db_conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| {
        row.get(0)
    })?;
    Ok(n as u64)
}

/// How many of the current approved pool `new_id` is already paired with.
pub fn paired_with_pool(db_conn: &rusqlite::Connection, new_id: i64) -> Result<u64> {
    let mut stmt = db_conn.prepare_cached(db::COUNT_PAIRED_WITH_POOL)?;
    let n: i64 = stmt.query_row([new_id], |row| row.get(0))?;
    Ok(n as u64)
}

/// Delete every pair. Nothing is touched unless `confirm` is set.
pub fn reset(db_conn: &rusqlite::Connection, confirm: bool) -> Result<usize> {
    if !confirm {
        return Err(DedupError::ResetNotConfirmed);
    }
    let deleted = db_conn.execute(&format!("DELETE FROM {TABLE}"), ())?;
    tracing::info!(deleted, "pair table cleared");
    Ok(deleted)
}
