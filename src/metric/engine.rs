// MIT License
// Copyright (c) 2024 Graham King

//! Fill one score column of the pair table, a page at a time.
//!
//! Pages are read by ascending pair id (keyset, not OFFSET) so every selected row is
//! visited exactly once per run however many pages it takes. All updates for a page
//! are committed together: an interrupted run loses at most the page in flight, whose
//! rows are still NULL and get picked up by the next run.

use crate::article;
use crate::error::{DedupError, MetricError, Result};
use crate::ratings::TABLE;

use super::{Comparator, MetricSpec};

const PROGRESS_EVERY: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Rows whose column is still NULL
    PendingOnly,
    /// Every row, overwriting existing scores
    All,
}

impl Selection {
    pub fn from_force(force: bool) -> Selection {
        if force {
            Selection::All
        } else {
            Selection::PendingOnly
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub scored: u64,
    pub matches: u64,
    /// Already had a score, untouched (pending-only runs)
    pub skipped: u64,
    pub failed: u64,
    pub batches: u64,
}

struct PairRow {
    id: i64,
    new_id: i64,
    approved_id: i64,
}

pub fn run(
    db_conn: &mut rusqlite::Connection,
    metric: &MetricSpec,
    comparator: &mut dyn Comparator,
    selection: Selection,
    batch_size: usize,
) -> Result<RunSummary> {
    if batch_size == 0 {
        return Err(DedupError::ZeroBatchSize);
    }
    let column = metric.column;
    let mut summary = RunSummary::default();

    let pending_filter = match selection {
        Selection::PendingOnly => {
            summary.skipped = db_conn.query_row(
                &format!("SELECT COUNT(*) FROM {TABLE} WHERE {column} IS NOT NULL"),
                [],
                |row| row.get::<_, i64>(0),
            )? as u64;
            format!("AND {column} IS NULL")
        }
        Selection::All => String::new(),
    };
    let select_page = format!(
        "SELECT id, articleIdNew, articleIdApproved FROM {TABLE}
         WHERE id > ?1 {pending_filter}
         ORDER BY id LIMIT ?2"
    );
    let update = format!(
        "UPDATE {TABLE} SET {column} = ?1, updatedAt = ?2 WHERE id = ?3 {pending_filter}"
    );

    let mut last_id = i64::MIN;
    loop {
        let page = read_page(db_conn, &select_page, last_id, batch_size)?;
        let Some(last) = page.last() else {
            break;
        };
        last_id = last.id;

        let articles = article::load_many(
            db_conn,
            page.iter().flat_map(|p| [p.new_id, p.approved_id]),
        )?;

        let mut updates: Vec<(i64, Option<f64>)> = Vec::with_capacity(page.len());
        for pair in &page {
            let scored = match (articles.get(&pair.new_id), articles.get(&pair.approved_id)) {
                (Some(new), Some(approved)) => {
                    comparator.score(new, approved).and_then(check_range)
                }
                (None, _) => Err(MetricError::MissingArticle(pair.new_id)),
                (_, None) => Err(MetricError::MissingArticle(pair.approved_id)),
            };
            match scored {
                Ok(score) => {
                    summary.scored += 1;
                    if score >= metric.match_threshold {
                        summary.matches += 1;
                    }
                    updates.push((pair.id, Some(score)));
                }
                Err(err) => {
                    summary.failed += 1;
                    tracing::warn!(
                        metric = metric.name,
                        pair = pair.id,
                        new = pair.new_id,
                        approved = pair.approved_id,
                        "{err}"
                    );
                    // A forced run must not leave a stale score behind; NULL puts the
                    // row back in the pending set. Pending rows are NULL already.
                    if selection == Selection::All {
                        updates.push((pair.id, None));
                    }
                }
            }
        }

        write_page(db_conn, &update, &updates)?;
        summary.batches += 1;
        if summary.batches % PROGRESS_EVERY == 0 {
            tracing::info!(
                metric = metric.name,
                batches = summary.batches,
                scored = summary.scored,
                matches = summary.matches,
                failed = summary.failed,
                "progress"
            );
        }
    }
    Ok(summary)
}

fn check_range(score: f64) -> std::result::Result<f64, MetricError> {
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(MetricError::OutOfRange(score))
    }
}

fn read_page(
    db_conn: &rusqlite::Connection,
    sql: &str,
    after_id: i64,
    batch_size: usize,
) -> Result<Vec<PairRow>> {
    let mut stmt = db_conn.prepare_cached(sql)?;
    let rows = stmt
        .query_map((after_id, batch_size as i64), |row| {
            Ok(PairRow {
                id: row.get(0)?,
                new_id: row.get(1)?,
                approved_id: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

// One transaction per page
fn write_page(
    db_conn: &mut rusqlite::Connection,
    sql: &str,
    updates: &[(i64, Option<f64>)],
) -> Result<()> {
    let now = chrono::Utc::now();
    let tx = db_conn.transaction()?;
    let mut stmt = tx.prepare(sql)?;
    for &(id, score) in updates {
        stmt.execute((score, now, id))?;
    }
    stmt.finalize()?;
    tx.commit()?;
    Ok(())
}
