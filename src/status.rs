// MIT License
// Copyright (c) 2024 Graham King

//! Read-only progress counts over the pair table.

use crate::error::Result;
use crate::metric::{MetricSpec, REGISTRY};
use crate::ratings::{self, TABLE};

#[derive(Debug, PartialEq, serde::Serialize)]
pub struct MetricStatus {
    pub name: &'static str,
    pub column: &'static str,
    pub computed: u64,
    pub pending: u64,
    pub matches: u64,
    pub mean: Option<f64>,
}

impl MetricStatus {
    pub fn completion_pct(&self) -> f64 {
        pct(self.computed, self.computed + self.pending)
    }

    pub fn match_pct(&self) -> f64 {
        pct(self.matches, self.computed)
    }
}

fn pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}

#[derive(Debug, PartialEq, serde::Serialize)]
pub struct StatusReport {
    pub total_pairs: u64,
    pub unique_new: u64,
    pub unique_approved: u64,
    pub approved_pool: u64,
    /// Approved articles not in any pair yet
    pub approved_unpaired: u64,
    /// Ids from the id file with no pairs yet, when one was given
    pub ids_unpaired: Option<u64>,
    pub metrics: Vec<MetricStatus>,
}

/// Counts are read in one transaction so they agree with each other even while a
/// metric job is writing. Never writes; a pair table or score column that does not
/// exist yet counts as empty.
pub fn report(
    db_conn: &mut rusqlite::Connection,
    new_ids: Option<&[i64]>,
) -> Result<StatusReport> {
    let tx = db_conn.transaction()?;
    let has_pairs = ratings::table_exists(&tx, TABLE)?;

    let (total_pairs, unique_new, unique_approved) = if has_pairs {
        tx.query_row(
            &format!(
                "SELECT COUNT(*), COUNT(DISTINCT articleIdNew), COUNT(DISTINCT articleIdApproved)
                 FROM {TABLE}"
            ),
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?)),
        )?
    } else {
        (0, 0, 0)
    };

    let approved_pool: i64 = tx.query_row(
        "SELECT COUNT(DISTINCT articleId) FROM ArticleApproveds",
        [],
        |row| row.get(0),
    )?;
    let approved_unpaired: i64 = if has_pairs {
        tx.query_row(
            &format!(
                "SELECT COUNT(DISTINCT articleId) FROM ArticleApproveds
                 WHERE articleId NOT IN (SELECT articleIdApproved FROM {TABLE})"
            ),
            [],
            |row| row.get(0),
        )?
    } else {
        approved_pool
    };

    let ids_unpaired = match new_ids {
        Some(ids) if has_pairs => {
            let mut stmt = tx.prepare(&format!(
                "SELECT 1 FROM {TABLE} WHERE articleIdNew = ?1 LIMIT 1"
            ))?;
            let mut n = 0;
            for &id in ids {
                if !stmt.exists([id])? {
                    n += 1;
                }
            }
            Some(n)
        }
        Some(ids) => Some(ids.len() as u64),
        None => None,
    };

    let mut metrics = Vec::with_capacity(REGISTRY.len());
    for m in REGISTRY {
        let status = if has_pairs && ratings::column_exists(&tx, m.column)? {
            metric_status(&tx, m)?
        } else {
            MetricStatus {
                name: m.name,
                column: m.column,
                computed: 0,
                pending: total_pairs as u64,
                matches: 0,
                mean: None,
            }
        };
        metrics.push(status);
    }

    tx.commit()?;
    Ok(StatusReport {
        total_pairs: total_pairs as u64,
        unique_new: unique_new as u64,
        unique_approved: unique_approved as u64,
        approved_pool: approved_pool as u64,
        approved_unpaired: approved_unpaired as u64,
        ids_unpaired,
        metrics,
    })
}

fn metric_status(db_conn: &rusqlite::Connection, m: &MetricSpec) -> Result<MetricStatus> {
    let col = m.column;
    let status = db_conn.query_row(
        &format!(
            "SELECT COUNT({col}), COUNT(*) - COUNT({col}),
                    COALESCE(SUM({col} >= ?1), 0), AVG({col})
             FROM {TABLE}"
        ),
        [m.match_threshold],
        |row| {
            Ok(MetricStatus {
                name: m.name,
                column: col,
                computed: row.get::<_, i64>(0)? as u64,
                pending: row.get::<_, i64>(1)? as u64,
                matches: row.get::<_, i64>(2)? as u64,
                mean: row.get(3)?,
            })
        },
    )?;
    Ok(status)
}
