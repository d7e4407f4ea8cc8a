// MIT License
// Copyright (c) 2024 Graham King

//! Build the candidate pair set: every new article against every approved one.
//!
//! Insertion only. Existing rows, and the scores on them, are never modified,
//! so loading the same ids again (or a superset) is always safe.

use std::path::Path;

use crate::article;
use crate::error::{DedupError, Result};
use crate::id_file;
use crate::ratings;

pub const DEFAULT_BATCH_SIZE: usize = 1000;
const PROGRESS_EVERY: usize = 10;

#[derive(Debug, Default, PartialEq)]
pub struct LoadReport {
    /// Distinct ids asked for
    pub requested: usize,
    /// Ids with no row in Articles, not paired
    pub unresolved: Vec<i64>,
    /// Cells in the id file that were not an id
    pub rejected: Vec<id_file::Rejected>,
    pub approved: usize,
    /// Ids already paired with the whole approved pool, not re-derived
    pub already_complete: usize,
    pub inserted: u64,
    pub already_present: u64,
    pub total_pairs: u64,
}

/// Pair the ids from a CSV id file.
pub fn load_file(
    db_conn: &mut rusqlite::Connection,
    path: &Path,
    force: bool,
    batch_size: usize,
) -> Result<LoadReport> {
    let ids = id_file::read(path)?;
    tracing::info!(
        ids = ids.ids.len(),
        rejected = ids.rejected.len(),
        path = %path.display(),
        "read id file"
    );
    let mut report = index(db_conn, &ids.ids, force, batch_size)?;
    report.rejected = ids.rejected;
    Ok(report)
}

/// Pair each new id with the whole approved pool.
///
/// Ids that do not resolve to an article are reported and skipped, the rest still
/// go in. Without `force` an id already paired with the entire pool is not
/// re-derived. With it the full product is regenerated; either way only missing
/// pairs are inserted.
pub fn index(
    db_conn: &mut rusqlite::Connection,
    new_ids: &[i64],
    force: bool,
    batch_size: usize,
) -> Result<LoadReport> {
    if batch_size == 0 {
        return Err(DedupError::ZeroBatchSize);
    }
    let mut report = LoadReport {
        requested: new_ids.len(),
        ..Default::default()
    };

    let mut resolved = Vec::with_capacity(new_ids.len());
    for &id in new_ids {
        if article::exists(db_conn, id)? {
            resolved.push(id);
        } else {
            tracing::warn!(id, "article not found, not pairing it");
            report.unresolved.push(id);
        }
    }

    let approved = article::approved_ids(db_conn)?;
    report.approved = approved.len();
    if approved.is_empty() {
        tracing::warn!("approved pool is empty, nothing to pair against");
    }

    let mut to_pair = Vec::with_capacity(resolved.len());
    for id in resolved {
        if !force && !approved.is_empty() {
            let have = ratings::paired_with_pool(db_conn, id)?;
            if have == approved.len() as u64 {
                report.already_complete += 1;
                report.already_present += have;
                continue;
            }
        }
        to_pair.push(id);
    }

    let total = to_pair.len() * approved.len();
    let num_batches = total.div_ceil(batch_size);
    tracing::info!(
        candidates = total,
        batches = num_batches,
        batch_size,
        "inserting pairs"
    );

    let mut batch = Vec::with_capacity(batch_size.min(total));
    let mut batch_num = 0;
    let mut flush = |db_conn: &mut rusqlite::Connection,
                     batch: &mut Vec<(i64, i64)>,
                     report: &mut LoadReport|
     -> Result<()> {
        let inserted = ratings::insert_pairs(db_conn, batch)? as u64;
        report.inserted += inserted;
        report.already_present += batch.len() as u64 - inserted;
        batch.clear();
        batch_num += 1;
        if batch_num % PROGRESS_EVERY == 0 || batch_num == num_batches {
            tracing::info!(
                "batch {batch_num}/{num_batches}, {} new pairs so far",
                report.inserted
            );
        }
        Ok(())
    };
    for &new_id in &to_pair {
        for &approved_id in &approved {
            batch.push((new_id, approved_id));
            if batch.len() == batch_size {
                flush(db_conn, &mut batch, &mut report)?;
            }
        }
    }
    if !batch.is_empty() {
        flush(db_conn, &mut batch, &mut report)?;
    }

    report.total_pairs = ratings::count(db_conn)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    /// Articles 1..=n_new, approved 100..100+n_approved
    fn seed(n_new: i64, n_approved: i64) -> (rusqlite::Connection, tempfile::TempDir) {
        let (db, dir) = test_support::open();
        for id in 1..=n_new {
            test_support::article(&db, id, None, None, None);
        }
        for id in 100..100 + n_approved {
            test_support::article(&db, id, None, None, None);
            test_support::approve(&db, id, None, None);
        }
        (db, dir)
    }

    #[test]
    fn cartesian_product() {
        let (mut db, _dir) = seed(3, 4);
        let r = index(&mut db, &[1, 2, 3], false, 5).unwrap();
        assert_eq!(r.inserted, 12);
        assert_eq!(r.already_present, 0);
        assert_eq!(r.total_pairs, 12);
        assert_eq!(r.approved, 4);
    }

    #[test]
    fn loading_twice_is_idempotent() {
        let (mut db, _dir) = seed(3, 4);
        index(&mut db, &[1, 2, 3], false, 1000).unwrap();
        let before = test_support::dump(&db);

        let again = index(&mut db, &[1, 2, 3], false, 1000).unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(again.already_complete, 3);
        assert_eq!(again.already_present, 12);
        assert_eq!(test_support::dump(&db), before);

        let forced = index(&mut db, &[1, 2, 3], true, 7).unwrap();
        assert_eq!(forced.inserted, 0);
        assert_eq!(forced.already_complete, 0);
        assert_eq!(forced.already_present, 12);
        assert_eq!(test_support::dump(&db), before);
    }

    #[test]
    fn superset_adds_only_new_pairs_and_keeps_scores() {
        let (mut db, _dir) = seed(3, 2);
        index(&mut db, &[1], false, 1000).unwrap();
        db.execute("UPDATE ArticleDuplicateRatings SET urlCheck = 1.0", ())
            .unwrap();

        let r = index(&mut db, &[1, 2, 3], true, 1000).unwrap();
        assert_eq!(r.inserted, 4);
        assert_eq!(r.already_present, 2);
        assert_eq!(r.total_pairs, 6);
        assert_eq!(test_support::score(&db, "urlCheck", 1, 100), Some(1.0));
        assert_eq!(test_support::score(&db, "urlCheck", 2, 100), None);
    }

    #[test]
    fn grown_pool_fills_gaps() {
        let (mut db, _dir) = seed(1, 2);
        index(&mut db, &[1], false, 1000).unwrap();
        test_support::article(&db, 500, None, None, None);
        test_support::approve(&db, 500, None, None);

        let r = index(&mut db, &[1], false, 1000).unwrap();
        assert_eq!(r.already_complete, 0);
        assert_eq!(r.inserted, 1);
        assert_eq!(r.total_pairs, 3);
    }

    #[test]
    fn unresolved_ids_are_reported_not_paired() {
        let (mut db, _dir) = seed(2, 3);
        let r = index(&mut db, &[1, 77, 2], false, 2).unwrap();
        assert_eq!(r.requested, 3);
        assert_eq!(r.unresolved, vec![77]);
        assert_eq!(r.inserted, 6);
        let n: i64 = db
            .query_row(
                "SELECT COUNT(*) FROM ArticleDuplicateRatings WHERE articleIdNew = 77",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn empty_pool_or_ids() {
        let (mut db, _dir) = seed(2, 0);
        let r = index(&mut db, &[1, 2], false, 10).unwrap();
        assert_eq!(r.inserted, 0);
        assert_eq!(r.total_pairs, 0);

        let r = index(&mut db, &[], false, 10).unwrap();
        assert_eq!(r, LoadReport::default());
    }

    #[test]
    fn zero_batch_size() {
        let (mut db, _dir) = seed(1, 1);
        assert!(matches!(
            index(&mut db, &[1], false, 0),
            Err(DedupError::ZeroBatchSize)
        ));
    }

    #[test]
    fn from_file() {
        let (mut db, dir) = seed(2, 2);
        let path = dir.path().join("new.csv");
        std::fs::write(&path, "articleId\n1\n2\nx\n1\n").unwrap();
        let r = load_file(&mut db, &path, false, 1000).unwrap();
        assert_eq!(r.requested, 2);
        assert_eq!(r.rejected.len(), 1);
        assert_eq!(r.rejected[0].value, "x");
        assert_eq!(r.inserted, 4);
    }
}
