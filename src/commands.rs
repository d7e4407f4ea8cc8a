// MIT License
// Copyright (c) 2024 Graham King

use anyhow::Context;

use crate::config::Config;
use crate::error::DedupError;
use crate::metric::{self, MetricSpec, Selection};
use crate::pairs;
use crate::ratings;
use crate::status;
use crate::timing::timed;

pub fn do_status(cfg: &Config, as_json: bool) -> anyhow::Result<()> {
    let mut db_conn = ratings::open_read_only(&cfg.db_path)?;
    let new_ids = match &cfg.csv_path {
        // Optional extra, a bad file shouldn't stop the report
        Some(path) => match crate::id_file::read(path) {
            Ok(list) => Some(list.ids),
            Err(err) => {
                tracing::warn!("{err}");
                None
            }
        },
        None => None,
    };
    let report = status::report(&mut db_conn, new_ids.as_deref())?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("ArticleDuplicateRatings rows: {}", report.total_pairs);
    println!("Unique new articles: {}", report.unique_new);
    println!("Unique approved articles: {}", report.unique_approved);
    println!(
        "Approved pool: {} ({} not paired yet)",
        report.approved_pool, report.approved_unpaired
    );
    if let Some(n) = report.ids_unpaired {
        println!("Ids in CSV not paired yet: {n}");
    }
    for m in &report.metrics {
        println!(
            "{}: {} computed ({}%), {} pending, {} matches ({}%)",
            m.column,
            m.computed,
            m.completion_pct(),
            m.pending,
            m.matches,
            m.match_pct()
        );
        if let Some(mean) = m.mean {
            println!("    mean score {mean:.3}");
        }
    }
    Ok(())
}

pub fn do_load(cfg: &Config, force: bool) -> anyhow::Result<()> {
    let Some(csv_path) = &cfg.csv_path else {
        anyhow::bail!("No id file, pass --csv-path or set PATH_TO_CSV");
    };
    let batch_size = cfg.batch_size_or(pairs::DEFAULT_BATCH_SIZE);
    let mut db_conn = ratings::open(&cfg.db_path)?;

    let report = timed("Loading article pairs", || {
        pairs::load_file(&mut db_conn, csv_path, force, batch_size)
    })
    .with_context(|| format!("loading {}", csv_path.display()))?;

    println!("Read {} article ids", report.requested);
    for r in &report.rejected {
        println!("Rejected line {}: {:?} is not an id", r.line, r.value);
    }
    if !report.unresolved.is_empty() {
        println!(
            "Not found in Articles, not paired: {:?}",
            report.unresolved
        );
    }
    println!("Approved articles: {}", report.approved);
    println!("Created {} new pairs", report.inserted);
    println!("Skipped {} existing pairs", report.already_present);
    println!("Total pairs in database: {}", report.total_pairs);
    Ok(())
}

pub fn do_reset(cfg: &Config, confirm: bool) -> anyhow::Result<()> {
    // Refuse before even opening the database
    if !confirm {
        eprintln!("This deletes every row of {}", ratings::TABLE);
        return Err(DedupError::ResetNotConfirmed.into());
    }
    let db_conn = ratings::open(&cfg.db_path)?;
    let deleted = timed("Resetting pair table", || ratings::reset(&db_conn, confirm))?;
    println!("Deleted {deleted} rows from {}", ratings::TABLE);
    Ok(())
}

pub fn do_metric(cfg: &Config, spec: &MetricSpec, force: bool) -> anyhow::Result<()> {
    let mut comparator = metric::comparator(spec, cfg)?;
    let batch_size = cfg.batch_size_or(spec.default_batch_size);
    let mut db_conn = ratings::open(&cfg.db_path)?;
    let selection = Selection::from_force(force);

    let summary = timed(&format!("Computing {}", spec.about), || {
        metric::run(&mut db_conn, spec, comparator.as_mut(), selection, batch_size)
    })?;

    println!("Scored {} pairs in {} batches", summary.scored, summary.batches);
    println!("Found {} matches", summary.matches);
    if selection == Selection::PendingOnly {
        println!("Skipped {} pairs already scored", summary.skipped);
    }
    if summary.failed > 0 {
        println!("Failed {} pairs, left unscored", summary.failed);
    }
    Ok(())
}
