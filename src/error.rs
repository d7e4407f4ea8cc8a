// MIT License
// Copyright (c) 2024 Graham King

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DedupError>;

#[derive(Error, Debug)]
pub enum DedupError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("malformed id file {path}: {reason}")]
    MalformedIdFile { path: PathBuf, reason: String },

    #[error("missing required table '{0}', is this the right database?")]
    MissingTable(&'static str),

    #[error("refusing to delete every pair without confirmation, pass --confirm")]
    ResetNotConfirmed,

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}

/// A single pair could not be scored. Recorded in the run summary, never fatal.
#[derive(Error, Debug)]
pub enum MetricError {
    #[error("article {0} not found")]
    MissingArticle(i64),

    #[error("article {0} has no text to compare")]
    NoText(i64),

    #[error("score {0} outside [0, 1]")]
    OutOfRange(f64),

    #[error("embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),
}
