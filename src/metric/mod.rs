// MIT License
// Copyright (c) 2024 Graham King

//! Similarity metrics. Each one owns a single score column of the pair table and is
//! driven by the same batch engine; adding a metric means adding a registry entry,
//! a column and a `Comparator`.

use crate::article::Article;
use crate::config::Config;
use crate::error::{DedupError, MetricError};

pub mod content_hash;
pub mod embedding;
pub mod engine;
pub mod url_check;

pub use engine::{run, RunSummary, Selection};

/// Scores one (new, approved) pair in [0, 1].
///
/// `&mut self` lets a comparator cache per-article work (digests, embeddings)
/// for the length of a run.
pub trait Comparator {
    fn score(&mut self, new: &Article, approved: &Article) -> Result<f64, MetricError>;
}

#[derive(Debug, PartialEq)]
pub struct MetricSpec {
    /// Command name
    pub name: &'static str,
    /// Score column in the pair table. Only ever a registry constant, it is
    /// interpolated into SQL.
    pub column: &'static str,
    pub about: &'static str,
    /// Scores at or above this count as a match in summaries
    pub match_threshold: f64,
    pub default_batch_size: usize,
}

pub const URL_CHECK: MetricSpec = MetricSpec {
    name: "urlcheck",
    column: "urlCheck",
    about: "Exact match of canonical URLs",
    match_threshold: 1.0,
    default_batch_size: 1000,
};

pub const CONTENT_HASH: MetricSpec = MetricSpec {
    name: "contenthash",
    column: "contentHash",
    about: "Exact match of normalized headline and body",
    match_threshold: 1.0,
    default_batch_size: 1000,
};

pub const EMBEDDING_SEARCH: MetricSpec = MetricSpec {
    name: "embeddingsearch",
    column: "embeddingSearch",
    about: "Cosine similarity of text embeddings",
    match_threshold: 0.8,
    default_batch_size: 500,
};

pub const REGISTRY: &[MetricSpec] = &[URL_CHECK, CONTENT_HASH, EMBEDDING_SEARCH];

/// The comparator that fills `spec`'s column.
pub fn comparator(spec: &MetricSpec, cfg: &Config) -> anyhow::Result<Box<dyn Comparator>> {
    match spec.name {
        "urlcheck" => Ok(Box::new(url_check::UrlCheck)),
        "contenthash" => Ok(Box::new(content_hash::ContentHash::default())),
        "embeddingsearch" => {
            let Some(api_key) = cfg.openai_api_key.clone() else {
                anyhow::bail!("Set variable OPENAI_API_KEY to your key");
            };
            let embedder = crate::openai::Embedder::new(api_key, &cfg.embedding_model);
            Ok(Box::new(embedding::EmbeddingSearch::new(embedder)))
        }
        other => Err(DedupError::UnknownMetric(other.to_string()).into()),
    }
}
