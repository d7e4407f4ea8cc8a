// MIT License
// Copyright (c) 2024 Graham King

use std::collections::HashMap;

use crate::article::Article;
use crate::error::MetricError;

use super::Comparator;

/// Text to vector. The model is opaque to the metric.
pub trait Embed {
    fn embed(&mut self, text: &str) -> anyhow::Result<Vec<f64>>;
}

/// Cosine similarity of the two articles' embeddings, clamped to [0, 1].
pub struct EmbeddingSearch<E> {
    embedder: E,
    // Embeddings cost money, one call per article per run
    vectors: HashMap<i64, Vec<f64>>,
}

impl<E: Embed> EmbeddingSearch<E> {
    pub fn new(embedder: E) -> Self {
        EmbeddingSearch {
            embedder,
            vectors: HashMap::new(),
        }
    }

    fn ensure_vector(&mut self, article: &Article) -> Result<(), MetricError> {
        if self.vectors.contains_key(&article.id) {
            return Ok(());
        }
        let text = embed_text(article);
        if text.is_empty() {
            return Err(MetricError::NoText(article.id));
        }
        let v = self.embedder.embed(&text).map_err(MetricError::Embedding)?;
        self.vectors.insert(article.id, v);
        Ok(())
    }
}

impl<E: Embed> Comparator for EmbeddingSearch<E> {
    fn score(&mut self, new: &Article, approved: &Article) -> Result<f64, MetricError> {
        self.ensure_vector(new)?;
        self.ensure_vector(approved)?;
        let a = &self.vectors[&new.id];
        let b = &self.vectors[&approved.id];
        if a.len() != b.len() {
            return Err(MetricError::Embedding(anyhow::anyhow!(
                "vector lengths differ: {} and {}",
                a.len(),
                b.len()
            )));
        }
        Ok(cosine_similarity(a, b).max(0.0))
    }
}

/// "headline. body", or whichever of the two is present
pub fn embed_text(article: &Article) -> String {
    let headline = article.headline.as_deref().unwrap_or_default().trim();
    let body = article.body.as_deref().unwrap_or_default().trim();
    match (headline.is_empty(), body.is_empty()) {
        (false, false) => format!("{headline}. {body}"),
        (false, true) => headline.to_string(),
        (true, false) => body.to_string(),
        (true, true) => String::new(),
    }
}

/// 0.0 if either vector is all zeros. Slices must be the same length.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();

    let magnitude_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let magnitude_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    // Rounding can push identical vectors a hair over 1
    (dot_product / (magnitude_a * magnitude_b)).min(1.0)
}
