// MIT License
// Copyright (c) 2024 Graham King

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::article::Article;
use crate::error::MetricError;
use crate::normalize;

use super::Comparator;

pub type ContentDigest = [u8; 32];

/// SHA-256 of the article's normalized headline and body. Missing parts hash as
/// empty text, so two articles with no text at all match.
pub fn digest(article: &Article) -> ContentDigest {
    let text = normalize::normalize(article.headline.as_deref(), article.body.as_deref());
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(text.as_bytes()));
    out
}

/// 1.0 when the content digests are equal, 0.0 otherwise.
#[derive(Default)]
pub struct ContentHash {
    // Approved articles appear in every page, hash each once per run
    digests: HashMap<i64, ContentDigest>,
}

impl ContentHash {
    fn digest_of(&mut self, article: &Article) -> ContentDigest {
        *self
            .digests
            .entry(article.id)
            .or_insert_with(|| digest(article))
    }
}

impl Comparator for ContentHash {
    fn score(&mut self, new: &Article, approved: &Article) -> Result<f64, MetricError> {
        let a = self.digest_of(new);
        let b = self.digest_of(approved);
        Ok(if a == b { 1.0 } else { 0.0 })
    }
}
