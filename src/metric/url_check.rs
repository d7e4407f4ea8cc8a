// MIT License
// Copyright (c) 2024 Graham King

use crate::article::Article;
use crate::canonical_url;
use crate::error::MetricError;

use super::Comparator;

/// 1.0 when both canonical URLs are present and identical, 0.0 otherwise.
/// A missing URL is a non-match so the column is always filled.
pub struct UrlCheck;

impl Comparator for UrlCheck {
    fn score(&mut self, new: &Article, approved: &Article) -> Result<f64, MetricError> {
        let same = canonical_url::urls_match(new.url.as_deref(), approved.url.as_deref());
        Ok(if same { 1.0 } else { 0.0 })
    }
}
