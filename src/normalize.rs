// MIT License
// Copyright (c) 2024 Graham King

/// Canonical text of an article for exact-content comparison.
///
/// Lower-cases, removes punctuation and symbols, collapses whitespace runs to a single
/// space and joins as `headline + " " + body`, trimmed. A missing part is empty.
pub fn normalize(headline: Option<&str>, body: Option<&str>) -> String {
    let headline = headline.unwrap_or_default();
    let body = body.unwrap_or_default();
    let mut out = String::with_capacity(headline.len() + body.len() + 1);

    // Start as if after a space so leading whitespace is dropped
    let mut pending_space = false;
    for c in headline.chars().chain(std::iter::once(' ')).chain(body.chars()) {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if !c.is_alphanumeric() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(c.to_lowercase());
    }
    out
}
