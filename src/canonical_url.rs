// MIT License
// Copyright (c) 2024 Graham King

//! Reduce a URL to a string that is byte-identical for every spelling of the same page.
//!
//! Scheme is dropped (http and https address the same article), host is lower-cased
//! with a leading `www.` removed, default ports go away, as do the fragment and a single
//! trailing slash. The path and query string are kept exactly as written.

/// Canonical form of a missing or empty URL. Never equal to a real canonical URL,
/// which always contains a host.
pub const EMPTY: &str = "";

pub fn canonicalize(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return EMPTY.to_string();
    };

    // Bare "example.com/x" from feeds that drop the scheme
    let with_scheme = if has_web_scheme(raw) {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let Ok(parsed) = url::Url::parse(&with_scheme) else {
        // Still deterministic, only matches an identical spelling
        return raw.to_string();
    };
    let Some(host) = parsed.host_str() else {
        return raw.to_string();
    };

    // url lower-cases scheme and host, and port() is None for the scheme's default
    let host = host.strip_prefix("www.").unwrap_or(host);
    let mut out = String::with_capacity(with_scheme.len());
    out.push_str(host);
    if let Some(port) = parsed.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }

    // url would resolve dot segments and percent-encode the path, so take it raw
    let (path, query) = raw_path_and_query(&with_scheme);
    let path = path.strip_suffix('/').unwrap_or(path);
    out.push_str(path);

    if let Some(query) = query {
        out.push('?');
        out.push_str(query);
    }
    out
}

fn has_web_scheme(raw: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        raw.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Path and query of `url` as written, fragment removed.
fn raw_path_and_query(url: &str) -> (&str, Option<&str>) {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let rest = match after_scheme.find(|c: char| matches!(c, '/' | '?' | '#')) {
        Some(start) => &after_scheme[start..],
        None => "",
    };
    let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
    match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    }
}

/// True if both URLs are present and point at the same page.
pub fn urls_match(a: Option<&str>, b: Option<&str>) -> bool {
    let ca = canonicalize(a);
    !ca.is_empty() && ca == canonicalize(b)
}
