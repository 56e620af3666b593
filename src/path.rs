//! Registration path parsing.
//!
//! A registration path is split on `/` into segments, each classified as one
//! of four kinds:
//!
//! | Token | Segment |
//! |---|---|
//! | `users` | [`Segment::Static`] |
//! | `*` | [`Segment::Wildcard`]: rest of the path, last segment only |
//! | `:id` | [`Segment::Param`] |
//! | `:id(\d+)` | [`Segment::Regex`]: pattern must match the whole segment |
//!
//! Everything wrong with a path is reported here, at registration time.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::error::{RouteError, RouteErrorKind};

#[derive(Debug)]
pub(crate) enum Segment<'p> {
    Static(&'p str),
    Wildcard,
    Param(&'p str),
    Regex { name: &'p str, source: &'p str, pattern: Regex },
}

/// Parses a registration path. `/` parses to no segments at all.
pub(crate) fn parse(path: &str) -> Result<Vec<Segment<'_>>, RouteError> {
    if path.is_empty() {
        return Err(RouteError::syntax(path, "path must not be empty"));
    }
    if !path.starts_with('/') {
        return Err(RouteError::syntax(path, "path must begin with `/`"));
    }
    if path == "/" {
        return Ok(Vec::new());
    }
    if path.ends_with('/') {
        return Err(RouteError::syntax(path, "path must not end with `/`"));
    }
    if path.contains("//") {
        return Err(RouteError::syntax(path, "path must not contain `//`"));
    }

    let tokens: Vec<&str> = path[1..].split('/').collect();
    let last = tokens.len() - 1;

    tokens
        .into_iter()
        .enumerate()
        .map(|(i, token)| {
            let segment = classify(path, token)?;
            if matches!(segment, Segment::Wildcard) && i != last {
                return Err(RouteError::syntax(path, "`*` must be the last segment"));
            }
            Ok(segment)
        })
        .collect()
}

fn classify<'p>(path: &str, token: &'p str) -> Result<Segment<'p>, RouteError> {
    if token == "*" {
        return Ok(Segment::Wildcard);
    }
    let Some(rest) = token.strip_prefix(':') else {
        return Ok(Segment::Static(token));
    };

    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let (name, tail) = rest.split_at(name_len);

    if !is_identifier(name) {
        return Err(RouteError::syntax(path, format!("bad parameter name in `{token}`")));
    }
    if tail.is_empty() {
        return Ok(Segment::Param(name));
    }

    let source = tail
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .filter(|p| !p.is_empty() && !p.contains(['(', ')']))
        .ok_or_else(|| {
            RouteError::syntax(path, format!("expected `:name` or `:name(pattern)`, got `{token}`"))
        })?;

    // Anchored: the pattern has to match the whole segment, not a substring.
    let pattern = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
        RouteError::new(RouteErrorKind::InvalidPattern, path, format!("`{source}`: {e}"))
    })?;

    Ok(Segment::Regex { name, source, pattern })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits a request path into segments the way registration paths are split,
/// percent-decoding each one.
///
/// Leading and trailing slashes are ignored, so `/users/1/` walks like
/// `/users/1`. An empty result addresses the root. Splitting happens before
/// decoding, so an encoded `%2F` stays inside its segment. Invalid escapes
/// are left as they are and invalid UTF-8 is replaced.
pub(crate) fn request_segments(path: &str) -> impl Iterator<Item = Cow<'_, str>> {
    let trimmed = path.trim_matches('/');
    trimmed
        .split('/')
        .filter(move |_| !trimmed.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy())
}
