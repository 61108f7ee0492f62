use super::{AtomicItem, cannot_cast};
use crate::engine::runtime::Error;
use std::sync::LazyLock;
use url::Url;

/// Stand-in base used only to check that a relative reference is well formed.
static PROBE_BASE: LazyLock<Option<Url>> = LazyLock::new(|| Url::parse("http://probe.invalid/").ok());

fn has_illegal_chars(s: &str) -> bool {
    s.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// An absolute URI; the lexical form is kept as written.
pub(crate) fn parse_uri(s: &str) -> Result<String, Error> {
    let s = s.trim();
    if has_illegal_chars(s) {
        return Err(Error::invalid_lexical("uri", s));
    }
    match Url::parse(s) {
        Ok(_) => Ok(s.to_string()),
        Err(e) => Err(Error::invalid_lexical("uri", s).caused_by(e)),
    }
}

/// An absolute or relative URI reference.
pub(crate) fn parse_uri_reference(s: &str) -> Result<String, Error> {
    let s = s.trim();
    if has_illegal_chars(s) {
        return Err(Error::invalid_lexical("uri-reference", s));
    }
    let parsed = match Url::parse(s) {
        Err(url::ParseError::RelativeUrlWithoutBase) => match PROBE_BASE.as_ref() {
            Some(base) => base.join(s),
            None => Err(url::ParseError::RelativeUrlWithoutBase),
        },
        other => other,
    };
    parsed
        .map(|_| s.to_string())
        .map_err(|e| Error::invalid_lexical("uri-reference", s).caused_by(e))
}

/// `fn:resolve-uri`: an absolute `relative` is returned as is.
pub(crate) fn resolve(relative: &str, base: &Url) -> Result<Url, Error> {
    match Url::parse(relative) {
        Ok(absolute) => Ok(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(base.join(relative)?),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn cast_to_uri(item: &AtomicItem) -> Result<String, Error> {
    match item {
        AtomicItem::AnyUri(s) => Ok(s.clone()),
        AtomicItem::UriReference(s) => parse_uri(s),
        other if other.is_string_like() => parse_uri(&other.as_string()),
        other => Err(cannot_cast(other, "uri")),
    }
}

pub(crate) fn cast_to_uri_reference(item: &AtomicItem) -> Result<String, Error> {
    match item {
        AtomicItem::AnyUri(s) | AtomicItem::UriReference(s) => Ok(s.clone()),
        other if other.is_string_like() => parse_uri_reference(&other.as_string()),
        other => Err(cannot_cast(other, "uri-reference")),
    }
}
