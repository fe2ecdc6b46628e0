//! Primitive string matchers shared by the shape definitions

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// ISO-8601-like date, with optional time, fraction and offset
const DATE_ISO: &str = concat!(
    r"^(-?(?:[1-9][0-9]*)?[0-9]{4})-(1[0-2]|0[1-9])-(3[01]|0[1-9]|[12][0-9])",
    r"(T(2[0-3]|[01][0-9]):([0-5][0-9]):([0-5][0-9])(\.[0-9]+)?",
    r"(Z|[+-](?:2[0-3]|[01][0-9]):[0-5][0-9])?)?$",
);

const URL_FORMAT: &str = r"^https?://";

const CONTEXT: &str = r"^https://schema\.org";

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(DATE_ISO).expect("date pattern compiles"));
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(URL_FORMAT).expect("url pattern compiles"));
static CONTEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(CONTEXT).expect("context pattern compiles"));

/// A reusable constrained-string check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// `YYYY-MM-DD[THH:MM:SS[.fff][Z|±HH:MM]]`
    Date,
    /// Starts with `http://` or `https://`
    Url,
    /// Starts with `https://schema.org`
    Context,
}

impl Matcher {
    pub fn is_match(&self, s: &str) -> bool {
        match self {
            Matcher::Date => is_date(s),
            Matcher::Url => is_url(s),
            Matcher::Context => is_context(s),
        }
    }

    /// Short label used in violation messages
    pub fn label(&self) -> &'static str {
        match self {
            Matcher::Date => "ISO-8601 date",
            Matcher::Url => "http(s) URL",
            Matcher::Context => "schema.org context",
        }
    }
}

pub fn is_date(s: &str) -> bool {
    DATE_RE.is_match(s)
}

pub fn is_url(s: &str) -> bool {
    URL_RE.is_match(s)
}

pub fn is_context(s: &str) -> bool {
    CONTEXT_RE.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_accepts_iso_forms() {
        assert!(is_date("2023-05-10"));
        assert!(is_date("2023-05-10T12:30:00Z"));
        assert!(is_date("2023-05-10T12:30:00+02:00"));
        assert!(is_date("2023-05-10T23:59:59.125-11:30"));
        assert!(is_date("-12023-01-31"));
    }

    #[test]
    fn test_date_rejects_malformed() {
        assert!(!is_date("2023-13-01"));
        assert!(!is_date("05/10/2023"));
        assert!(!is_date("2023-05-32"));
        assert!(!is_date("2023-05-10T24:00:00"));
        assert!(!is_date("2023-05-10T12:60:00"));
        assert!(!is_date("2023-05-10 trailing"));
        assert!(!is_date("02023-05-10"));
    }

    #[test]
    fn test_date_is_syntactic_only() {
        // no per-month day counts
        assert!(is_date("2023-02-31"));
    }

    #[test]
    fn test_url_prefix() {
        assert!(is_url("https://example.com"));
        assert!(is_url("http://example.com/path"));
        assert!(!is_url("ftp://example.com"));
        assert!(!is_url("example.com"));
        assert!(!is_url("httpss://example.com"));
    }

    #[test]
    fn test_context() {
        assert!(is_context("https://schema.org"));
        assert!(is_context("https://schema.org/"));
        assert!(!is_context("http://schema.org"));
        assert!(!is_context("schema.org"));
    }

    #[test]
    fn test_matcher_dispatch() {
        assert!(Matcher::Date.is_match("2020-01-01"));
        assert!(Matcher::Url.is_match("https://a.b"));
        assert!(!Matcher::Context.is_match("https://example.org"));
    }
}
