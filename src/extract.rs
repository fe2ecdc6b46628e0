//! Page retrieval and JSON-LD extraction
//!
//! Everything here feeds the validator: fetch the page, locate
//! `<script type="application/ld+json">` elements, decode their text.

use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::error::{DecodeError, FetchError, Result};

static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("script pattern compiles")
});

static LD_JSON_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?i)(?:^|\s)type\s*=\s*"#,
        r#"(?:"\s*application/ld\+json\s*"|'\s*application/ld\+json\s*'|application/ld\+json(?:\s|/?$))"#,
    ))
    .expect("type pattern compiles")
});

/// Decoded candidates plus the scripts that could not be decoded
#[derive(Debug, Default)]
pub struct Extraction {
    /// Decoded values, in document order
    pub candidates: Vec<Value>,
    pub failures: Vec<DecodeError>,
    /// Script indices that needed control-character repair
    pub repaired: Vec<usize>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.failures.is_empty()
    }
}

/// One decoded script
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedScript {
    pub index: usize,
    pub value: Value,
    /// Raw control characters escaped before decoding
    pub repairs: usize,
}

// =============================================================================
// Fetch
// =============================================================================

/// GET `url` with a bounded timeout and return the body
pub fn fetch_page(url: &str, config: &FetchConfig) -> std::result::Result<String, FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    let classify = |e: reqwest::Error, body: bool| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                secs: config.timeout_secs,
            }
        } else if body {
            FetchError::Body {
                url: url.to_string(),
                source: e,
            }
        } else {
            FetchError::Connection {
                url: url.to_string(),
                source: e,
            }
        }
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| classify(e, false))?;

    debug!(url, timeout_secs = config.timeout_secs, "fetching page");
    let response = client.get(parsed).send().map_err(|e| classify(e, false))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().map_err(|e| classify(e, true))
}

/// Fetch a page and extract its JSON-LD candidates
pub fn load_page(url: &str, config: &FetchConfig) -> std::result::Result<Extraction, FetchError> {
    let html = fetch_page(url, config)?;
    info!(url, bytes = html.len(), "page retrieved");
    Ok(extract_candidates(&html))
}

/// Candidates from a local file
///
/// `.json` files hold one candidate or an array of candidates; anything else is
/// read as HTML.
pub fn load_file(path: &Path) -> Result<Extraction> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("jsonld"))
        .unwrap_or(false);

    if !is_json {
        return Ok(extract_candidates(&content));
    }

    let candidates = match serde_json::from_str::<Value>(&content)? {
        Value::Array(items) => items,
        single => vec![single],
    };
    Ok(Extraction {
        candidates,
        ..Extraction::default()
    })
}

// =============================================================================
// Extraction
// =============================================================================

/// Text of every `application/ld+json` script, in document order
pub fn find_ld_json_scripts(html: &str) -> Vec<&str> {
    SCRIPT_RE
        .captures_iter(html)
        .filter(|c| c.get(1).map(|a| LD_JSON_TYPE_RE.is_match(a.as_str())).unwrap_or(false))
        .filter_map(|c| c.get(2).map(|m| m.as_str()))
        .collect()
}

/// Locate and decode every JSON-LD script. Undecodable scripts are reported, not fatal.
pub fn extract_candidates(html: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for (index, text) in find_ld_json_scripts(html).into_iter().enumerate() {
        match decode_script(index, text) {
            Ok(decoded) => {
                if decoded.repairs > 0 {
                    extraction.repaired.push(index);
                }
                extraction.candidates.push(decoded.value);
            }
            Err(e) => {
                warn!(index, error = %e.source, "skipping undecodable script");
                extraction.failures.push(e);
            }
        }
    }

    debug!(
        candidates = extraction.candidates.len(),
        failures = extraction.failures.len(),
        "extraction finished"
    );
    extraction
}

/// Decode one script body, tolerating raw control characters inside strings
pub fn decode_script(index: usize, text: &str) -> std::result::Result<DecodedScript, DecodeError> {
    let strict_err = match serde_json::from_str(text) {
        Ok(value) => {
            return Ok(DecodedScript {
                index,
                value,
                repairs: 0,
            })
        }
        Err(e) => e,
    };

    let (escaped, repairs) = escape_control_chars(text);
    if repairs == 0 {
        return Err(DecodeError {
            index,
            source: strict_err,
        });
    }

    match serde_json::from_str(&escaped) {
        Ok(value) => {
            warn!(index, repairs, "script contains raw control characters inside strings");
            Ok(DecodedScript {
                index,
                value,
                repairs,
            })
        }
        Err(source) => Err(DecodeError { index, source }),
    }
}

/// Escape raw control characters that appear inside JSON string literals
fn escape_control_chars(text: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut repairs = 0;

    for ch in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            } else if (ch as u32) < 0x20 {
                repairs += 1;
                match ch {
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    other => out.push_str(&format!("\\u{:04x}", other as u32)),
                }
                continue;
            }
        } else if ch == '"' {
            in_string = true;
        }
        out.push(ch);
    }

    (out, repairs)
}
