//! Query classification for identifiers and URLs.
//!
//! The aggregator decides once per query whether it carries a DOI, an ISBN,
//! or a web address; adapters only read the result.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Validation error types
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

fn doi_pattern() -> &'static Regex {
    static DOI: OnceLock<Regex> = OnceLock::new();
    DOI.get_or_init(|| Regex::new(r"10\.\d{4,}/\S+").expect("DOI pattern is valid"))
}

fn domain_pattern() -> &'static Regex {
    static DOMAIN: OnceLock<Regex> = OnceLock::new();
    DOMAIN.get_or_init(|| {
        Regex::new(r"(?i)^(https?://)?(www\.)?[\w.-]+\.[a-z]{2,}(/.*)?$")
            .expect("domain pattern is valid")
    })
}

/// Find the first DOI (`10.<4+ digits>/<non-space>`) anywhere in the text
pub fn extract_doi(text: &str) -> Option<String> {
    doi_pattern().find(text).map(|m| m.as_str().to_string())
}

/// Reduce the text to ISBN characters (digits and `X`).
///
/// Returns the reduced string when it has the length of an ISBN-10 or
/// ISBN-13, so `978-0-13-468599-1` becomes `9780134685991`. Titles reduce to
/// (nearly) nothing and stay keyword queries.
pub fn isbn_candidate(text: &str) -> Option<String> {
    let reduced: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .collect();

    matches!(reduced.len(), 10 | 13).then_some(reduced)
}

/// If the text looks like a web address or bare domain, return it as an
/// absolute URL (adding `http://` when no scheme was typed)
pub fn url_candidate(text: &str) -> Option<url::Url> {
    let text = text.trim();
    if !domain_pattern().is_match(text) {
        return None;
    }

    let lower = text.to_ascii_lowercase();
    let absolute = if lower.starts_with("http://") || lower.starts_with("https://") {
        text.to_string()
    } else {
        format!("http://{}", text)
    };

    url::Url::parse(&absolute).ok()
}

/// Validate an endpoint URL taken from configuration
pub fn validate_url(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::InvalidUrl("empty URL".to_string()));
    }

    let parsed = url::Url::parse(url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(url.trim_end_matches('/').to_string()),
        scheme => Err(ValidationError::InvalidUrl(format!(
            "invalid scheme: {}",
            scheme
        ))),
    }
}
