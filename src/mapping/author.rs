//! Author name parsing.

use crate::models::AuthorName;

/// Split a raw author string into first and last name.
///
/// `"Smith, John"` and `"John Smith"` both give first `John`, last `Smith`.
/// A single token is taken as the last name.
pub fn parse_author_name(raw: &str) -> AuthorName {
    let trimmed = raw.trim();

    let (first, last) = match trimmed.split_once(',') {
        Some((last, first)) => (first.trim().to_string(), last.trim().to_string()),
        None => {
            let mut tokens: Vec<&str> = trimmed.split_whitespace().collect();
            let last = tokens.pop().unwrap_or_default().to_string();
            (tokens.join(" "), last)
        }
    };

    AuthorName {
        original: raw.to_string(),
        first_name: first,
        last_name: last,
    }
}
