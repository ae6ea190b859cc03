//! Utility modules supporting the search engine.
//!
//! - [`merge_records`]: fold provider records describing the same work
//! - [`tokenize_title`] / [`jaccard_similarity`]: the fuzzy title matcher
//! - [`HttpClient`]: shared reqwest client with JSON decoding
//! - [`extract_doi`] / [`isbn_candidate`] / [`url_candidate`]: query classification
//! - [`truncate_with_ellipsis`] and friends: terminal output helpers
//!
//! # Merging
//!
//! ```rust
//! use citation_finder::models::{RecordBuilder, SourceType};
//! use citation_finder::utils::{merge_records, DEFAULT_SIMILARITY_THRESHOLD};
//!
//! let a = RecordBuilder::new(SourceType::Crossref, "Deep Learning Methods").build();
//! let b = RecordBuilder::new(SourceType::Doaj, "deep learning methods survey").build();
//!
//! let merged = merge_records(vec![a, b], DEFAULT_SIMILARITY_THRESHOLD);
//! assert_eq!(merged.len(), 1);
//! assert_eq!(merged[0].sources.len(), 2);
//! ```

mod dedup;
mod display;
mod http;
mod validate;

pub use dedup::{jaccard_similarity, merge_records, tokenize_title, DEFAULT_SIMILARITY_THRESHOLD};
pub use display::{
    fields_table, is_terminal, print_section, records_table, terminal_width, truncate_at_word,
    truncate_with_ellipsis, DEFAULT_WIDTH,
};
pub use http::HttpClient;
pub use validate::{extract_doi, isbn_candidate, url_candidate, validate_url, ValidationError};
