//! Search query model.

use serde::{Deserialize, Serialize};

use crate::utils::{extract_doi, isbn_candidate};

/// Default number of results requested from each provider
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// A user query together with its shape, decided once per search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The trimmed query text as typed
    pub query: String,

    /// DOI found in the query, if it contains one
    pub doi: Option<String>,

    /// Query reduced to ISBN characters, if that yields a 10 or 13 character ISBN
    pub isbn: Option<String>,

    /// Maximum number of results per provider
    pub max_results: usize,
}

impl SearchQuery {
    /// Create a query and classify its shape
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into().trim().to_string();
        let doi = extract_doi(&query);
        let isbn = isbn_candidate(&query);
        Self {
            query,
            doi,
            isbn,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Set max results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// True when neither identifier path applies
    pub fn is_keyword(&self) -> bool {
        self.doi.is_none() && self.isbn.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_query() {
        let query = SearchQuery::new("  deep learning  ");
        assert_eq!(query.query, "deep learning");
        assert!(query.is_keyword());
        assert_eq!(query.max_results, DEFAULT_MAX_RESULTS);
    }

    #[test]
    fn test_isbn_query_shape() {
        let query = SearchQuery::new("978-0-13-468599-1");
        assert_eq!(query.isbn.as_deref(), Some("9780134685991"));
        assert!(query.doi.is_none());
    }

    #[test]
    fn test_doi_query_shape() {
        let query = SearchQuery::new("see https://doi.org/10.1038/nature14539");
        assert_eq!(query.doi.as_deref(), Some("10.1038/nature14539"));
        assert!(!query.is_keyword());
    }

    #[test]
    fn test_blank_query() {
        assert!(SearchQuery::new("   ").is_empty());
    }
}
