//! Bibliographic provider plugins with a trait-based architecture.
//!
//! Every provider implements [`Source`]. New providers can be added by
//! implementing the trait and registering them with the [`SourceRegistry`].
//! Providers can be selectively enabled or disabled at runtime through the
//! `[sources]` configuration section.
//!
//! # Feature Flags
//!
//! Individual providers can be left out at compile time:
//!
//! - `crossref` - Crossref scholarly index (default: enabled)
//! - `openlibrary` - Open Library catalog (default: enabled)
//! - `google_books` - Google Books (default: enabled)
//! - `doaj` - Directory of Open Access Journals (default: enabled)
//! - `doab` - Directory of Open Access Books (default: enabled)
//! - `semantic` - Semantic Scholar academic graph (default: enabled)
//! - `loc` - Library of Congress catalog (default: enabled)
//! - `wipo` - Patent index (default: enabled, inert until `patent.api_url` is set)
//!
//! # Failure isolation
//!
//! Providers implement the fallible [`Source::fetch`]; callers use
//! [`Source::search`], which turns any transport or parse failure into an
//! empty result and a warning. One broken provider never hides another
//! provider's records.

#[cfg(feature = "source-crossref")]
mod crossref;
#[cfg(feature = "source-doab")]
mod doab;
#[cfg(feature = "source-doaj")]
mod doaj;
#[cfg(feature = "source-google_books")]
mod google_books;
#[cfg(feature = "source-loc")]
mod loc;
#[cfg(feature = "source-openlibrary")]
mod openlibrary;
mod registry;
#[cfg(feature = "source-semantic")]
mod semantic;
#[cfg(feature = "source-wipo")]
mod wipo;

pub mod mock;

pub use mock::MockSource;

#[cfg(feature = "source-crossref")]
pub use crossref::CrossrefSource;
#[cfg(feature = "source-doab")]
pub use doab::DoabSource;
#[cfg(feature = "source-doaj")]
pub use doaj::DoajSource;
#[cfg(feature = "source-google_books")]
pub use google_books::GoogleBooksSource;
#[cfg(feature = "source-loc")]
pub use loc::LocSource;
#[cfg(feature = "source-openlibrary")]
pub use openlibrary::OpenLibrarySource;
#[cfg(feature = "source-semantic")]
pub use semantic::SemanticScholarSource;
#[cfg(feature = "source-wipo")]
pub use wipo::WipoSource;

pub use registry::{SourceCapabilities, SourceRegistry};

use async_trait::async_trait;
use std::time::Duration;

use crate::models::{NormalizedRecord, SearchQuery};

/// The Source trait defines the interface for all provider plugins.
///
/// # Implementing a New Source
///
/// 1. Create a struct that implements `Source`
/// 2. Implement `id`, `name`, and `fetch`, mapping the provider schema into
///    [`NormalizedRecord`]s
/// 3. Advertise identifier lookups through `capabilities`
/// 4. Add the source to `SourceRegistry::from_config()` or register it dynamically
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "crossref", "openlibrary")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Describe the capabilities of this source
    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
    }

    /// Whether this source resolves DOIs directly
    fn supports_doi_lookup(&self) -> bool {
        self.capabilities().contains(SourceCapabilities::DOI_LOOKUP)
    }

    /// Whether this source resolves ISBNs directly
    fn supports_isbn_lookup(&self) -> bool {
        self.capabilities().contains(SourceCapabilities::ISBN_LOOKUP)
    }

    /// Query the provider and normalize its payload
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError>;

    /// Query the provider, degrading any failure to an empty result
    async fn search(&self, query: &SearchQuery) -> Vec<NormalizedRecord> {
        match self.fetch(query).await {
            Ok(records) => {
                tracing::debug!("{} returned {} records", self.id(), records.len());
                records
            }
            Err(e) => {
                tracing::warn!(
                    source = self.id(),
                    kind = e.kind(),
                    "Search failed for {}: {}",
                    self.id(),
                    e
                );
                Vec::new()
            }
        }
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response status
    #[error("API returned status {0}")]
    Api(u16),

    /// The call exceeded its time budget
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Malformed or unexpected JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl SourceError {
    /// Coarse failure class used in diagnostics: `transport` or `parse`
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Network(_) | SourceError::Api(_) | SourceError::Timeout(_) => {
                "transport"
            }
            SourceError::Parse(_) => "parse",
            SourceError::InvalidRequest(_) | SourceError::Other(_) => "other",
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SourceError::Api(status.as_u16()),
            None => SourceError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

/// Join a base URL and a path without doubling slashes
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Decode a JSON value into `T` and keep the original value as the raw payload
pub(crate) fn decode_item<T: serde::de::DeserializeOwned>(
    item: serde_json::Value,
) -> Result<(T, crate::models::RawPayload), SourceError> {
    let typed = T::deserialize(&item)?;
    Ok((typed, crate::models::RawPayload::from_value(item)))
}

/// Deserialize an explicit `null` as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    Ok(<Option<T> as serde::Deserialize>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse provider items one by one, skipping (and logging) items that fail
pub(crate) fn parse_items<F>(
    source: &str,
    items: impl IntoIterator<Item = serde_json::Value>,
    mut parse: F,
) -> Vec<NormalizedRecord>
where
    F: FnMut(serde_json::Value) -> Result<NormalizedRecord, SourceError>,
{
    items
        .into_iter()
        .filter_map(|item| match parse(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    source = source,
                    kind = e.kind(),
                    "Skipping malformed {} item: {}",
                    source,
                    e
                );
                None
            }
        })
        .collect()
}
