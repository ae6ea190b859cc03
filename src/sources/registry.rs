//! Registry for managing provider plugins.

use std::sync::Arc;

use super::{Source, SourceError};
use crate::config::{Config, SourcesConfig};
use crate::utils::HttpClient;

bitflags::bitflags! {
    /// Capabilities that a source can support
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SourceCapabilities: u32 {
        const SEARCH = 1 << 0;
        const DOI_LOOKUP = 1 << 1;
        const ISBN_LOOKUP = 1 << 2;
    }
}

/// Registry of all available providers.
///
/// Registration order is the fan-out order, and therefore the order in which
/// provider results appear before merging.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn Source>>,
    selection: SourcesConfig,
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every compiled-in provider, sharing one HTTP client
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = HttpClient::from_config(&config.http)?;
        let mut registry = Self::new().with_selection(config.sources.clone());

        #[cfg(feature = "source-crossref")]
        registry.register(Arc::new(super::CrossrefSource::new(client.clone())));
        #[cfg(feature = "source-openlibrary")]
        registry.register(Arc::new(super::OpenLibrarySource::new(client.clone())));
        #[cfg(feature = "source-google_books")]
        registry.register(Arc::new(super::GoogleBooksSource::new(client.clone())));
        #[cfg(feature = "source-doaj")]
        registry.register(Arc::new(super::DoajSource::new(client.clone())));
        #[cfg(feature = "source-doab")]
        registry.register(Arc::new(super::DoabSource::new(client.clone())));
        #[cfg(feature = "source-semantic")]
        registry.register(Arc::new(super::SemanticScholarSource::new(client.clone())));
        #[cfg(feature = "source-loc")]
        registry.register(Arc::new(super::LocSource::new(client.clone())));
        #[cfg(feature = "source-wipo")]
        registry.register(Arc::new(super::WipoSource::new(
            client.clone(),
            config.patent.api_url.clone(),
        )));

        Ok(registry)
    }

    /// Restrict which registered sources take part in searches
    pub fn with_selection(mut self, selection: SourcesConfig) -> Self {
        self.selection = selection;
        self
    }

    /// Register a new source, replacing any source with the same id in place
    pub fn register(&mut self, source: Arc<dyn Source>) {
        match self.sources.iter().position(|s| s.id() == source.id()) {
            Some(idx) => self.sources[idx] = source,
            None => self.sources.push(source),
        }
    }

    /// Get a source by ID
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Source>> {
        self.sources.iter().find(|s| s.id() == id)
    }

    /// Get all registered sources, in registration order
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.iter()
    }

    /// Get all source IDs
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.id())
    }

    /// Whether a registered source takes part in searches
    pub fn is_enabled(&self, id: &str) -> bool {
        self.selection.is_enabled(id)
    }

    /// Sources that take part in searches, in registration order
    pub fn active(&self) -> Vec<Arc<dyn Source>> {
        self.sources
            .iter()
            .filter(|s| self.selection.is_enabled(s.id()))
            .cloned()
            .collect()
    }

    /// Get sources that support a specific capability
    pub fn with_capability(&self, capability: SourceCapabilities) -> Vec<&Arc<dyn Source>> {
        self.all()
            .filter(|s| s.capabilities().contains(capability))
            .collect()
    }

    /// Check if a source exists
    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Get the number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
