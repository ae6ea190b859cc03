//! # Citation Finder
//!
//! Search bibliographic records (books, articles, patents, web pages) across
//! public data providers and turn the best match into canonical citation
//! metadata that citation forms can be pre-filled with.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`sources`]: Provider adapters behind the [`Source`] trait, and the [`SourceRegistry`]
//! - [`search`]: The [`Aggregator`] fanning one query out to every provider
//! - [`utils`]: Record merging, HTTP client, query classification, display helpers
//! - [`mapping`]: Projection of merged records into [`CanonicalCitationMetadata`]
//! - [`state`]: The [`ApplicationState`] holding the metadata applied to a form
//! - [`models`]: Core data structures (records, canonical metadata, form kinds)
//! - [`config`]: Configuration management
//!
//! ## Example
//!
//! ```rust,no_run
//! use citation_finder::config::Config;
//! use citation_finder::{map_to_canonical, Aggregator, ApplicationState, SourceRegistry};
//! use citation_finder::models::FormKind;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let registry = SourceRegistry::from_config(&config)?;
//! let aggregator = Aggregator::new(registry, config.search.clone());
//!
//! let results = aggregator.search("Deep learning").await;
//! if let Some(best) = results.first() {
//!     let mut state = ApplicationState::new();
//!     state.apply_metadata(&map_to_canonical(best), None, Some(FormKind::SerialContribution));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod mapping;
pub mod models;
pub mod search;
pub mod sources;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use mapping::map_to_canonical;
pub use models::{CanonicalCitationMetadata, FormKind, MergedRecord, NormalizedRecord};
pub use search::Aggregator;
pub use sources::{Source, SourceRegistry};
pub use state::{ApplicationState, QueryGeneration, StateError};
