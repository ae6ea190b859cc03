//! Concurrent fan-out of one query to every enabled provider.
//!
//! [`Aggregator::search`] never fails. Each provider runs in its own task
//! under a time budget; a provider that errors, hangs or panics contributes
//! nothing and the others' records are still returned, in provider order.

mod refine;

pub use refine::{refine_results, DEFAULT_DISPLAY_LIMIT};

use futures_util::future::join_all;
use std::time::{Duration, Instant};

use crate::config::SearchSettings;
use crate::models::{MergedRecord, NormalizedRecord, SearchQuery};
use crate::sources::{SourceError, SourceRegistry};
use crate::utils::merge_records;

/// Runs queries against a registry of providers and merges the results
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: SourceRegistry,
    settings: SearchSettings,
}

impl Aggregator {
    pub fn new(registry: SourceRegistry, settings: SearchSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Search every enabled provider and merge records describing the same work
    pub async fn search(&self, query: &str) -> Vec<MergedRecord> {
        let records = self.collect(query).await;
        let collected = records.len();
        let merged = merge_records(records, self.settings.similarity_threshold);

        tracing::info!(
            "Merged {} provider records into {} results",
            collected,
            merged.len()
        );
        merged
    }

    /// Search every enabled provider concurrently, without merging.
    ///
    /// Records come back grouped by provider in registration order. A blank
    /// query returns nothing without touching the network.
    pub async fn collect(&self, query: &str) -> Vec<NormalizedRecord> {
        let query = SearchQuery::new(query).max_results(self.settings.max_results_per_source);
        if query.is_empty() {
            tracing::debug!("Empty query, no search performed");
            return Vec::new();
        }

        if let Some(doi) = &query.doi {
            tracing::debug!("Query carries DOI {}", doi);
        } else if let Some(isbn) = &query.isbn {
            tracing::debug!("Query looks like ISBN {}", isbn);
        }

        let sources = self.registry.active();
        let budget = self.settings.provider_timeout();
        let started = Instant::now();

        let handles: Vec<_> = sources
            .iter()
            .map(|source| {
                let source = source.clone();
                let query = query.clone();
                tokio::spawn(async move {
                    match tokio::time::timeout(budget, source.search(&query)).await {
                        Ok(records) => records,
                        Err(_) => {
                            let err = SourceError::Timeout(budget);
                            tracing::warn!(
                                source = source.id(),
                                kind = err.kind(),
                                "Search failed for {}: {}",
                                source.id(),
                                err
                            );
                            Vec::new()
                        }
                    }
                })
            })
            .collect();

        let results = join_all(handles).await;

        let mut records = Vec::new();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(batch) => records.extend(batch),
                Err(e) => tracing::warn!(source = source.id(), "Provider task failed: {}", e),
            }
        }

        tracing::info!(
            "Collected {} records from {} providers in {:?}",
            records.len(),
            sources.len(),
            started.elapsed()
        );
        records
    }

    /// Per-provider time budget
    pub fn provider_timeout(&self) -> Duration {
        self.settings.provider_timeout()
    }
}
