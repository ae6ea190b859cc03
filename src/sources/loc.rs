//! Library of Congress catalog search (books collection, JSON view).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{value_text, NormalizedRecord, RecordBuilder, SearchQuery, SourceType};
use crate::sources::{decode_item, endpoint, null_as_default, parse_items, Source, SourceError};
use crate::utils::HttpClient;

const LOC_API_BASE: &str = "https://www.loc.gov";

/// Library of Congress national catalog
#[derive(Debug, Clone)]
pub struct LocSource {
    client: HttpClient,
    base_url: String,
}

impl LocSource {
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, LOC_API_BASE)
    }

    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn parse_result(item: Value) -> Result<NormalizedRecord, SourceError> {
        let (entry, raw): (LocItem, _) = decode_item(item)?;

        Ok(
            RecordBuilder::new(SourceType::LibraryOfCongress, raw.text("title").unwrap_or_default())
                .authors(entry.contributor.iter().filter_map(value_text))
                .year(raw.text("date"))
                .url(raw.text("url"))
                .raw(raw)
                .build(),
        )
    }
}

#[async_trait]
impl Source for LocSource {
    fn id(&self) -> &str {
        "loc"
    }

    fn name(&self) -> &str {
        "Library of Congress"
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let url = format!(
            "{}?fo=json&at=results&st=list&q={}",
            endpoint(&self.base_url, "books/"),
            urlencoding::encode(&query.query)
        );
        tracing::debug!("Library of Congress search: {}", url);

        let data: LocResponse = self.client.get_json(&url).await?;
        let results = data.results.into_iter().take(query.max_results);
        Ok(parse_items(self.id(), results, Self::parse_result))
    }
}

// ===== Library of Congress API Types =====

#[derive(Debug, Deserialize)]
struct LocResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct LocItem {
    #[serde(default, deserialize_with = "null_as_default")]
    contributor: Vec<Value>,
}
