//! DOAB (Directory of Open Access Books) search.
//!
//! The search endpoint has no page-size parameter, so results are capped
//! client-side.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{value_text, NormalizedRecord, RecordBuilder, SearchQuery, SourceType};
use crate::sources::{decode_item, endpoint, null_as_default, parse_items, Source, SourceError};
use crate::utils::HttpClient;

const DOAB_API_BASE: &str = "https://www.doabooks.org/api/v2";

/// DOAB open-access book index
#[derive(Debug, Clone)]
pub struct DoabSource {
    client: HttpClient,
    base_url: String,
}

impl DoabSource {
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DOAB_API_BASE)
    }

    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn parse_result(item: Value) -> Result<NormalizedRecord, SourceError> {
        let (book, raw): (DoabBook, _) = decode_item(item)?;

        Ok(
            RecordBuilder::new(SourceType::Doab, raw.text("title").unwrap_or_default())
                .authors(book.authors.iter().filter_map(value_text))
                .isbn(raw.text("isbn"))
                .publisher(raw.text("publisher"))
                .year(raw.text("year"))
                .url(raw.text("link"))
                .raw(raw)
                .build(),
        )
    }
}

#[async_trait]
impl Source for DoabSource {
    fn id(&self) -> &str {
        "doab"
    }

    fn name(&self) -> &str {
        "DOAB"
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let url = format!(
            "{}?q={}",
            endpoint(&self.base_url, "search/"),
            urlencoding::encode(&query.query)
        );
        tracing::debug!("DOAB search: {}", url);

        let data: DoabResponse = self.client.get_json(&url).await?;
        let results = data.results.into_iter().take(query.max_results);
        Ok(parse_items(self.id(), results, Self::parse_result))
    }
}

// ===== DOAB API Types =====

#[derive(Debug, Deserialize)]
struct DoabResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DoabBook {
    /// Usually plain strings, occasionally null entries
    #[serde(default, deserialize_with = "null_as_default")]
    authors: Vec<Value>,
}
