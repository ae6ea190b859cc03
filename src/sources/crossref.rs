//! Crossref scholarly index implementation.
//!
//! Uses the Crossref REST API for title search and direct DOI lookup.
//! API documentation: <https://api.crossref.org/swagger-ui/index.html>

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{value_text, NormalizedRecord, RecordBuilder, SearchQuery, SourceType};
use crate::sources::{
    decode_item, endpoint, null_as_default, parse_items, Source, SourceCapabilities, SourceError,
};
use crate::utils::HttpClient;

const CROSSREF_API_BASE: &str = "https://api.crossref.org";

/// Crossref scholarly index
#[derive(Debug, Clone)]
pub struct CrossrefSource {
    client: HttpClient,
    base_url: String,
}

impl CrossrefSource {
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, CROSSREF_API_BASE)
    }

    /// Point the source at another host (mirrors, test servers)
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn lookup_doi(&self, doi: &str) -> Result<Vec<NormalizedRecord>, SourceError> {
        let url = endpoint(
            &self.base_url,
            &format!("works/{}", urlencoding::encode(doi)),
        );
        tracing::debug!("Crossref DOI lookup: {}", url);

        let data: CRWorkResponse = self.client.get_json(&url).await?;
        match data.message {
            Some(item) => Ok(vec![Self::parse_item(item)?]),
            None => Ok(Vec::new()),
        }
    }

    async fn search_titles(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let url = format!(
            "{}?query.title={}&rows={}",
            endpoint(&self.base_url, "works"),
            urlencoding::encode(&query.query),
            query.max_results
        );
        tracing::debug!("Crossref search: {}", url);

        let data: CRSearchResponse = self.client.get_json(&url).await?;
        let items = data.message.map(|m| m.items).unwrap_or_default();
        Ok(parse_items(self.id(), items, Self::parse_item))
    }

    /// Parse one Crossref work
    fn parse_item(item: Value) -> Result<NormalizedRecord, SourceError> {
        let (work, raw): (CRItem, _) = decode_item(item)?;

        let authors = work.author.iter().filter_map(CRAuthor::display_name);

        let year = work
            .issued
            .as_ref()
            .and_then(|d| d.date_parts.first())
            .and_then(|parts| parts.first())
            .and_then(value_text);

        Ok(
            RecordBuilder::new(SourceType::Crossref, raw.text("title").unwrap_or_default())
                .authors(authors)
                .doi(raw.first_text(&["DOI", "doi"]))
                .issn(raw.text("ISSN"))
                .publisher(raw.text("publisher"))
                .year(year)
                .url(raw.text("URL"))
                .raw(raw)
                .build(),
        )
    }
}

#[async_trait]
impl Source for CrossrefSource {
    fn id(&self) -> &str {
        "crossref"
    }

    fn name(&self) -> &str {
        "Crossref"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH | SourceCapabilities::DOI_LOOKUP
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        match &query.doi {
            Some(doi) => self.lookup_doi(doi).await,
            None => self.search_titles(query).await,
        }
    }
}

// ===== Crossref API Types =====

#[derive(Debug, Deserialize)]
struct CRWorkResponse {
    message: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CRSearchResponse {
    message: Option<CRMessage>,
}

#[derive(Debug, Deserialize)]
struct CRMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CRItem {
    #[serde(default, deserialize_with = "null_as_default")]
    author: Vec<CRAuthor>,
    issued: Option<CRDate>,
}

#[derive(Debug, Deserialize)]
struct CRAuthor {
    given: Option<String>,
    family: Option<String>,
    /// Organizational authors only carry a name
    name: Option<String>,
}

impl CRAuthor {
    fn display_name(&self) -> Option<String> {
        let joined = [self.given.as_deref(), self.family.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if joined.is_empty() {
            self.name.clone()
        } else {
            Some(joined)
        }
    }
}

#[derive(Debug, Deserialize)]
struct CRDate {
    #[serde(rename = "date-parts", default, deserialize_with = "null_as_default")]
    date_parts: Vec<Vec<Value>>,
}
