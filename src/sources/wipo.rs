//! Patent index search against a configurable endpoint.
//!
//! There is no public keyless patent API with a stable JSON shape, so the
//! endpoint comes from `patent.api_url`. Without it the source stays inert
//! and never touches the network.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{NormalizedRecord, RecordBuilder, SearchQuery, SourceType};
use crate::sources::{decode_item, null_as_default, parse_items, Source, SourceError};
use crate::utils::{validate_url, HttpClient};

/// Patent index
#[derive(Debug, Clone)]
pub struct WipoSource {
    client: HttpClient,
    api_url: Option<String>,
}

impl WipoSource {
    pub fn new(client: HttpClient, api_url: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.filter(|u| !u.trim().is_empty()),
        }
    }

    /// Whether an endpoint has been configured
    pub fn is_configured(&self) -> bool {
        self.api_url.is_some()
    }

    fn parse_result(item: Value) -> Result<NormalizedRecord, SourceError> {
        let (patent, raw): (WipoPatent, _) = decode_item(item)?;

        Ok(RecordBuilder::new(
            SourceType::Wipo,
            raw.first_text(&["title", "inventionTitle"]).unwrap_or_default(),
        )
        .authors(patent.applicants.into_iter().filter_map(|a| a.name))
        .doi(raw.text("doi"))
        .url(raw.first_text(&["link", "patentLink"]))
        .raw(raw)
        .build())
    }
}

#[async_trait]
impl Source for WipoSource {
    fn id(&self) -> &str {
        "wipo"
    }

    fn name(&self) -> &str {
        "WIPO Patentscope"
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let Some(api_url) = &self.api_url else {
            tracing::debug!("Patent index not configured, skipping");
            return Ok(Vec::new());
        };

        let base = validate_url(api_url).map_err(|e| SourceError::InvalidRequest(e.to_string()))?;
        let url = format!("{}?q={}", base, urlencoding::encode(&query.query));
        tracing::debug!("Patent search: {}", url);

        let data: WipoResponse = self.client.get_json(&url).await?;
        let results = data.results.into_iter().take(query.max_results);
        Ok(parse_items(self.id(), results, Self::parse_result))
    }
}

// ===== Patent API Types =====

#[derive(Debug, Deserialize)]
struct WipoResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WipoPatent {
    #[serde(default, deserialize_with = "null_as_default")]
    applicants: Vec<WipoApplicant>,
}

#[derive(Debug, Deserialize)]
struct WipoApplicant {
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_unconfigured_is_empty() {
        let source = WipoSource::new(HttpClient::new().unwrap(), None);
        assert!(!source.is_configured());
        let records = source.fetch(&SearchQuery::new("solar cell")).await.unwrap();
        assert!(records.is_empty());

        let blank = WipoSource::new(HttpClient::new().unwrap(), Some("  ".to_string()));
        assert!(!blank.is_configured());
    }

    #[tokio::test]
    async fn test_configured_search() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/patents")
            .match_query(Matcher::UrlEncoded("q".into(), "solar cell".into()))
            .with_status(200)
            .with_body(
                r#"{"results": [
                    {"inventionTitle": "Tandem solar cell", "applicants": [{"name": "Sun Corp"}],
                     "patentLink": "https://patentscope.wipo.int/search/en/WO2020123456",
                     "publicationNumber": "WO2020123456"},
                    {"title": "Solar cell coating", "link": "https://example.org/p/2"}
                ]}"#,
            )
            .create_async()
            .await;

        let source = WipoSource::new(
            HttpClient::new().unwrap(),
            Some(format!("{}/patents", server.url())),
        );
        let records = source.fetch(&SearchQuery::new("solar cell")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Tandem solar cell");
        assert_eq!(records[0].authors, vec!["Sun Corp"]);
        assert_eq!(
            records[0].url.as_deref(),
            Some("https://patentscope.wipo.int/search/en/WO2020123456")
        );
        assert_eq!(records[1].title, "Solar cell coating");
        assert!(records[1].authors.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_rejected() {
        let source = WipoSource::new(HttpClient::new().unwrap(), Some("ftp://patents".into()));
        let query = SearchQuery::new("solar cell");
        assert!(matches!(
            source.fetch(&query).await,
            Err(SourceError::InvalidRequest(_))
        ));
        assert!(source.search(&query).await.is_empty());
    }
}
