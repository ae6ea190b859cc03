//! DOAJ (Directory of Open Access Journals) article search.
//!
//! API documentation: <https://doaj.org/api/v2/docs>
//!
//! DOAJ is free and requires no API key for basic search.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{NormalizedRecord, RecordBuilder, SearchQuery, SourceType};
use crate::sources::{decode_item, endpoint, null_as_default, parse_items, Source, SourceError};
use crate::utils::HttpClient;

const DOAJ_API_BASE: &str = "https://doaj.org/api/v2";

/// DOAJ open-access article index
#[derive(Debug, Clone)]
pub struct DoajSource {
    client: HttpClient,
    base_url: String,
}

impl DoajSource {
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DOAJ_API_BASE)
    }

    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Parse DOAJ result to NormalizedRecord
    fn parse_result(item: Value) -> Result<NormalizedRecord, SourceError> {
        let (article, raw): (DoajArticle, _) = decode_item(item)?;
        let bibjson = article.bibjson.unwrap_or_default();

        let title = bibjson
            .title
            .filter(|t| !t.trim().is_empty())
            .or_else(|| raw.text("title"))
            .unwrap_or_default();

        let authors = bibjson.author.into_iter().filter_map(|a| a.name);

        let doi = bibjson
            .identifier
            .into_iter()
            .find(|id| id.id_type.eq_ignore_ascii_case("doi"))
            .and_then(|id| id.id);

        let url = bibjson.link.into_iter().find_map(|l| l.url);

        Ok(RecordBuilder::new(SourceType::Doaj, title)
            .authors(authors)
            .doi(doi)
            .issn(bibjson.journal.as_ref().and_then(|j| j.issns.first().cloned()))
            .publisher(bibjson.journal.and_then(|j| j.publisher))
            .year(bibjson.year.as_ref().and_then(crate::models::value_text))
            .url(url)
            .raw(raw)
            .build())
    }
}

#[async_trait]
impl Source for DoajSource {
    fn id(&self) -> &str {
        "doaj"
    }

    fn name(&self) -> &str {
        "DOAJ"
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        // The query travels in the path, Elasticsearch query-string syntax
        let url = format!(
            "{}?pageSize={}",
            endpoint(
                &self.base_url,
                &format!("search/articles/{}", urlencoding::encode(&query.query))
            ),
            query.max_results
        );
        tracing::debug!("DOAJ search: {}", url);

        let data: DoajResponse = self.client.get_json(&url).await?;
        Ok(parse_items(self.id(), data.results, Self::parse_result))
    }
}

// ===== DOAJ API Types =====

#[derive(Debug, Deserialize)]
struct DoajResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DoajArticle {
    bibjson: Option<DoajBibJson>,
}

#[derive(Debug, Default, Deserialize)]
struct DoajBibJson {
    title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    author: Vec<DoajAuthor>,
    #[serde(default, deserialize_with = "null_as_default")]
    identifier: Vec<DoajIdentifier>,
    #[serde(default, deserialize_with = "null_as_default")]
    link: Vec<DoajLink>,
    year: Option<Value>,
    journal: Option<DoajJournal>,
}

#[derive(Debug, Deserialize)]
struct DoajAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoajIdentifier {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    id_type: String,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoajLink {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoajJournal {
    publisher: Option<String>,
    #[serde(rename = "issns", default, deserialize_with = "null_as_default")]
    issns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_article_search() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search/articles/open%20science")
            .match_query(Matcher::UrlEncoded("pageSize".into(), "5".into()))
            .with_status(200)
            .with_body(
                r#"{"total": 1, "results": [{
                    "id": "abc123",
                    "bibjson": {
                        "title": "Open science in practice",
                        "author": [{"name": "Ana Silva"}, {"name": "Li Wei"}],
                        "identifier": [
                            {"type": "eissn", "id": "2041-1723"},
                            {"type": "doi", "id": "10.1234/os.2021.77"}
                        ],
                        "link": [{"type": "fulltext", "url": "https://example.org/os"}],
                        "year": "2021",
                        "journal": {"publisher": "Open Press", "issns": ["2041-1723"]}
                    }
                }]}"#,
            )
            .create_async()
            .await;

        let source = DoajSource::with_base_url(HttpClient::new().unwrap(), server.url());
        let records = source.fetch(&SearchQuery::new("open science")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 1);
        let article = &records[0];
        assert_eq!(article.source, SourceType::Doaj);
        assert_eq!(article.title, "Open science in practice");
        assert_eq!(article.authors, vec!["Ana Silva", "Li Wei"]);
        assert_eq!(article.doi.as_deref(), Some("10.1234/os.2021.77"));
        assert_eq!(article.issn.as_deref(), Some("2041-1723"));
        assert_eq!(article.publisher.as_deref(), Some("Open Press"));
        assert_eq!(article.year.as_deref(), Some("2021"));
        assert_eq!(article.url.as_deref(), Some("https://example.org/os"));
    }

    #[test]
    fn test_title_falls_back_to_top_level() {
        let item = serde_json::json!({
            "title": "Top-level title",
            "bibjson": {"author": []}
        });
        let record = DoajSource::parse_result(item).unwrap();
        assert_eq!(record.title, "Top-level title");
        assert_eq!(record.doi, None);
    }
}
