//! Semantic Scholar academic graph search.
//!
//! Public endpoints are rate limited; a 429 degrades to an empty result like
//! any other non-2xx status.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{NormalizedRecord, RecordBuilder, SearchQuery, SourceType};
use crate::sources::{decode_item, endpoint, null_as_default, parse_items, Source, SourceError};
use crate::utils::HttpClient;

const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";
const SEMANTIC_FIELDS: &str = "title,authors,year,externalIds,url";

/// Semantic Scholar academic graph
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
    base_url: String,
}

impl SemanticScholarSource {
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, SEMANTIC_API_BASE)
    }

    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn parse_paper(item: Value) -> Result<NormalizedRecord, SourceError> {
        let (paper, raw): (SSPaper, _) = decode_item(item)?;

        Ok(
            RecordBuilder::new(SourceType::SemanticScholar, raw.text("title").unwrap_or_default())
                .authors(paper.authors.into_iter().filter_map(|a| a.name))
                .doi(raw.nested_text("externalIds", "DOI"))
                .year(raw.text("year"))
                .url(raw.text("url"))
                .raw(raw)
                .build(),
        )
    }
}

#[async_trait]
impl Source for SemanticScholarSource {
    fn id(&self) -> &str {
        "semanticscholar"
    }

    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let url = format!(
            "{}?query={}&limit={}&fields={}",
            endpoint(&self.base_url, "paper/search"),
            urlencoding::encode(&query.query),
            query.max_results,
            SEMANTIC_FIELDS
        );
        tracing::debug!("Semantic Scholar search: {}", url);

        let data: SSResponse = self.client.get_json(&url).await?;
        Ok(parse_items(self.id(), data.data, Self::parse_paper))
    }
}

// ===== Semantic Scholar API Types =====

#[derive(Debug, Deserialize)]
struct SSResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SSPaper {
    #[serde(default, deserialize_with = "null_as_default")]
    authors: Vec<SSAuthor>,
}

#[derive(Debug, Deserialize)]
struct SSAuthor {
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_paper_search() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "attention is all you need".into()),
                Matcher::UrlEncoded("limit".into(), "5".into()),
                Matcher::UrlEncoded("fields".into(), SEMANTIC_FIELDS.into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"total": 1, "offset": 0, "data": [{
                    "paperId": "204e3073870fae3d05bcbc2f6a8e263d9b72e776",
                    "title": "Attention is All you Need",
                    "year": 2017,
                    "url": "https://www.semanticscholar.org/paper/204e3073870fae3d05bcbc2f6a8e263d9b72e776",
                    "externalIds": {"DOI": "10.48550/arXiv.1706.03762", "ArXiv": "1706.03762"},
                    "authors": [
                        {"authorId": "40348417", "name": "Ashish Vaswani"},
                        {"authorId": "1846258", "name": "Noam Shazeer"}
                    ]
                }]}"#,
            )
            .create_async()
            .await;

        let source = SemanticScholarSource::with_base_url(HttpClient::new().unwrap(), server.url());
        let records = source
            .fetch(&SearchQuery::new("attention is all you need"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 1);
        let paper = &records[0];
        assert_eq!(paper.source, SourceType::SemanticScholar);
        assert_eq!(paper.title, "Attention is All you Need");
        assert_eq!(paper.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(paper.year.as_deref(), Some("2017"));
        assert_eq!(paper.doi.as_deref(), Some("10.48550/arXiv.1706.03762"));
    }

    #[tokio::test]
    async fn test_bad_items_do_not_sink_the_batch() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"data": [
                    {"title": "Good Paper", "authors": [{"name": "Ada Lovelace"}]},
                    {"title": "Odd Paper", "authors": null},
                    {"title": "Broken Paper", "authors": "not a list"}
                ]}"#,
            )
            .create_async()
            .await;

        let source = SemanticScholarSource::with_base_url(HttpClient::new().unwrap(), server.url());
        let records = source.fetch(&SearchQuery::new("paper")).await.unwrap();

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Good Paper", "Odd Paper"]);
        assert_eq!(records[0].authors, vec!["Ada Lovelace"]);
        assert!(records[1].authors.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body(r#"{"message": "Too Many Requests"}"#)
            .create_async()
            .await;

        let source = SemanticScholarSource::with_base_url(HttpClient::new().unwrap(), server.url());
        let query = SearchQuery::new("transformers");
        assert!(matches!(source.fetch(&query).await, Err(SourceError::Api(429))));
        assert!(source.search(&query).await.is_empty());
    }
}
