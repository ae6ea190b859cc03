//! Google Books volume search.
//!
//! API documentation: <https://developers.google.com/books/docs/v1/using>

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{NormalizedRecord, RecordBuilder, SearchQuery, SourceType};
use crate::sources::{decode_item, endpoint, null_as_default, parse_items, Source, SourceError};
use crate::utils::HttpClient;

const GOOGLE_BOOKS_API_BASE: &str = "https://www.googleapis.com/books/v1";

/// Google Books commercial book index
#[derive(Debug, Clone)]
pub struct GoogleBooksSource {
    client: HttpClient,
    base_url: String,
}

impl GoogleBooksSource {
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, GOOGLE_BOOKS_API_BASE)
    }

    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn parse_item(item: Value) -> Result<NormalizedRecord, SourceError> {
        let (volume, raw): (GBVolume, _) = decode_item(item)?;
        let info = volume.volume_info.unwrap_or_default();
        let field = |name: &str| raw.nested_text("volumeInfo", name);

        // publishedDate comes as "2008", "2008-05" or "2008-05-28"
        let year = field("publishedDate")
            .and_then(|d| d.split('-').next().map(str::to_string));

        let isbn = info
            .industry_identifiers
            .into_iter()
            .find_map(|id| id.identifier);

        Ok(
            RecordBuilder::new(SourceType::GoogleBooks, field("title").unwrap_or_default())
                .authors(info.authors)
                .isbn(isbn)
                .publisher(field("publisher"))
                .year(year)
                .url(field("infoLink"))
                .raw(raw)
                .build(),
        )
    }
}

#[async_trait]
impl Source for GoogleBooksSource {
    fn id(&self) -> &str {
        "google"
    }

    fn name(&self) -> &str {
        "Google Books"
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let url = format!(
            "{}?q={}&maxResults={}",
            endpoint(&self.base_url, "volumes"),
            urlencoding::encode(&query.query),
            query.max_results
        );
        tracing::debug!("Google Books search: {}", url);

        let data: GBResponse = self.client.get_json(&url).await?;
        Ok(parse_items(self.id(), data.items, Self::parse_item))
    }
}

// ===== Google Books API Types =====

#[derive(Debug, Deserialize)]
struct GBResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct GBVolume {
    #[serde(rename = "volumeInfo")]
    volume_info: Option<GBVolumeInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct GBVolumeInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    authors: Vec<String>,
    #[serde(rename = "industryIdentifiers", default, deserialize_with = "null_as_default")]
    industry_identifiers: Vec<GBIdentifier>,
}

#[derive(Debug, Deserialize)]
struct GBIdentifier {
    identifier: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_volume_search() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/volumes")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "clean code".into()),
                Matcher::UrlEncoded("maxResults".into(), "5".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"kind": "books#volumes", "totalItems": 2, "items": [
                    {"id": "hjEFCAAAQBAJ", "volumeInfo": {
                        "title": "Clean Code",
                        "authors": ["Robert C. Martin"],
                        "publisher": "Pearson Education",
                        "publishedDate": "2008-08-01",
                        "industryIdentifiers": [
                            {"type": "ISBN_13", "identifier": "9780132350884"},
                            {"type": "ISBN_10", "identifier": "0132350882"}
                        ],
                        "infoLink": "http://books.google.com/books?id=hjEFCAAAQBAJ"
                    }},
                    {"id": "empty"}
                ]}"#,
            )
            .create_async()
            .await;

        let source = GoogleBooksSource::with_base_url(HttpClient::new().unwrap(), server.url());
        let records = source.fetch(&SearchQuery::new("clean code")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 2);

        let book = &records[0];
        assert_eq!(book.source, SourceType::GoogleBooks);
        assert_eq!(book.title, "Clean Code");
        assert_eq!(book.authors, vec!["Robert C. Martin"]);
        assert_eq!(book.isbn.as_deref(), Some("9780132350884"));
        assert_eq!(book.year.as_deref(), Some("2008"));
        assert_eq!(book.publisher.as_deref(), Some("Pearson Education"));
        assert!(book.raw.contains_key("volumeInfo"));

        assert_eq!(records[1].title, "");
        assert_eq!(records[1].isbn, None);
    }

    #[tokio::test]
    async fn test_no_items_key() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/volumes")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"kind": "books#volumes", "totalItems": 0}"#)
            .create_async()
            .await;

        let source = GoogleBooksSource::with_base_url(HttpClient::new().unwrap(), server.url());
        let records = source.fetch(&SearchQuery::new("zzzz")).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/volumes")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>rate limited</html>")
            .create_async()
            .await;

        let source = GoogleBooksSource::with_base_url(HttpClient::new().unwrap(), server.url());
        let query = SearchQuery::new("clean code");
        assert!(matches!(source.fetch(&query).await, Err(SourceError::Parse(_))));
        assert!(source.search(&query).await.is_empty());
    }
}
