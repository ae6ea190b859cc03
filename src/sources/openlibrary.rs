//! Open Library catalog implementation.
//!
//! Keyword queries go to the search API; ISBN-shaped queries fetch the
//! edition record directly.
//! API documentation: <https://openlibrary.org/developers/api>

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{NormalizedRecord, RawPayload, RecordBuilder, SearchQuery, SourceType};
use crate::sources::{
    decode_item, endpoint, null_as_default, parse_items, Source, SourceCapabilities, SourceError,
};
use crate::utils::HttpClient;

const OPENLIBRARY_API_BASE: &str = "https://openlibrary.org";

/// Open Library catalog
#[derive(Debug, Clone)]
pub struct OpenLibrarySource {
    client: HttpClient,
    base_url: String,
}

impl OpenLibrarySource {
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, OPENLIBRARY_API_BASE)
    }

    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn lookup_isbn(&self, isbn: &str) -> Result<Vec<NormalizedRecord>, SourceError> {
        let url = endpoint(&self.base_url, &format!("isbn/{}.json", isbn));
        tracing::debug!("Open Library ISBN lookup: {}", url);

        let edition: Value = self.client.get_json(&url).await?;
        Ok(vec![self.parse_edition(edition, isbn)?])
    }

    async fn search_catalog(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let url = format!(
            "{}?q={}&limit={}",
            endpoint(&self.base_url, "search.json"),
            urlencoding::encode(&query.query),
            query.max_results
        );
        tracing::debug!("Open Library search: {}", url);

        let data: OLSearchResponse = self.client.get_json(&url).await?;
        Ok(parse_items(self.id(), data.docs, |doc| self.parse_doc(doc)))
    }

    /// Parse a search document
    fn parse_doc(&self, doc: Value) -> Result<NormalizedRecord, SourceError> {
        let (typed, raw): (OLDoc, RawPayload) = decode_item(doc)?;

        Ok(
            RecordBuilder::new(SourceType::OpenLibrary, raw.text("title").unwrap_or_default())
                .authors(typed.author_name)
                .isbn(raw.text("isbn"))
                .publisher(raw.text("publisher"))
                .year(raw.text("first_publish_year"))
                .url(typed.key.map(|k| endpoint(&self.base_url, &k)))
                .raw(raw)
                .build(),
        )
    }

    /// Parse an edition record fetched by ISBN
    fn parse_edition(&self, edition: Value, isbn: &str) -> Result<NormalizedRecord, SourceError> {
        let (typed, raw): (OLDoc, RawPayload) = decode_item(edition)?;

        let edition_isbn = raw
            .first_text(&["isbn_13", "isbn_10", "isbn"])
            .unwrap_or_else(|| isbn.to_string());

        let year = raw
            .first_text(&["first_publish_year", "publish_date"])
            .and_then(|d| trailing_year(&d));

        Ok(
            RecordBuilder::new(SourceType::OpenLibrary, raw.text("title").unwrap_or_default())
                .authors(typed.author_name)
                .isbn(Some(edition_isbn))
                .publisher(raw.first_text(&["publishers", "publisher"]))
                .year(year)
                .url(typed.key.map(|k| endpoint(&self.base_url, &k)))
                .raw(raw)
                .build(),
        )
    }
}

/// Last four-digit run in a free-form date such as "March 4, 2008"
fn trailing_year(date: &str) -> Option<String> {
    date.split(|c: char| !c.is_ascii_digit())
        .filter(|run| run.len() == 4)
        .last()
        .map(str::to_string)
}

#[async_trait]
impl Source for OpenLibrarySource {
    fn id(&self) -> &str {
        "openlibrary"
    }

    fn name(&self) -> &str {
        "Open Library"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH | SourceCapabilities::ISBN_LOOKUP
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        match &query.isbn {
            Some(isbn) => self.lookup_isbn(isbn).await,
            None => self.search_catalog(query).await,
        }
    }
}

// ===== Open Library API Types =====

#[derive(Debug, Deserialize)]
struct OLSearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    docs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct OLDoc {
    #[serde(default, deserialize_with = "null_as_default")]
    author_name: Vec<String>,
    key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_trailing_year() {
        assert_eq!(trailing_year("March 4, 2008").as_deref(), Some("2008"));
        assert_eq!(trailing_year("2019").as_deref(), Some("2019"));
        assert_eq!(trailing_year("n.d."), None);
    }

    #[tokio::test]
    async fn test_keyword_search() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "the hobbit".into()),
                Matcher::UrlEncoded("limit".into(), "5".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"numFound": 1, "docs": [{
                    "key": "/works/OL262758W",
                    "title": "The Hobbit",
                    "author_name": ["J.R.R. Tolkien"],
                    "isbn": ["9780261102217", "0261102214"],
                    "first_publish_year": 1937,
                    "publisher": ["Allen & Unwin"]
                }]}"#,
            )
            .create_async()
            .await;

        let source = OpenLibrarySource::with_base_url(HttpClient::new().unwrap(), server.url());
        let records = source.fetch(&SearchQuery::new("the hobbit")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 1);
        let hobbit = &records[0];
        assert_eq!(hobbit.title, "The Hobbit");
        assert_eq!(hobbit.authors, vec!["J.R.R. Tolkien"]);
        assert_eq!(hobbit.isbn.as_deref(), Some("9780261102217"));
        assert_eq!(hobbit.year.as_deref(), Some("1937"));
        assert_eq!(hobbit.publisher.as_deref(), Some("Allen & Unwin"));
        assert_eq!(
            hobbit.url.as_deref(),
            Some(format!("{}/works/OL262758W", server.url()).as_str())
        );
    }

    #[tokio::test]
    async fn test_isbn_query_fetches_edition() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/isbn/9780134685991.json")
            .with_status(200)
            .with_body(
                r#"{
                    "title": "Effective Java",
                    "publishers": ["Addison-Wesley"],
                    "publish_date": "Dec 18, 2017",
                    "number_of_pages": 412,
                    "key": "/books/OL26834998M"
                }"#,
            )
            .create_async()
            .await;

        let source = OpenLibrarySource::with_base_url(HttpClient::new().unwrap(), server.url());
        let records = source
            .fetch(&SearchQuery::new("978-0-13-468599-1"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Effective Java");
        assert_eq!(records[0].isbn.as_deref(), Some("9780134685991"));
        assert_eq!(records[0].publisher.as_deref(), Some("Addison-Wesley"));
        assert_eq!(records[0].year.as_deref(), Some("2017"));
    }

    #[tokio::test]
    async fn test_unknown_isbn_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Regex(r"^/isbn/".to_string()))
            .with_status(404)
            .create_async()
            .await;

        let source = OpenLibrarySource::with_base_url(HttpClient::new().unwrap(), server.url());
        assert!(source.search(&SearchQuery::new("0-306-40615-X")).await.is_empty());
    }
}
