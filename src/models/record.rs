//! Bibliographic record models shared by every provider.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// The provider a record came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "crossref")]
    Crossref,
    #[serde(rename = "openlibrary")]
    OpenLibrary,
    #[serde(rename = "google")]
    GoogleBooks,
    #[serde(rename = "doaj")]
    Doaj,
    #[serde(rename = "doab")]
    Doab,
    #[serde(rename = "semanticscholar")]
    SemanticScholar,
    #[serde(rename = "loc")]
    LibraryOfCongress,
    #[serde(rename = "wipo")]
    Wipo,
    /// Synthetic record built from a URL typed by the user
    #[serde(rename = "manual-url")]
    ManualUrl,
    #[serde(untagged)]
    Other(String),
}

impl SourceType {
    /// Returns the display name of the source
    pub fn name(&self) -> &str {
        match self {
            SourceType::Crossref => "Crossref",
            SourceType::OpenLibrary => "Open Library",
            SourceType::GoogleBooks => "Google Books",
            SourceType::Doaj => "DOAJ",
            SourceType::Doab => "DOAB",
            SourceType::SemanticScholar => "Semantic Scholar",
            SourceType::LibraryOfCongress => "Library of Congress",
            SourceType::Wipo => "WIPO Patentscope",
            SourceType::ManualUrl => "Manual URL",
            SourceType::Other(s) => s,
        }
    }

    /// Returns the provider identifier
    pub fn id(&self) -> &str {
        match self {
            SourceType::Crossref => "crossref",
            SourceType::OpenLibrary => "openlibrary",
            SourceType::GoogleBooks => "google",
            SourceType::Doaj => "doaj",
            SourceType::Doab => "doab",
            SourceType::SemanticScholar => "semanticscholar",
            SourceType::LibraryOfCongress => "loc",
            SourceType::Wipo => "wipo",
            SourceType::ManualUrl => "manual-url",
            SourceType::Other(s) => s,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Provider payload kept verbatim alongside a normalized record.
///
/// Providers disagree on almost every key, so the payload stays a plain JSON
/// object and callers go through the typed accessors below instead of
/// probing `Value`s by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(Map<String, Value>);

impl RawPayload {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value; anything but an object yields an empty payload
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First key in `keys` holding a non-null value
    pub fn first_value(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|k| self.get(k))
    }

    /// Text view of a field (see [`value_text`])
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_text)
    }

    /// First key in `keys` with a usable text view
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.text(k))
    }

    /// Text view of `outer.inner` where `outer` is a nested object
    pub fn nested_text(&self, outer: &str, inner: &str) -> Option<String> {
        self.get(outer)
            .and_then(Value::as_object)
            .and_then(|obj| obj.get(inner))
            .and_then(value_text)
    }

    /// Fold `other` into this payload; keys already present here win
    pub fn merge_missing(&mut self, other: &RawPayload) {
        for (key, value) in &other.0 {
            if !self.0.contains_key(key) {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for RawPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Coerce a raw JSON value into display text.
///
/// Strings are used as-is (empty strings count as absent), numbers are
/// rendered, arrays contribute their first textual element. Objects,
/// booleans and null have no text.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(value_text),
        _ => None,
    }
}

/// A record produced by a single provider adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub source: SourceType,
    pub title: String,
    /// Raw author name strings, in provider order
    pub authors: Vec<String>,
    pub doi: Option<String>,
    pub isbn: Option<String>,
    pub issn: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<String>,
    pub url: Option<String>,
    pub raw: RawPayload,
}

impl NormalizedRecord {
    /// Create a record with only the required fields set
    pub fn new(source: SourceType, title: impl Into<String>) -> Self {
        Self {
            source,
            title: title.into(),
            authors: Vec::new(),
            doi: None,
            isbn: None,
            issn: None,
            publisher: None,
            year: None,
            url: None,
            raw: RawPayload::new(),
        }
    }
}

/// Builder for constructing NormalizedRecord objects
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: NormalizedRecord,
}

impl RecordBuilder {
    pub fn new(source: SourceType, title: impl Into<String>) -> Self {
        Self {
            record: NormalizedRecord::new(source, title),
        }
    }

    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record.authors = authors
            .into_iter()
            .map(Into::into)
            .filter(|a: &String| !a.trim().is_empty())
            .collect();
        self
    }

    pub fn doi(mut self, doi: Option<String>) -> Self {
        self.record.doi = non_empty(doi);
        self
    }

    pub fn isbn(mut self, isbn: Option<String>) -> Self {
        self.record.isbn = non_empty(isbn);
        self
    }

    pub fn issn(mut self, issn: Option<String>) -> Self {
        self.record.issn = non_empty(issn);
        self
    }

    pub fn publisher(mut self, publisher: Option<String>) -> Self {
        self.record.publisher = non_empty(publisher);
        self
    }

    pub fn year(mut self, year: Option<String>) -> Self {
        self.record.year = non_empty(year);
        self
    }

    pub fn url(mut self, url: Option<String>) -> Self {
        self.record.url = non_empty(url);
        self
    }

    pub fn raw(mut self, raw: RawPayload) -> Self {
        self.record.raw = raw;
        self
    }

    pub fn build(self) -> NormalizedRecord {
        self.record
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// One logical work, folded from one or more normalized records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    /// Every provider that contributed to this record
    pub sources: BTreeSet<SourceType>,
    pub title: String,
    pub authors: Vec<String>,
    pub doi: Option<String>,
    pub isbn: Option<String>,
    pub issn: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<String>,
    pub url: Option<String>,
    pub raw: RawPayload,
}

impl MergedRecord {
    /// Comma-separated provider ids, for display
    pub fn source_label(&self) -> String {
        self.sources
            .iter()
            .map(SourceType::id)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<NormalizedRecord> for MergedRecord {
    fn from(record: NormalizedRecord) -> Self {
        Self {
            sources: BTreeSet::from([record.source]),
            title: record.title,
            authors: record.authors,
            doi: record.doi,
            isbn: record.isbn,
            issn: record.issn,
            publisher: record.publisher,
            year: record.year,
            url: record.url,
            raw: record.raw,
        }
    }
}
