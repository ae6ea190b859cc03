//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::models::{NormalizedRecord, RecordBuilder, SearchQuery, SourceType};
use crate::sources::{Source, SourceCapabilities, SourceError};

#[derive(Debug, Clone)]
enum MockBehavior {
    Records(Vec<NormalizedRecord>),
    Fail(String),
    Panic,
}

/// A mock source that returns predefined records, fails, stalls, or panics.
#[derive(Debug)]
pub struct MockSource {
    id: String,
    behavior: Mutex<MockBehavior>,
    delay: Option<Duration>,
    calls: Mutex<Vec<SearchQuery>>,
}

impl MockSource {
    /// Create a mock source that returns no records.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            behavior: Mutex::new(MockBehavior::Records(Vec::new())),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Return these records from every search.
    pub fn with_records(self, records: Vec<NormalizedRecord>) -> Self {
        self.set_records(records);
        self
    }

    /// Fail every search with a network error.
    pub fn failing(self, message: impl Into<String>) -> Self {
        *self.behavior.lock().unwrap() = MockBehavior::Fail(message.into());
        self
    }

    /// Panic inside every search.
    pub fn panicking(self) -> Self {
        *self.behavior.lock().unwrap() = MockBehavior::Panic;
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the records returned by later searches.
    pub fn set_records(&self, records: Vec<NormalizedRecord>) {
        *self.behavior.lock().unwrap() = MockBehavior::Records(records);
    }

    /// Queries received so far.
    pub fn calls(&self) -> Vec<SearchQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        self.calls.lock().unwrap().push(query.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            MockBehavior::Records(records) => Ok(records),
            MockBehavior::Fail(message) => Err(SourceError::Network(message)),
            MockBehavior::Panic => panic!("mock source {} panicked", self.id),
        }
    }
}

/// Helper function to create a mock record for testing.
pub fn make_record(source: &str, title: &str) -> NormalizedRecord {
    RecordBuilder::new(SourceType::Other(source.to_string()), title)
        .url(Some(format!("http://example.com/{}", source)))
        .build()
}
