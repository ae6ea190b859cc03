//! Core data models for bibliographic records and citation metadata.

mod canonical;
mod form;
mod record;
mod search;

pub use canonical::{AuthorName, CanonicalCitationMetadata, FORM_FIELD_KEYS};
pub use form::{FormKind, UnknownFormKind, DEFAULT_ROUTE};
pub use record::{
    value_text, MergedRecord, NormalizedRecord, RawPayload, RecordBuilder, SourceType,
};
pub use search::{SearchQuery, DEFAULT_MAX_RESULTS};
