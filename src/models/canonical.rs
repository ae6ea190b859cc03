//! Canonical citation metadata consumed by every citation form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::{RawPayload, SourceType};

/// A parsed author name that keeps the string it was parsed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorName {
    pub original: String,
    pub first_name: String,
    pub last_name: String,
}

/// Superset of the fields any citation form can be pre-filled with.
///
/// Serialized keys are the ones the form layer reads, which is why one of
/// them keeps its historical spelling (`availiabilityAndAccess`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalCitationMetadata {
    // generic
    pub title: String,
    pub authors: Vec<AuthorName>,
    pub doi: Option<String>,
    pub isbn: Option<String>,
    pub issn: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<String>,
    pub url: Option<String>,
    pub source: BTreeSet<SourceType>,
    pub raw: RawPayload,

    // books
    pub title_of_the_item: Option<String>,
    pub edition: Option<String>,
    pub series_title_and_number: Option<String>,
    pub subsidiary_titles: Option<String>,
    pub standard_identifier: Option<String>,
    #[serde(rename = "availiabilityAndAccess")]
    pub availability_and_access: Option<String>,
    pub place: Option<String>,
    pub date_of_publication: Option<String>,

    // serials
    pub title_of_the_serial: Option<String>,
    pub numeration: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,

    // contributions
    pub title_of_the_contribution: Option<String>,
    pub title_of_the_host_item: Option<String>,
    pub range_of_page_numbers_of_the_contribution: Option<String>,

    // websites
    pub page_title: Option<String>,
    pub website_title: Option<String>,

    // patents
    pub patent_number: Option<String>,
    pub date_of_application: Option<String>,
    pub date_of_issuance: Option<String>,

    pub date_of_citation: Option<String>,
}

impl CanonicalCitationMetadata {
    /// Flatten into the string-keyed dictionary the form layer works with
    pub fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // every field serializes to plain JSON, so this arm is unreachable
            _ => Map::new(),
        }
    }
}

/// Canonical keys a citation form pre-fills, in form order
pub const FORM_FIELD_KEYS: [&str; 27] = [
    "title",
    "authors",
    "doi",
    "isbn",
    "publisher",
    "year",
    "url",
    "titleOfTheItem",
    "edition",
    "seriesTitleAndNumber",
    "subsidiaryTitles",
    "standardIdentifier",
    "availiabilityAndAccess",
    "place",
    "dateOfPublication",
    "titleOfTheSerial",
    "numeration",
    "volume",
    "issue",
    "titleOfTheContribution",
    "titleOfTheHostItem",
    "rangeOfPageNumbersOfTheContribution",
    "pageTitle",
    "websiteTitle",
    "patentNumber",
    "dateOfApplication",
    "dateOfIssuance",
];
