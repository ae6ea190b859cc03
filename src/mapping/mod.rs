//! Projection of merged records into canonical citation metadata.
//!
//! [`map_to_canonical`] is pure and total: every canonical field resolves
//! through its fallback chain over the record and its raw payload, or is
//! left empty. It can be called on any single record, including one that
//! never went through a search.

mod author;
mod date;

pub use author::parse_author_name;
pub use date::flatten_date;

use crate::models::{CanonicalCitationMetadata, MergedRecord, RawPayload};

/// Map a merged record to the canonical field dictionary
pub fn map_to_canonical(record: &MergedRecord) -> CanonicalCitationMetadata {
    let raw = &record.raw;
    let title = record.title.clone();
    let has_title = !title.trim().is_empty();
    let title_field = || has_title.then(|| title.clone());

    CanonicalCitationMetadata {
        authors: record.authors.iter().map(|a| parse_author_name(a)).collect(),
        doi: record.doi.clone(),
        isbn: record.isbn.clone(),
        issn: record.issn.clone(),
        publisher: record.publisher.clone(),
        year: record.year.clone(),
        url: record.url.clone(),
        source: record.sources.clone(),

        title_of_the_item: title_field(),
        edition: raw.first_text(&["edition", "editions", "edition_name"]),
        series_title_and_number: raw.first_text(&["series", "series-title"]),
        subsidiary_titles: raw.text("subtitle"),
        standard_identifier: record.isbn.clone().or_else(|| record.doi.clone()),
        availability_and_access: record.url.clone().or_else(|| record.doi.clone()),
        place: raw
            .first_text(&["place", "publisher-place", "publish_places"])
            .or_else(|| raw.nested_text("address", "city")),
        date_of_publication: first_date(
            raw,
            &["publishedDate", "published-print", "issued", "publish_date"],
        )
        .or_else(|| {
            raw.get("volumeInfo")
                .and_then(|info| info.get("publishedDate"))
                .and_then(flatten_date)
        })
        .or_else(|| record.year.clone()),

        title_of_the_serial: title_field(),
        numeration: raw.first_text(&["volume", "issue", "numeration"]),
        volume: raw
            .text("volume")
            .or_else(|| raw.nested_text("volumeInfo", "volume")),
        issue: raw
            .text("issue")
            .or_else(|| raw.nested_text("volumeInfo", "issue")),

        title_of_the_contribution: title_field(),
        title_of_the_host_item: raw.first_text(&[
            "container-title",
            "containerTitle",
            "host-title",
            "source",
        ]),
        range_of_page_numbers_of_the_contribution: raw.first_text(&["page", "pages", "pagination"]),

        page_title: raw.text("title"),
        website_title: raw.text("source"),

        patent_number: raw.first_text(&["patentNumber", "patent_number", "publicationNumber"]),
        date_of_application: first_date(raw, &["applicationDate", "application-date"]),
        date_of_issuance: first_date(raw, &["publicationDate", "issued"]),

        date_of_citation: None,

        title,
        raw: raw.clone(),
    }
}

/// First key whose value flattens to a date
fn first_date(raw: &RawPayload, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| raw.get(k).and_then(flatten_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NormalizedRecord, RecordBuilder, SourceType};
    use serde_json::{json, Value};

    fn crossref_article() -> MergedRecord {
        let raw = RawPayload::from_value(json!({
            "DOI": "10.1038/nature14539",
            "title": ["Deep learning"],
            "container-title": ["Nature"],
            "volume": "521",
            "issue": "7553",
            "page": "436-444",
            "published-print": {"date-parts": [[2015, 5, 28]]},
            "issued": {"date-parts": [[2015, 5, 27]]}
        }));

        RecordBuilder::new(SourceType::Crossref, "Deep learning")
            .authors(["LeCun, Yann", "Yoshua Bengio", "Hinton"])
            .doi(Some("10.1038/nature14539".into()))
            .year(Some("2015".into()))
            .url(Some("https://doi.org/10.1038/nature14539".into()))
            .raw(raw)
            .build()
            .into()
    }

    #[test]
    fn test_article_mapping() {
        let canonical = map_to_canonical(&crossref_article());

        assert_eq!(canonical.title, "Deep learning");
        assert_eq!(canonical.title_of_the_contribution.as_deref(), Some("Deep learning"));
        assert_eq!(canonical.title_of_the_host_item.as_deref(), Some("Nature"));
        assert_eq!(canonical.volume.as_deref(), Some("521"));
        assert_eq!(canonical.issue.as_deref(), Some("7553"));
        assert_eq!(canonical.numeration.as_deref(), Some("521"));
        assert_eq!(
            canonical.range_of_page_numbers_of_the_contribution.as_deref(),
            Some("436-444")
        );
        assert_eq!(canonical.date_of_publication.as_deref(), Some("2015-05-28"));
        assert_eq!(canonical.date_of_issuance.as_deref(), Some("2015-05-27"));
        assert_eq!(canonical.standard_identifier.as_deref(), Some("10.1038/nature14539"));
        assert_eq!(
            canonical.availability_and_access.as_deref(),
            Some("https://doi.org/10.1038/nature14539")
        );
        assert_eq!(canonical.date_of_citation, None);

        let names: Vec<(&str, &str)> = canonical
            .authors
            .iter()
            .map(|a| (a.first_name.as_str(), a.last_name.as_str()))
            .collect();
        assert_eq!(names, vec![("Yann", "LeCun"), ("Yoshua", "Bengio"), ("", "Hinton")]);
    }

    #[test]
    fn test_book_mapping_from_google_volume() {
        let raw = RawPayload::from_value(json!({
            "volumeInfo": {"title": "Clean Code", "publishedDate": "2008-08-01", "volume": "1"}
        }));
        let record: MergedRecord = RecordBuilder::new(SourceType::GoogleBooks, "Clean Code")
            .isbn(Some("9780132350884".into()))
            .doi(Some("10.5555/clean".into()))
            .raw(raw)
            .build()
            .into();

        let canonical = map_to_canonical(&record);
        assert_eq!(canonical.standard_identifier.as_deref(), Some("9780132350884"));
        assert_eq!(canonical.date_of_publication.as_deref(), Some("2008-08-01"));
        assert_eq!(canonical.volume.as_deref(), Some("1"));
        assert_eq!(canonical.availability_and_access.as_deref(), Some("10.5555/clean"));
        assert_eq!(canonical.page_title, None);
    }

    #[test]
    fn test_date_falls_back_to_year() {
        let record: MergedRecord = RecordBuilder::new(SourceType::OpenLibrary, "The Hobbit")
            .year(Some("1937".into()))
            .build()
            .into();
        assert_eq!(map_to_canonical(&record).date_of_publication.as_deref(), Some("1937"));
    }

    #[test]
    fn test_empty_record_is_total() {
        let record = MergedRecord::from(NormalizedRecord::new(SourceType::Wipo, ""));
        let canonical = map_to_canonical(&record);

        assert_eq!(canonical.title, "");
        assert_eq!(canonical.title_of_the_item, None);
        assert!(canonical.authors.is_empty());
        assert_eq!(canonical.standard_identifier, None);
        assert_eq!(canonical.place, None);
        assert_eq!(canonical.date_of_publication, None);
    }

    #[test]
    fn test_malformed_nested_fields_resolve_to_none() {
        let raw = RawPayload::from_value(json!({
            "volumeInfo": "not an object",
            "address": ["Berlin"],
            "issued": {"date-parts": "2020"},
            "applicationDate": {"unexpected": true}
        }));
        let record: MergedRecord = RecordBuilder::new(SourceType::Wipo, "Widget")
            .raw(raw)
            .build()
            .into();

        let canonical = map_to_canonical(&record);
        assert_eq!(canonical.volume, None);
        assert_eq!(canonical.place, None);
        assert_eq!(canonical.date_of_issuance, None);
        assert_eq!(canonical.date_of_application, None);
    }

    #[test]
    fn test_patent_and_website_fields() {
        let raw = RawPayload::from_value(json!({
            "title": "Tandem solar cell",
            "source": "Patentscope",
            "publicationNumber": "WO2020123456",
            "applicationDate": "2019-06-01",
            "publicationDate": {"date-parts": [[2020, 6, 18]]},
            "publish_places": ["Geneva"]
        }));
        let record: MergedRecord = RecordBuilder::new(SourceType::Wipo, "Tandem solar cell")
            .raw(raw)
            .build()
            .into();

        let canonical = map_to_canonical(&record);
        assert_eq!(canonical.patent_number.as_deref(), Some("WO2020123456"));
        assert_eq!(canonical.date_of_application.as_deref(), Some("2019-06-01"));
        assert_eq!(canonical.date_of_issuance.as_deref(), Some("2020-06-18"));
        assert_eq!(canonical.page_title.as_deref(), Some("Tandem solar cell"));
        assert_eq!(canonical.website_title.as_deref(), Some("Patentscope"));
        assert_eq!(canonical.title_of_the_host_item.as_deref(), Some("Patentscope"));
        assert_eq!(canonical.place.as_deref(), Some("Geneva"));
    }

    #[test]
    fn test_serialized_keys() {
        let fields = map_to_canonical(&crossref_article()).to_fields();
        assert!(fields.contains_key("availiabilityAndAccess"));
        assert!(fields.contains_key("rangeOfPageNumbersOfTheContribution"));
        assert_eq!(fields["source"], json!(["crossref"]));
        assert_eq!(fields["authors"][0]["lastName"], json!("LeCun"));
        assert_eq!(fields["dateOfCitation"], Value::Null);
    }
}
