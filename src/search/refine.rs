//! Narrowing merged results down to what a search box shows.

use crate::models::{MergedRecord, NormalizedRecord, SourceType};
use crate::utils::url_candidate;

/// Results shown when no limit is configured
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

/// Pick the records to show for `query`.
///
/// Records mentioning the query (title, DOI, ISBN, URL, authors or provider
/// id) are preferred; if none do, all records are kept. When the query looks
/// like a web address a `manual-url` record pointing at it comes first, and
/// records with the same URL are dropped. At most `limit` records remain.
pub fn refine_results(query: &str, records: &[MergedRecord], limit: usize) -> Vec<MergedRecord> {
    let query = query.trim();
    let needle = query.to_lowercase();

    let matching: Vec<&MergedRecord> = records.iter().filter(|r| mentions(r, &needle)).collect();
    let base: Vec<&MergedRecord> = if matching.is_empty() {
        records.iter().collect()
    } else {
        matching
    };

    let Some(address) = url_candidate(query) else {
        return base.into_iter().take(limit).cloned().collect();
    };

    let has_scheme = {
        let lower = query.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    };
    let typed_url = if has_scheme {
        query.to_string()
    } else {
        format!("http://{}", query)
    };
    let title = address
        .host_str()
        .map(|h| h.trim_start_matches("www.").to_string())
        .unwrap_or_else(|| query.to_string());

    let mut manual = NormalizedRecord::new(SourceType::ManualUrl, title);
    manual.url = Some(typed_url);

    std::iter::once(MergedRecord::from(manual))
        .chain(
            base.into_iter()
                .filter(|r| !same_address(r.url.as_deref(), &address))
                .cloned(),
        )
        .take(limit)
        .collect()
}

fn mentions(record: &MergedRecord, needle: &str) -> bool {
    let contains = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(needle));

    contains(Some(record.title.as_str()))
        || contains(record.doi.as_deref())
        || contains(record.isbn.as_deref())
        || contains(record.url.as_deref())
        || record.authors.join(" ").to_lowercase().contains(needle)
        || record.sources.iter().any(|s| s.id().contains(needle))
}

fn same_address(url: Option<&str>, address: &url::Url) -> bool {
    let Some(url) = url else {
        return false;
    };
    let absolute = if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    };
    match url::Url::parse(&absolute) {
        Ok(parsed) => &parsed == address,
        Err(_) => url == address.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, url: Option<&str>) -> MergedRecord {
        let mut r = NormalizedRecord::new(SourceType::Crossref, title);
        r.url = url.map(str::to_string);
        r.into()
    }

    #[test]
    fn test_prefers_matching_records() {
        let records = vec![
            record("Rust Programming", None),
            record("Unrelated", None),
            record("Programming Rust", None),
        ];
        let refined = refine_results("rust", &records, DEFAULT_DISPLAY_LIMIT);
        let titles: Vec<&str> = refined.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Rust Programming", "Programming Rust"]);
    }

    #[test]
    fn test_falls_back_to_all_records() {
        let records = vec![record("Alpha", None), record("Beta", None)];
        assert_eq!(refine_results("gamma", &records, DEFAULT_DISPLAY_LIMIT).len(), 2);
    }

    #[test]
    fn test_matches_source_id_and_authors() {
        let mut by_author = record("Untitled Work", None);
        by_author.authors = vec!["Grace Hopper".into()];
        let records = vec![record("Other", None), by_author];

        let refined = refine_results("hopper", &records, DEFAULT_DISPLAY_LIMIT);
        assert_eq!(refined.len(), 1);
        assert_eq!(refined[0].title, "Untitled Work");

        assert_eq!(refine_results("crossref", &records, DEFAULT_DISPLAY_LIMIT).len(), 2);
    }

    #[test]
    fn test_url_query_prepends_manual_record() {
        let records = vec![
            record("Example Domain", Some("http://www.example.com/about")),
            record("Team Page", Some("https://www.example.com/about/team")),
            record("Something", Some("https://other.org")),
        ];
        let refined = refine_results("www.example.com/about", &records, DEFAULT_DISPLAY_LIMIT);

        assert_eq!(refined[0].title, "example.com");
        assert_eq!(refined[0].url.as_deref(), Some("http://www.example.com/about"));
        assert!(refined[0].sources.contains(&SourceType::ManualUrl));
        // the identical URL is dropped
        assert!(refined
            .iter()
            .skip(1)
            .all(|r| r.url.as_deref() != Some("http://www.example.com/about")));
        assert_eq!(refined.len(), 2);
        assert_eq!(refined[1].title, "Team Page");
    }

    #[test]
    fn test_limit() {
        let records: Vec<MergedRecord> = (0..20)
            .map(|i| record(&format!("Book {}", i), None))
            .collect();
        assert_eq!(refine_results("book", &records, 10).len(), 10);
        assert_eq!(refine_results("https://example.com", &records, 3).len(), 3);
    }
}
