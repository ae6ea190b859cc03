//! Identity resolution and merging of records across providers.

use std::collections::HashSet;

use crate::models::{MergedRecord, NormalizedRecord};

/// Default Jaccard threshold above which two titles describe the same work
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.65;

/// Lower-case a title and split it on runs of non-alphanumeric characters
pub fn tokenize_title(title: &str) -> HashSet<String> {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of two token sets; two empty sets score 0
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Fold records describing the same work into merged records.
///
/// Records are processed in order and the output keeps the order in which
/// each work was first seen. An incoming record joins the first existing
/// entry with the same DOI, else the same ISBN (both case-insensitive), else
/// the first entry whose title similarity exceeds `threshold`.
pub fn merge_records(records: Vec<NormalizedRecord>, threshold: f64) -> Vec<MergedRecord> {
    let mut merged: Vec<MergedRecord> = Vec::new();

    for record in records {
        match find_match(&merged, &record, threshold) {
            Some(idx) => {
                tracing::debug!(
                    "Merging {} record into \"{}\"",
                    record.source,
                    merged[idx].title
                );
                absorb(&mut merged[idx], record);
            }
            None => merged.push(MergedRecord::from(record)),
        }
    }

    merged
}

fn same_identifier(a: Option<&String>, b: Option<&String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a.eq_ignore_ascii_case(b))
}

fn find_match(merged: &[MergedRecord], record: &NormalizedRecord, threshold: f64) -> Option<usize> {
    if record.doi.is_some() {
        if let Some(idx) = merged
            .iter()
            .position(|m| same_identifier(m.doi.as_ref(), record.doi.as_ref()))
        {
            return Some(idx);
        }
    }

    if record.isbn.is_some() {
        if let Some(idx) = merged
            .iter()
            .position(|m| same_identifier(m.isbn.as_ref(), record.isbn.as_ref()))
        {
            return Some(idx);
        }
    }

    let tokens = tokenize_title(&record.title);
    merged
        .iter()
        .position(|m| jaccard_similarity(&tokens, &tokenize_title(&m.title)) > threshold)
}

/// Merge `incoming` into `existing`; values already on `existing` win
fn absorb(existing: &mut MergedRecord, incoming: NormalizedRecord) {
    fn fill(slot: &mut Option<String>, value: Option<String>) {
        if slot.is_none() {
            *slot = value;
        }
    }

    if existing.title.trim().is_empty() {
        existing.title = incoming.title;
    }
    fill(&mut existing.doi, incoming.doi);
    fill(&mut existing.isbn, incoming.isbn);
    fill(&mut existing.issn, incoming.issn);
    fill(&mut existing.url, incoming.url);
    fill(&mut existing.publisher, incoming.publisher);
    fill(&mut existing.year, incoming.year);

    for author in incoming.authors {
        if !existing.authors.contains(&author) {
            existing.authors.push(author);
        }
    }

    existing.sources.insert(incoming.source);
    existing.raw.merge_missing(&incoming.raw);
}
