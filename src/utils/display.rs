//! Terminal display utilities for CLI output.
//!
//! Handles terminal width detection, unicode-aware truncation and the
//! tables printed by the `citation-finder` binary.

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use serde_json::{Map, Value};
use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use terminal_size::terminal_size;
use unicode_width::UnicodeWidthChar;

use crate::models::{value_text, MergedRecord};

/// Default width when terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

#[derive(Debug, Clone)]
struct Terminal {
    width: usize,
    is_tty: bool,
}

static TERMINAL_INFO: OnceLock<Terminal> = OnceLock::new();

fn terminal_info() -> &'static Terminal {
    TERMINAL_INFO.get_or_init(|| Terminal {
        width: terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_WIDTH),
        is_tty: io::stdout().is_terminal(),
    })
}

/// Get the current terminal width in characters.
#[inline]
pub fn terminal_width() -> usize {
    terminal_info().width
}

/// Check if stdout is a terminal.
#[inline]
pub fn is_terminal() -> bool {
    terminal_info().is_tty
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(1)
}

/// Truncate text to fit within the specified width using unicode-aware truncation.
///
/// ```
/// use citation_finder::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    let total_width: usize = text.chars().map(char_width).sum();
    if total_width <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let truncated: String = text
        .chars()
        .take_while(|c| {
            used += char_width(*c);
            used <= budget
        })
        .collect();

    format!("{}...", truncated)
}

/// Truncate at the last word boundary that fits, falling back to
/// [`truncate_with_ellipsis`] when a single word is already too wide.
pub fn truncate_at_word(text: &str, max_width: usize) -> String {
    let total_width: usize = text.chars().map(char_width).sum();
    if total_width <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let mut cut = None;
    for (idx, c) in text.char_indices() {
        if c == ' ' {
            cut = Some(idx);
        }
        used += char_width(c);
        if used > budget {
            break;
        }
    }

    match cut {
        Some(idx) if idx > 0 => format!("{}...", text[..idx].trim_end()),
        _ => truncate_with_ellipsis(text, max_width),
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Table of merged search results, numbered from 1 for `--select`.
pub fn records_table(records: &[MergedRecord], width: usize) -> Table {
    let title_width = (width / 2).max(30);
    let authors_width = (width / 4).max(20);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width.min(u16::MAX as usize) as u16)
        .set_header(vec!["#", "Title", "Authors", "Year", "Identifier", "Sources"]);

    for (i, record) in records.iter().enumerate() {
        let identifier = record
            .doi
            .as_deref()
            .or(record.isbn.as_deref())
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(truncate_at_word(&record.title, title_width)).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&record.authors.join("; "), authors_width)),
            Cell::new(record.year.as_deref().unwrap_or_default()),
            Cell::new(identifier),
            Cell::new(record.source_label()),
        ]);
    }

    table
}

/// Two-column table of the populated fields in a metadata map.
pub fn fields_table(fields: &Map<String, Value>, width: usize) -> Table {
    let value_width = width.saturating_sub(40).max(20);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Field", "Value"]);

    for (key, value) in fields {
        if key == "raw" {
            continue;
        }
        let text = match value {
            Value::Null => continue,
            Value::Array(items) if items.iter().all(Value::is_object) => items
                .iter()
                .filter_map(|a| a.get("original").and_then(value_text))
                .collect::<Vec<_>>()
                .join("; "),
            other => value_text(other).unwrap_or_else(|| other.to_string()),
        };
        if text.is_empty() {
            continue;
        }
        table.add_row(vec![
            Cell::new(key).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&text, value_width)),
        ]);
    }

    table
}
