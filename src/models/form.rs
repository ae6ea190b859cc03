//! Citation form kinds understood by the form layer.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The citation form a metadata object is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    Book,
    Ebook,
    BookContribution,
    Journal,
    Serial,
    SerialContribution,
    Website,
    Patent,
    ElectronicMessage,
}

impl FormKind {
    pub const ALL: [FormKind; 9] = [
        FormKind::Book,
        FormKind::Ebook,
        FormKind::BookContribution,
        FormKind::Journal,
        FormKind::Serial,
        FormKind::SerialContribution,
        FormKind::Website,
        FormKind::Patent,
        FormKind::ElectronicMessage,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FormKind::Book => "book",
            FormKind::Ebook => "ebook",
            FormKind::BookContribution => "book-contribution",
            FormKind::Journal => "journal",
            FormKind::Serial => "serial",
            FormKind::SerialContribution => "serial-contribution",
            FormKind::Website => "website",
            FormKind::Patent => "patent",
            FormKind::ElectronicMessage => "electronic-message",
        }
    }

    /// Route of the form page the navigation layer opens for this kind.
    ///
    /// Journals share the serial form.
    pub fn route(&self) -> &'static str {
        match self {
            FormKind::Book => "/book-and-monograph",
            FormKind::Ebook => "/E-book-and-monograph",
            FormKind::BookContribution => "/contribution-within-book",
            FormKind::Journal | FormKind::Serial => "/serial",
            FormKind::SerialContribution => "/serial-contributions",
            FormKind::Website => "/websites",
            FormKind::Patent => "/patents",
            FormKind::ElectronicMessage => "/electronic-messages",
        }
    }
}

/// Route used when no form kind is chosen
pub const DEFAULT_ROUTE: &str = "/";

impl std::fmt::Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown form kind: {0}")]
pub struct UnknownFormKind(pub String);

impl FromStr for FormKind {
    type Err = UnknownFormKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FormKind::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted)
            .ok_or_else(|| UnknownFormKind(s.to_string()))
    }
}
