//! Application state: the metadata currently applied to the citation forms.
//!
//! The state is an ordinary owned value. Readers borrow it, and the only way
//! to change the active metadata is [`ApplicationState::apply_metadata`] (or
//! its generation-checked variant), which replaces it wholesale.

use chrono::Utc;
use serde_json::{Map, Value};

use crate::models::{CanonicalCitationMetadata, FormKind};

/// Errors raised by state updates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Results belong to a query that has since been superseded
    #[error("Stale query generation {requested}: current generation is {current}")]
    StaleQuery { requested: u64, current: u64 },
}

/// Token identifying one query; later queries get larger tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryGeneration(u64);

impl QueryGeneration {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Metadata visible to the form layer, plus the chosen form and a preview
#[derive(Debug, Clone, Default)]
pub struct ApplicationState {
    metadata: Option<Map<String, Value>>,
    active_form: Option<FormKind>,
    preview: Option<CanonicalCitationMetadata>,
    generation: u64,
}

impl ApplicationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active metadata, if any has been applied
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }

    pub fn active_form(&self) -> Option<FormKind> {
        self.active_form
    }

    /// Record shown to the user but not applied yet
    pub fn preview(&self) -> Option<&CanonicalCitationMetadata> {
        self.preview.as_ref()
    }

    pub fn set_preview(&mut self, canonical: CanonicalCitationMetadata) {
        self.preview = Some(canonical);
    }

    /// Generation of the most recently started query
    pub fn generation(&self) -> QueryGeneration {
        QueryGeneration(self.generation)
    }

    /// Start a new query; results of earlier queries become stale
    pub fn begin_query(&mut self) -> QueryGeneration {
        self.generation += 1;
        tracing::debug!("Query generation {}", self.generation);
        QueryGeneration(self.generation)
    }

    /// Make `canonical` the active metadata.
    ///
    /// With `fields`, only those keys are copied (`authors` included when
    /// listed); without, every canonical field is. `dateOfCitation` is set
    /// to today unless the payload already carries one, and `url` and
    /// `availiabilityAndAccess` are backfilled when the payload allows. The
    /// previous metadata, form choice and preview are discarded.
    pub fn apply_metadata(
        &mut self,
        canonical: &CanonicalCitationMetadata,
        fields: Option<&[&str]>,
        form: Option<FormKind>,
    ) {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        self.apply_metadata_dated(canonical, fields, form, &today);
    }

    /// Like [`apply_metadata`](Self::apply_metadata), but only when
    /// `generation` is still the latest query
    pub fn apply_metadata_for(
        &mut self,
        generation: QueryGeneration,
        canonical: &CanonicalCitationMetadata,
        fields: Option<&[&str]>,
        form: Option<FormKind>,
    ) -> Result<(), StateError> {
        if generation.0 != self.generation {
            tracing::warn!(
                "Discarding results of query {}; query {} is current",
                generation.0,
                self.generation
            );
            return Err(StateError::StaleQuery {
                requested: generation.0,
                current: self.generation,
            });
        }

        self.apply_metadata(canonical, fields, form);
        Ok(())
    }

    pub(crate) fn apply_metadata_dated(
        &mut self,
        canonical: &CanonicalCitationMetadata,
        fields: Option<&[&str]>,
        form: Option<FormKind>,
        today: &str,
    ) {
        let payload = canonical.to_fields();

        let mut out = match fields {
            None => payload.clone(),
            Some(keys) => keys
                .iter()
                .filter_map(|k| payload.get(*k).map(|v| (k.to_string(), v.clone())))
                .collect(),
        };

        if is_blank(out.get("dateOfCitation")) {
            let date = payload
                .get("dateOfCitation")
                .filter(|v| !is_blank(Some(*v)))
                .cloned()
                .unwrap_or_else(|| Value::String(today.to_string()));
            out.insert("dateOfCitation".to_string(), date);
        }

        if is_blank(out.get("url")) {
            let url = canonical
                .url
                .clone()
                .or_else(|| canonical.raw.text("url"));
            if let Some(url) = url {
                out.insert("url".to_string(), Value::String(url));
            }
        }

        if is_blank(out.get("availiabilityAndAccess")) {
            if let Some(access) = canonical.url.clone().or_else(|| canonical.doi.clone()) {
                out.insert("availiabilityAndAccess".to_string(), Value::String(access));
            }
        }

        tracing::debug!(
            "Applied {} metadata fields (form: {})",
            out.len(),
            form.map(|f| f.id()).unwrap_or("none")
        );

        self.metadata = Some(out);
        self.active_form = form;
        self.preview = None;
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}
