//! # Error Reports
//!
//! Field-keyed collection of formatted violation messages for one
//! validation call.
//!
//! Fields keep the order in which their first message arrived, and messages
//! keep the order of the violations they came from, so the JSON form is
//! byte-identical for identical input.

use crate::catalog::MessageCatalog;
use crate::engine::Violation;
use crate::json::to_json;
use crate::shape::RecordShape;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Messages per external field name
///
/// Serializes as a JSON object of string arrays:
///
/// ```json
/// {"username":["minimum field length is 6"],"email":["field value must be a valid email"]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport {
    fields: IndexMap<String, Vec<String>>,
}

impl ErrorReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a field, creating the field on first use
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Messages for one field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Check if a field has any message
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Field names in first-occurrence order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over fields and their messages
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Number of fields with at least one message
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the report has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert to a compact JSON object
    #[must_use]
    pub fn to_json(&self) -> String {
        to_json(self).unwrap_or_else(|e| format!("error marshalling validation error: {e}"))
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl std::error::Error for ErrorReport {}

/// Build a report from engine violations
///
/// A violation naming a field the shape does not declare is logged and
/// dropped; the remaining violations are still aggregated.
pub fn aggregate(
    shape: &RecordShape,
    violations: &[Violation],
    catalog: &MessageCatalog,
) -> ErrorReport {
    let mut report = ErrorReport::new();
    for violation in violations {
        let Some(field) = shape.external_name(&violation.field) else {
            warn!(
                record = shape.name(),
                field = %violation.field,
                tag = %violation.tag,
                "violation names a field absent from the record shape, skipping"
            );
            continue;
        };
        report.push(field, catalog.resolve(violation));
    }
    report
}
