//! Structured form validation results.
//!
//! Every input DTO is checked by a pure function returning either the
//! validated value or the full list of field errors. Nothing here knows about
//! rendering.

use std::fmt;

use serde::Serialize;
use serde_json::json;

use super::Error;

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Field absent or blank.
    Required,
    /// Field present but not in the expected shape.
    Invalid,
    /// Field must equal another field and does not.
    Mismatch,
}

/// A rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    field: &'static str,
    kind: FieldErrorKind,
    message: String,
}

impl FieldError {
    /// Build a field error.
    pub fn new(field: &'static str, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a missing required field.
    pub fn required(field: &'static str) -> Self {
        Self::new(field, FieldErrorKind::Required, format!("{field} is required"))
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Category of the failure.
    pub fn kind(&self) -> FieldErrorKind {
        self.kind
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Ordered collection of field errors from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Start an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// True when no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the recorded failures.
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    /// True when `field` has at least one recorded failure.
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(FieldError::message).collect();
        f.write_str(&messages.join("; "))
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        let details = json!({ "fields": errors.as_slice() });
        let message = if errors.is_empty() {
            "invalid form submission".to_owned()
        } else {
            errors.to_string()
        };
        Error::validation_failed(message).with_details(details)
    }
}

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}
