//! Free-text notes about the patient.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::non_blank;
use super::{FieldError, FieldErrors, PatientId};

/// Identifier of a stored note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NoteId(i32);

impl NoteId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Raw `add_note` form submission.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct NoteForm {
    pub content: Option<String>,
}

impl NoteForm {
    /// Return the trimmed note content, or the field error.
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::new();
        let content = non_blank(self.content.as_deref());
        if content.is_none() {
            errors.push(FieldError::required("content"));
        }
        errors.finish(|| content.unwrap_or_default().to_owned())
    }
}

/// Note awaiting insertion; the timestamp comes from the server clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub patient_id: PatientId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Stored, immutable note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[schema(value_type = i32)]
    pub id: NoteId,
    #[schema(value_type = i32)]
    pub patient_id: PatientId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Note {
    pub fn from_new(id: NoteId, note: NewNote) -> Self {
        Self {
            id,
            patient_id: note.patient_id,
            content: note.content,
            timestamp: note.timestamp,
        }
    }
}
