//! Driving port for creating care events and notes.

use async_trait::async_trait;

use crate::domain::{CareEvent, CareEventForm, CurrentUser, Error, Note, NoteForm};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CareRecordsCommand: Send + Sync {
    /// Validate and store a care event for the patient.
    ///
    /// # Errors
    /// `ValidationFailed` listing every bad field; nothing is stored.
    async fn add_care_event(
        &self,
        user: &CurrentUser,
        form: CareEventForm,
    ) -> Result<CareEvent, Error>;

    /// Validate and store a note stamped with the current time.
    async fn add_note(&self, user: &CurrentUser, form: NoteForm) -> Result<Note, Error>;
}
