//! Port for note persistence.
use async_trait::async_trait;

use crate::domain::{NewNote, Note, PatientId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by note repository adapters.
    pub enum NoteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "note repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "note repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn insert(&self, note: &NewNote) -> Result<Note, NoteRepositoryError>;

    /// Notes for one patient, newest timestamp first; ties broken by id, highest first.
    async fn list_for_patient(&self, patient_id: PatientId) -> Result<Vec<Note>, NoteRepositoryError>;
}
