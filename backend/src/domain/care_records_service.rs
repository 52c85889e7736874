//! Patient dashboard reads and care record creation.
//!
//! Implements [`DashboardQuery`] and [`CareRecordsCommand`]. Every record is
//! attached to the primary patient, created on first use.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    CareEventRepository, CareRecordsCommand, Dashboard, DashboardQuery, ImageRepository,
    NoteRepository, PatientRepository,
};
use crate::domain::{
    CareEvent, CareEventForm, CurrentUser, Error, NewNote, Note, NoteForm, Patient,
};

/// Repositories the care records service reads and writes.
#[derive(Clone)]
pub struct CareRecordsPorts {
    pub patients: Arc<dyn PatientRepository>,
    pub care_events: Arc<dyn CareEventRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub images: Arc<dyn ImageRepository>,
}

/// Dashboard and care record service.
#[derive(Clone)]
pub struct CareRecordsService {
    ports: CareRecordsPorts,
    clock: Arc<dyn Clock>,
}

impl CareRecordsService {
    /// Create a service over the given repositories and clock.
    ///
    /// # Examples
    /// ```
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// use carelog::domain::{CareRecordsPorts, CareRecordsService};
    /// use carelog::outbound::memory::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::default());
    /// let ports = CareRecordsPorts {
    ///     patients: store.clone(),
    ///     care_events: store.clone(),
    ///     notes: store.clone(),
    ///     images: store,
    /// };
    /// let _service = CareRecordsService::new(ports, Arc::new(DefaultClock));
    /// ```
    pub fn new(ports: CareRecordsPorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    async fn primary_patient(&self) -> Result<Patient, Error> {
        Ok(self
            .ports
            .patients
            .ensure_primary(&Patient::primary_default())
            .await?)
    }
}

#[async_trait]
impl DashboardQuery for CareRecordsService {
    async fn dashboard(&self, _user: &CurrentUser) -> Result<Dashboard, Error> {
        let patient = self.primary_patient().await?;
        let care_events = self.ports.care_events.list_for_patient(patient.id()).await?;
        let notes = self.ports.notes.list_for_patient(patient.id()).await?;
        let images = self.ports.images.list_for_patient(patient.id()).await?;
        Ok(Dashboard {
            patient,
            care_events,
            notes,
            images,
        })
    }
}

#[async_trait]
impl CareRecordsCommand for CareRecordsService {
    async fn add_care_event(
        &self,
        user: &CurrentUser,
        form: CareEventForm,
    ) -> Result<CareEvent, Error> {
        let draft = form.validate()?;
        let patient = self.primary_patient().await?;
        let event = self
            .ports
            .care_events
            .insert(&draft.for_patient(patient.id()))
            .await?;
        info!(user_id = %user.id(), care_event_id = event.id.get(), "care event added");
        Ok(event)
    }

    async fn add_note(&self, user: &CurrentUser, form: NoteForm) -> Result<Note, Error> {
        let content = form.validate()?;
        let patient = self.primary_patient().await?;
        let note = self
            .ports
            .notes
            .insert(&NewNote {
                patient_id: patient.id(),
                content,
                timestamp: self.clock.utc(),
            })
            .await?;
        info!(user_id = %user.id(), note_id = note.id.get(), "note added");
        Ok(note)
    }
}
