//! In-memory adapters for every repository port.
//!
//! Used when no database URL is configured and by the HTTP test suites. One
//! [`InMemoryStore`] holds all tables behind a single mutex, so each port
//! call observes and mutates a consistent snapshot. Data is lost on restart.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    CareEventRepository, CareEventRepositoryError, ImageRepository, ImageRepositoryError,
    NoteRepository, NoteRepositoryError, PatientRepository, PatientRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    CareEvent, CareEventId, Image, ImageId, NewCareEvent, NewImage, NewNote, NewUser, Note,
    NoteId, Patient, PatientId, User, UserId, Username,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    patient: Option<Patient>,
    care_events: Vec<CareEvent>,
    notes: Vec<Note>,
    images: Vec<Image>,
    next_user_id: i32,
    next_care_event_id: i32,
    next_note_id: i32,
    next_image_id: i32,
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

/// Process-local storage implementing the user, patient, care event, note
/// and image repositories.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock leaves the tables structurally valid.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut tables = self.tables();
        if tables
            .users
            .iter()
            .any(|existing| existing.username() == user.username())
        {
            return Err(UserPersistenceError::duplicate_username(
                user.username().as_ref(),
            ));
        }
        if tables
            .users
            .iter()
            .any(|existing| existing.email() == user.email())
        {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        if user.password_hash().is_none() {
            return Err(UserPersistenceError::query("user has no password hash"));
        }
        let id = UserId::new(next_id(&mut tables.next_user_id));
        let stored = user.clone().into_user(id);
        tables.users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.tables().users.iter().find(|u| u.id() == id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, UserPersistenceError> {
        Ok(self
            .tables()
            .users
            .iter()
            .any(|u| u.email().as_ref() == email))
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.tables().users.clone())
    }

    async fn count_admins(&self) -> Result<u64, UserPersistenceError> {
        let admins = self
            .tables()
            .users
            .iter()
            .filter(|u| u.role().is_admin())
            .count();
        Ok(admins as u64)
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut tables = self.tables();
        let before = tables.users.len();
        tables.users.retain(|u| u.id() != id);
        Ok(tables.users.len() != before)
    }
}

#[async_trait]
impl PatientRepository for InMemoryStore {
    async fn ensure_primary(&self, default: &Patient) -> Result<Patient, PatientRepositoryError> {
        let mut tables = self.tables();
        Ok(tables.patient.get_or_insert_with(|| default.clone()).clone())
    }
}

#[async_trait]
impl CareEventRepository for InMemoryStore {
    async fn insert(&self, event: &NewCareEvent) -> Result<CareEvent, CareEventRepositoryError> {
        let mut tables = self.tables();
        let id = CareEventId::new(next_id(&mut tables.next_care_event_id));
        let stored = CareEvent::from_new(id, event.clone());
        tables.care_events.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<CareEvent>, CareEventRepositoryError> {
        Ok(self
            .tables()
            .care_events
            .iter()
            .filter(|e| e.patient_id == patient_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NoteRepository for InMemoryStore {
    async fn insert(&self, note: &NewNote) -> Result<Note, NoteRepositoryError> {
        let mut tables = self.tables();
        let id = NoteId::new(next_id(&mut tables.next_note_id));
        let stored = Note::from_new(id, note.clone());
        tables.notes.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_patient(&self, patient_id: PatientId) -> Result<Vec<Note>, NoteRepositoryError> {
        let mut notes: Vec<Note> = self
            .tables()
            .notes
            .iter()
            .filter(|n| n.patient_id == patient_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.get().cmp(&a.id.get()))
        });
        Ok(notes)
    }
}

#[async_trait]
impl ImageRepository for InMemoryStore {
    async fn insert(&self, image: &NewImage) -> Result<Image, ImageRepositoryError> {
        let mut tables = self.tables();
        let id = ImageId::new(next_id(&mut tables.next_image_id));
        let stored = Image::from_new(id, image.clone());
        tables.images.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: ImageId) -> Result<Option<Image>, ImageRepositoryError> {
        Ok(self.tables().images.iter().find(|i| i.id == id).cloned())
    }

    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Image>, ImageRepositoryError> {
        let mut images: Vec<Image> = self
            .tables()
            .images
            .iter()
            .filter(|i| i.patient_id == patient_id)
            .cloned()
            .collect();
        images.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.get().cmp(&a.id.get()))
        });
        Ok(images)
    }

    async fn delete(&self, id: ImageId) -> Result<bool, ImageRepositoryError> {
        let mut tables = self.tables();
        let before = tables.images.len();
        tables.images.retain(|i| i.id != id);
        Ok(tables.images.len() != before)
    }
}

#[cfg(test)]
mod tests;
