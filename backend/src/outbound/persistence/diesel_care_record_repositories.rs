//! PostgreSQL-backed care event, note and image repositories.
//!
//! All three are append-mostly tables keyed by patient. Notes and images are
//! listed newest first with the id as a tiebreaker; care events keep
//! insertion order.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    CareEventRepository, CareEventRepositoryError, ImageRepository, ImageRepositoryError,
    NoteRepository, NoteRepositoryError,
};
use crate::domain::{
    CareEvent, CareEventId, Image, ImageFilename, ImageId, NewCareEvent, NewImage, NewNote, Note,
    NoteId, PatientId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CareEventRow, ImageRow, NewCareEventRow, NewImageRow, NewNoteRow, NoteRow};
use super::pool::{DbPool, PoolError};
use super::schema::{care_events, images, notes};

macro_rules! diesel_error_mappers {
    ($error:ident) => {
        pub(super) fn map_pool_error(error: PoolError) -> $error {
            map_basic_pool_error(error, $error::connection)
        }

        pub(super) fn map_diesel_error(error: diesel::result::Error) -> $error {
            map_basic_diesel_error(error, $error::query, $error::connection)
        }
    };
}

mod care_event_errors {
    use super::*;
    diesel_error_mappers!(CareEventRepositoryError);
}

mod note_errors {
    use super::*;
    diesel_error_mappers!(NoteRepositoryError);
}

mod image_errors {
    use super::*;
    diesel_error_mappers!(ImageRepositoryError);
}

impl From<CareEventRow> for CareEvent {
    fn from(row: CareEventRow) -> Self {
        Self {
            id: CareEventId::new(row.id),
            patient_id: PatientId::new(row.patient_id),
            title: row.title,
            description: row.description,
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: NoteId::new(row.id),
            patient_id: PatientId::new(row.patient_id),
            content: row.content,
            timestamp: row.timestamp,
        }
    }
}

impl From<ImageRow> for Image {
    fn from(row: ImageRow) -> Self {
        Self {
            id: ImageId::new(row.id),
            patient_id: PatientId::new(row.patient_id),
            filename: ImageFilename::from_stored(row.filename),
            timestamp: row.timestamp,
        }
    }
}

/// Diesel-backed implementation of the `CareEventRepository` port.
#[derive(Clone)]
pub struct DieselCareEventRepository {
    pool: DbPool,
}

impl DieselCareEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CareEventRepository for DieselCareEventRepository {
    async fn insert(&self, event: &NewCareEvent) -> Result<CareEvent, CareEventRepositoryError> {
        use care_event_errors::{map_diesel_error, map_pool_error};
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCareEventRow {
            patient_id: event.patient_id.get(),
            title: &event.title,
            description: &event.description,
            start_time: event.start_time,
            end_time: event.end_time,
        };
        let stored: CareEventRow = diesel::insert_into(care_events::table)
            .values(&row)
            .returning(CareEventRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(stored.into())
    }

    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<CareEvent>, CareEventRepositoryError> {
        use care_event_errors::{map_diesel_error, map_pool_error};
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CareEventRow> = care_events::table
            .filter(care_events::patient_id.eq(patient_id.get()))
            .order(care_events::id.asc())
            .select(CareEventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(CareEvent::from).collect())
    }
}

/// Diesel-backed implementation of the `NoteRepository` port.
#[derive(Clone)]
pub struct DieselNoteRepository {
    pool: DbPool,
}

impl DieselNoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepository for DieselNoteRepository {
    async fn insert(&self, note: &NewNote) -> Result<Note, NoteRepositoryError> {
        use note_errors::{map_diesel_error, map_pool_error};
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewNoteRow {
            patient_id: note.patient_id.get(),
            content: &note.content,
            timestamp: note.timestamp,
        };
        let stored: NoteRow = diesel::insert_into(notes::table)
            .values(&row)
            .returning(NoteRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(stored.into())
    }

    async fn list_for_patient(&self, patient_id: PatientId) -> Result<Vec<Note>, NoteRepositoryError> {
        use note_errors::{map_diesel_error, map_pool_error};
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NoteRow> = notes::table
            .filter(notes::patient_id.eq(patient_id.get()))
            .order((notes::timestamp.desc(), notes::id.desc()))
            .select(NoteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Note::from).collect())
    }
}

/// Diesel-backed implementation of the `ImageRepository` port.
#[derive(Clone)]
pub struct DieselImageRepository {
    pool: DbPool,
}

impl DieselImageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRepository for DieselImageRepository {
    async fn insert(&self, image: &NewImage) -> Result<Image, ImageRepositoryError> {
        use image_errors::{map_diesel_error, map_pool_error};
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewImageRow {
            patient_id: image.patient_id.get(),
            filename: image.filename.as_ref(),
            timestamp: image.timestamp,
        };
        let stored: ImageRow = diesel::insert_into(images::table)
            .values(&row)
            .returning(ImageRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(stored.into())
    }

    async fn find_by_id(&self, id: ImageId) -> Result<Option<Image>, ImageRepositoryError> {
        use image_errors::{map_diesel_error, map_pool_error};
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ImageRow> = images::table
            .filter(images::id.eq(id.get()))
            .select(ImageRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Image::from))
    }

    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Image>, ImageRepositoryError> {
        use image_errors::{map_diesel_error, map_pool_error};
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ImageRow> = images::table
            .filter(images::patient_id.eq(patient_id.get()))
            .order((images::timestamp.desc(), images::id.desc()))
            .select(ImageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Image::from).collect())
    }

    async fn delete(&self, id: ImageId) -> Result<bool, ImageRepositoryError> {
        use image_errors::{map_diesel_error, map_pool_error};
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(images::table.filter(images::id.eq(id.get())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
