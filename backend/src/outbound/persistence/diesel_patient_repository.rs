//! PostgreSQL-backed `PatientRepository`.
//!
//! The primary patient row is created with `INSERT ... ON CONFLICT DO
//! NOTHING` and then read back, so concurrent first requests converge on a
//! single row.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PatientRepository, PatientRepositoryError};
use crate::domain::{Patient, PatientId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::PatientRow;
use super::pool::{DbPool, PoolError};
use super::schema::patients;

/// Diesel-backed implementation of the `PatientRepository` port.
#[derive(Clone)]
pub struct DieselPatientRepository {
    pool: DbPool,
}

impl DieselPatientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PatientRepositoryError {
    map_basic_pool_error(error, PatientRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PatientRepositoryError {
    map_basic_diesel_error(
        error,
        PatientRepositoryError::query,
        PatientRepositoryError::connection,
    )
}

#[async_trait]
impl PatientRepository for DieselPatientRepository {
    async fn ensure_primary(&self, default: &Patient) -> Result<Patient, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = PatientRow {
            id: default.id().get(),
            name: default.name().to_owned(),
            age: default.age(),
        };
        diesel::insert_into(patients::table)
            .values(&row)
            .on_conflict(patients::id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let stored: PatientRow = patients::table
            .filter(patients::id.eq(row.id))
            .select(PatientRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Patient::new(
            PatientId::new(stored.id),
            stored.name,
            stored.age,
        ))
    }
}
