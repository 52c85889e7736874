//! Conversion of driven-port failures into transport-agnostic domain errors.
//!
//! Connection failures become `ServiceUnavailable`, query failures become
//! `InternalError` (redacted at the HTTP edge), and file storage failures
//! become `StorageFailure`.

use tracing::error;

use super::Error;
use super::ports::{
    CareEventRepositoryError, ImageRepositoryError, ImageStoreError, NoteRepositoryError,
    PatientRepositoryError, UserPersistenceError,
};

macro_rules! map_connection_query {
    ($source:ident, $label:literal) => {
        impl From<$source> for Error {
            fn from(err: $source) -> Self {
                error!(error = %err, repository = $label, "repository failure");
                match err {
                    $source::Connection { message } => {
                        Error::service_unavailable(format!("{} repository unavailable: {message}", $label))
                    }
                    $source::Query { message } => {
                        Error::internal(format!("{} repository error: {message}", $label))
                    }
                }
            }
        }
    };
}

map_connection_query!(PatientRepositoryError, "patient");
map_connection_query!(CareEventRepositoryError, "care event");
map_connection_query!(NoteRepositoryError, "note");
map_connection_query!(ImageRepositoryError, "image");

impl From<UserPersistenceError> for Error {
    fn from(err: UserPersistenceError) -> Self {
        match err {
            UserPersistenceError::DuplicateUsername { .. } => {
                Error::duplicate_username("Please use a different username.")
            }
            UserPersistenceError::DuplicateEmail { .. } => {
                Error::duplicate_email("Please use a different email address.")
            }
            UserPersistenceError::Connection { message } => {
                error!(%message, "user repository connection failure");
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                error!(%message, "user repository query failure");
                Error::internal(format!("user repository error: {message}"))
            }
        }
    }
}

impl From<ImageStoreError> for Error {
    fn from(err: ImageStoreError) -> Self {
        match err {
            ImageStoreError::NotFound { name } => Error::not_found(format!("no image named {name}")),
            ImageStoreError::Io { message } => {
                error!(%message, "image storage failure");
                Error::storage_failure("The image could not be stored.")
            }
        }
    }
}
