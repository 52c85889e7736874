//! Port for image metadata persistence.
use async_trait::async_trait;

use crate::domain::{Image, ImageId, NewImage, PatientId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image repository adapters.
    pub enum ImageRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "image repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "image repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn insert(&self, image: &NewImage) -> Result<Image, ImageRepositoryError>;

    async fn find_by_id(&self, id: ImageId) -> Result<Option<Image>, ImageRepositoryError>;

    /// Images for one patient, newest timestamp first; ties broken by id, highest first.
    async fn list_for_patient(&self, patient_id: PatientId) -> Result<Vec<Image>, ImageRepositoryError>;

    /// Delete the row; `false` when it did not exist.
    async fn delete(&self, id: ImageId) -> Result<bool, ImageRepositoryError>;
}
