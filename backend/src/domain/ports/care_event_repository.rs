//! Port for care event persistence.
use async_trait::async_trait;

use crate::domain::{CareEvent, NewCareEvent, PatientId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by care event repository adapters.
    pub enum CareEventRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "care event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "care event repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CareEventRepository: Send + Sync {
    /// Insert a care event and return it with its id.
    async fn insert(&self, event: &NewCareEvent) -> Result<CareEvent, CareEventRepositoryError>;

    /// Events for one patient in insertion order.
    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<CareEvent>, CareEventRepositoryError>;
}
