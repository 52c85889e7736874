//! Port for the single patient row.
use async_trait::async_trait;

use crate::domain::Patient;

use super::define_port_error;

define_port_error! {
    /// Errors raised by patient repository adapters.
    pub enum PatientRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "patient repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "patient repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Return the primary patient, inserting `default` first when absent.
    ///
    /// Concurrent callers must all observe the same row.
    async fn ensure_primary(&self, default: &Patient) -> Result<Patient, PatientRepositoryError>;
}
