//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`AccountService`, `DashboardQuery`, `CareRecordsCommand`,
//! `ImageLibrary`, `UserAdministration`) are called by inbound adapters.
//! Driven ports (the repositories and `ImageStore`) are implemented by
//! outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod care_event_repository;
mod care_records_command;
mod dashboard_query;
mod image_library;
mod image_repository;
mod image_store;
mod note_repository;
mod patient_repository;
mod user_administration;
mod user_repository;

pub use account_service::AccountService;
#[cfg(test)]
pub use account_service::MockAccountService;
pub use care_event_repository::{CareEventRepository, CareEventRepositoryError};
#[cfg(test)]
pub use care_event_repository::MockCareEventRepository;
pub use care_records_command::CareRecordsCommand;
#[cfg(test)]
pub use care_records_command::MockCareRecordsCommand;
pub use dashboard_query::{Dashboard, DashboardQuery};
#[cfg(test)]
pub use dashboard_query::MockDashboardQuery;
pub use image_library::{ImageContent, ImageLibrary, ImageUpload};
#[cfg(test)]
pub use image_library::MockImageLibrary;
pub use image_repository::{ImageRepository, ImageRepositoryError};
#[cfg(test)]
pub use image_repository::MockImageRepository;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use note_repository::{NoteRepository, NoteRepositoryError};
#[cfg(test)]
pub use note_repository::MockNoteRepository;
pub use patient_repository::{PatientRepository, PatientRepositoryError};
#[cfg(test)]
pub use patient_repository::MockPatientRepository;
pub use user_administration::{DeleteUserOutcome, UserAdministration, UserSummary};
#[cfg(test)]
pub use user_administration::MockUserAdministration;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
