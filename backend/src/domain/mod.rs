//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed care-log entities used by the HTTP and
//! persistence layers, together with the services implementing the driving
//! ports. Types validate on construction; serialisation contracts are
//! documented on each type.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Role, CurrentUser: accounts and the session principal.
//! - Patient, CareEvent, Note, Image: the care record.
//! - Services: `AccountServiceImpl`, `CareRecordsService`,
//!   `ImageLibraryService`, `UserAdministrationService`.

pub mod access;
pub mod auth;
pub mod care_event;
pub mod error;
pub mod image;
pub mod note;
pub mod password;
pub mod patient;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod validation;

mod account_service;
mod care_records_service;
mod image_library_service;
mod port_error_mapping;
mod user_administration_service;

pub use self::access::require_admin;
pub use self::account_service::AccountServiceImpl;
pub use self::auth::{LoginCredentials, LoginForm, Registration, RegistrationForm};
pub use self::care_event::{
    CareEvent, CareEventDraft, CareEventForm, CareEventId, NewCareEvent, parse_timestamp,
};
pub use self::care_records_service::{CareRecordsPorts, CareRecordsService};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::image::{
    ALLOWED_IMAGE_EXTENSIONS, Image, ImageFilename, ImageFilenameError, ImageId, NewImage,
    has_allowed_extension,
};
pub use self::image_library_service::ImageLibraryService;
pub use self::note::{NewNote, Note, NoteForm, NoteId};
pub use self::password::{CredentialError, CredentialStore, Password, PasswordHash};
pub use self::patient::{DEFAULT_PATIENT_AGE, DEFAULT_PATIENT_NAME, Patient, PatientId};
pub use self::trace_id::TraceId;
pub use self::user::{
    CurrentUser, Email, NewUser, Role, USERNAME_MAX, User, UserId, UserValidationError, Username,
};
pub use self::user_administration_service::UserAdministrationService;
pub use self::validation::{FieldError, FieldErrorKind, FieldErrors};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use carelog::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
