//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountService, CareEventRepository, CareRecordsCommand, DashboardQuery, ImageLibrary,
    ImageRepository, ImageStore, NoteRepository, PatientRepository, UserAdministration,
    UserRepository,
};
use crate::domain::{
    AccountServiceImpl, CareRecordsPorts, CareRecordsService, CredentialStore,
    ImageLibraryService, UserAdministrationService,
};

/// Default ceiling for a single upload request body.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountService>,
    pub dashboard: Arc<dyn DashboardQuery>,
    pub care_records: Arc<dyn CareRecordsCommand>,
    pub images: Arc<dyn ImageLibrary>,
    pub admin: Arc<dyn UserAdministration>,
}

/// Driven adapters the domain services are built over.
#[derive(Clone)]
pub struct DrivenPorts {
    pub users: Arc<dyn UserRepository>,
    pub patients: Arc<dyn PatientRepository>,
    pub care_events: Arc<dyn CareEventRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub images: Arc<dyn ImageRepository>,
    pub image_store: Arc<dyn ImageStore>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub dashboard: Arc<dyn DashboardQuery>,
    pub care_records: Arc<dyn CareRecordsCommand>,
    pub images: Arc<dyn ImageLibrary>,
    pub admin: Arc<dyn UserAdministration>,
    pub max_upload_bytes: usize,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            dashboard,
            care_records,
            images,
            admin,
        } = ports;
        Self {
            accounts,
            dashboard,
            care_records,
            images,
            admin,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Wire the domain services over a set of driven adapters.
    pub fn from_driven_ports(
        ports: DrivenPorts,
        credentials: Arc<CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let DrivenPorts {
            users,
            patients,
            care_events,
            notes,
            images,
            image_store,
        } = ports;
        let care_records = Arc::new(CareRecordsService::new(
            CareRecordsPorts {
                patients: patients.clone(),
                care_events,
                notes,
                images: images.clone(),
            },
            clock.clone(),
        ));
        Self::new(HttpStatePorts {
            accounts: Arc::new(AccountServiceImpl::new(users.clone(), credentials)),
            dashboard: care_records.clone(),
            care_records,
            images: Arc::new(ImageLibraryService::new(patients, images, image_store, clock)),
            admin: Arc::new(UserAdministrationService::new(users)),
        })
    }

    /// Override the upload size ceiling.
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
