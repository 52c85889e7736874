//! Builders selecting the driven adapters behind the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use carelog::domain::CredentialStore;
use carelog::inbound::http::state::{DrivenPorts, HttpState};
use carelog::outbound::memory::InMemoryStore;
use carelog::outbound::persistence::{
    DbPool, DieselCareEventRepository, DieselImageRepository, DieselNoteRepository,
    DieselPatientRepository, DieselUserRepository,
};
use carelog::outbound::storage::CapStdImageStore;

use super::ServerConfig;

fn diesel_ports(pool: &DbPool, image_store: Arc<CapStdImageStore>) -> DrivenPorts {
    DrivenPorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        patients: Arc::new(DieselPatientRepository::new(pool.clone())),
        care_events: Arc::new(DieselCareEventRepository::new(pool.clone())),
        notes: Arc::new(DieselNoteRepository::new(pool.clone())),
        images: Arc::new(DieselImageRepository::new(pool.clone())),
        image_store,
    }
}

fn memory_ports(image_store: Arc<CapStdImageStore>) -> DrivenPorts {
    let store = Arc::new(InMemoryStore::new());
    DrivenPorts {
        users: store.clone(),
        patients: store.clone(),
        care_events: store.clone(),
        notes: store.clone(),
        images: store,
        image_store,
    }
}

/// Build the shared HTTP state.
///
/// Repositories are Diesel-backed when the configuration carries a pool and
/// process-local otherwise; records then vanish on restart.
///
/// # Errors
/// Propagates [`std::io::Error`] when the upload directory cannot be created
/// or opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let image_store = Arc::new(CapStdImageStore::open(&config.upload_dir)?);
    info!(upload_dir = %config.upload_dir.display(), "image storage ready");

    let ports = match &config.db_pool {
        Some(pool) => diesel_ports(pool, image_store),
        None => {
            warn!("no database configured; records are kept in memory only");
            memory_ports(image_store)
        }
    };

    let state = HttpState::from_driven_ports(
        ports,
        Arc::new(CredentialStore::default()),
        Arc::new(DefaultClock),
    )
    .with_max_upload_bytes(config.max_upload_bytes);
    Ok(web::Data::new(state))
}

#[cfg(test)]
mod tests {
    //! Tests for HTTP state construction.

    use super::*;
    use actix_web::cookie::{Key, SameSite};
    use rstest::rstest;

    fn config(upload_dir: &std::path::Path) -> ServerConfig {
        ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            "127.0.0.1:0".parse().expect("addr"),
        )
        .with_upload_dir(upload_dir)
        .with_max_upload_bytes(2048)
    }

    #[rstest]
    fn creates_the_upload_directory() {
        let root = tempfile::tempdir().expect("temp dir");
        let upload_dir = root.path().join("nested").join("uploads");

        let state = build_http_state(&config(&upload_dir)).expect("state");

        assert!(upload_dir.is_dir());
        assert_eq!(state.max_upload_bytes, 2048);
    }

    #[rstest]
    fn fails_when_the_upload_path_is_a_file() {
        let root = tempfile::tempdir().expect("temp dir");
        let file = root.path().join("uploads");
        std::fs::write(&file, b"not a directory").expect("write file");

        assert!(build_http_state(&config(&file)).is_err());
    }
}
