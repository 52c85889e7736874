//! Application settings and the server configuration built from them.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use carelog::inbound::http::session_config::{SESSION_KEY_DEFAULT_PATH, SessionToggles};
use carelog::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;
use carelog::outbound::persistence::DbPool;

const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Settings loaded from CLI flags, `CARELOG_*` variables and config files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CARELOG")]
pub struct AppSettings {
    /// PostgreSQL connection string; in-memory storage is used when absent.
    pub database_url: Option<String>,
    /// Directory holding uploaded images.
    pub upload_dir: Option<PathBuf>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Largest accepted upload request body, in bytes.
    pub max_upload_bytes: Option<usize>,
    pub session_key_file: Option<PathBuf>,
    pub session_cookie_secure: Option<bool>,
    /// `Strict`, `Lax` or `None`.
    pub session_same_site: Option<String>,
    /// Permit a generated session key when the key file is missing.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session_key: bool,
}

impl AppSettings {
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    pub fn upload_dir(&self) -> &Path {
        self.upload_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_UPLOAD_DIR))
    }

    /// Parse the bind address, falling back to port 5000 on all interfaces.
    ///
    /// # Errors
    /// Returns [`std::io::ErrorKind::InvalidInput`] for an unparsable address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind_addr '{raw}': {err}"),
            )
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Session toggles with unset values taken from their defaults.
    pub fn session_toggles(&self) -> SessionToggles {
        let defaults = SessionToggles::default();
        SessionToggles {
            key_file: self
                .session_key_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH)),
            cookie_secure: self.session_cookie_secure.unwrap_or(defaults.cookie_secure),
            same_site: self
                .session_same_site
                .clone()
                .unwrap_or(defaults.same_site),
            allow_ephemeral: self.allow_ephemeral_session_key,
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) upload_dir: PathBuf,
    pub(crate) max_upload_bytes: usize,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Attach a database connection pool; repositories become Diesel-backed.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_upload_dir(mut self, upload_dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = upload_dir.into();
        self
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
