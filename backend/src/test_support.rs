//! Test utilities for the carelog crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`);
//! compiled only with the `test-support` feature.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use crate::domain::CredentialStore;
use crate::inbound::http::state::{DrivenPorts, HttpState};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::storage::CapStdImageStore;

pub use self::clock::MutableClock;

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! Built on `cap_std::fs::Dir` so test suites inspect the upload
    //! directory the same way the storage adapter writes it.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Read a file's bytes through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carelog::test_support::cap_fs::read_file;
    ///
    /// let path = std::env::temp_dir().join("carelog-cap-fs-read.bin");
    /// std::fs::write(&path, b"\x89PNG")?;
    /// assert_eq!(read_file(&path)?, b"\x89PNG");
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn read_file(path: &Path) -> io::Result<Vec<u8>> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.read(Path::new(&file_name))
    }

    /// Return true when `path` exists, false when it does not.
    pub fn path_exists(path: &Path) -> bool {
        let Ok((parent, file_name)) = parent_and_file_name(path) else {
            return false;
        };
        let Ok(directory) = Dir::open_ambient_dir(parent, ambient_authority()) else {
            return false;
        };
        directory.exists(Path::new(&file_name))
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file or directory name",
            )
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

mod clock {
    use std::sync::{Mutex, MutexGuard};

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    /// Clock that only moves when told to.
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        pub fn advance_seconds(&self, seconds: i64) {
            *self.lock_clock() += TimeDelta::seconds(seconds);
        }

        fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

/// In-memory backend over a temporary upload directory.
///
/// The store and clock stay reachable so tests can assert on rows and move
/// time between requests.
pub struct TestBackend {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<MutableClock>,
    upload_dir: TempDir,
}

impl TestBackend {
    /// Fresh backend with the clock set to a fixed instant.
    pub fn new() -> io::Result<Self> {
        let start = chrono::DateTime::parse_from_rfc3339("2024-03-01T09:00:00Z")
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?
            .to_utc();
        Ok(Self {
            store: Arc::new(InMemoryStore::new()),
            clock: Arc::new(MutableClock::new(start)),
            upload_dir: tempfile::tempdir()?,
        })
    }

    /// Directory the image store writes into.
    pub fn upload_dir(&self) -> &Path {
        self.upload_dir.path()
    }

    /// HTTP state wired over this backend, with cheap password hashing.
    pub fn http_state(&self) -> io::Result<HttpState> {
        let image_store = CapStdImageStore::open(self.upload_dir())?;
        let ports = DrivenPorts {
            users: self.store.clone(),
            patients: self.store.clone(),
            care_events: self.store.clone(),
            notes: self.store.clone(),
            images: self.store.clone(),
            image_store: Arc::new(image_store),
        };
        Ok(HttpState::from_driven_ports(
            ports,
            Arc::new(CredentialStore::low_cost()),
            self.clock.clone(),
        ))
    }
}
