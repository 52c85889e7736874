//! Image file storage rooted in a capability directory.
//!
//! Every path is resolved relative to a `cap_std::fs::Dir`, so even a name
//! that slipped past sanitisation cannot escape the upload directory.
//! Blocking filesystem calls run on Tokio's blocking pool.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ImageFilename;
use crate::domain::ports::{ImageStore, ImageStoreError};

/// [`ImageStore`] writing files into one directory.
#[derive(Debug, Clone)]
pub struct CapStdImageStore {
    dir: Arc<Dir>,
}

impl CapStdImageStore {
    /// Open `path`, creating it (and parents) when absent.
    pub fn open(path: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self::from_dir(dir))
    }

    pub fn from_dir(dir: Dir) -> Self {
        Self { dir: Arc::new(dir) }
    }

    async fn run<T, F>(&self, op: F) -> Result<T, ImageStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, ImageStoreError> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        task::spawn_blocking(move || op(&dir))
            .await
            .map_err(|err| ImageStoreError::io(format!("storage task failed: {err}")))?
    }
}

fn io_error(name: &str, err: &io::Error) -> ImageStoreError {
    ImageStoreError::io(format!("{name}: {err}"))
}

#[async_trait]
impl ImageStore for CapStdImageStore {
    async fn save(&self, name: &ImageFilename, bytes: &[u8]) -> Result<(), ImageStoreError> {
        let name = name.to_string();
        let bytes = bytes.to_vec();
        self.run(move |dir| {
            // Stored names never start with '.', so the staging file cannot
            // shadow an image.
            let staging = format!(".upload-{}", Uuid::new_v4().simple());
            dir.write(&staging, &bytes)
                .map_err(|err| io_error(&name, &err))?;
            if let Err(err) = dir.rename(&staging, dir, &name) {
                let _cleanup = dir.remove_file(&staging);
                return Err(io_error(&name, &err));
            }
            debug!(filename = %name, bytes = bytes.len(), "image file written");
            Ok(())
        })
        .await
    }

    async fn read(&self, name: &ImageFilename) -> Result<Vec<u8>, ImageStoreError> {
        let name = name.to_string();
        self.run(move |dir| match dir.read(&name) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(ImageStoreError::not_found(name))
            }
            Err(err) => Err(io_error(&name, &err)),
        })
        .await
    }

    async fn remove(&self, name: &ImageFilename) -> Result<bool, ImageStoreError> {
        let name = name.to_string();
        self.run(move |dir| match dir.remove_file(&name) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(io_error(&name, &err)),
        })
        .await
    }
}
