//! Port for the file storage holding uploaded image bytes.
use async_trait::async_trait;

use crate::domain::ImageFilename;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image file storage adapters.
    pub enum ImageStoreError {
        /// No file is stored under the name.
        NotFound { name: String } => "no stored file named {name}",
        /// Reading, writing or removing the file failed.
        Io { message: String } => "image storage failed: {message}",
    }
}

/// Byte storage keyed by sanitised filename.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write `bytes` under `name`, replacing any existing file.
    async fn save(&self, name: &ImageFilename, bytes: &[u8]) -> Result<(), ImageStoreError>;

    /// Read the whole file stored under `name`.
    async fn read(&self, name: &ImageFilename) -> Result<Vec<u8>, ImageStoreError>;

    /// Remove the file; `false` when it was already absent.
    async fn remove(&self, name: &ImageFilename) -> Result<bool, ImageStoreError>;
}
