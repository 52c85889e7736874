//! Driving port for uploading, serving and deleting images.

use async_trait::async_trait;

use crate::domain::{CurrentUser, Error, Image, ImageFilename, ImageId};

/// File received from an upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Client-supplied filename, unsanitised; `None` when no file was sent.
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// Stored file ready to stream back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageContent {
    pub filename: ImageFilename,
    pub bytes: Vec<u8>,
}

impl ImageContent {
    pub fn content_type(&self) -> &'static str {
        self.filename.content_type()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageLibrary: Send + Sync {
    /// Store the file and record it against the patient.
    ///
    /// # Errors
    /// `ValidationFailed` when no file was sent or its extension is not
    /// allowed; neither a file nor a row is written. `StorageFailure` when
    /// the file cannot be written.
    async fn upload(&self, user: &CurrentUser, upload: ImageUpload) -> Result<Image, Error>;

    /// Read a stored file by its (sanitised) name.
    ///
    /// # Errors
    /// `NotFound` when the name does not sanitise to itself or no such file
    /// exists.
    async fn open(&self, user: &CurrentUser, name: &str) -> Result<ImageContent, Error>;

    /// Remove the file (best effort) and then the row.
    ///
    /// # Errors
    /// `NotFound` when no row has this id.
    async fn delete(&self, user: &CurrentUser, id: ImageId) -> Result<(), Error>;
}
