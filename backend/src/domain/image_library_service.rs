//! Image upload, retrieval and deletion.
//!
//! The file is written before the row is inserted and removed before the row
//! is deleted. Neither pair is transactional: a crash between the two steps
//! can leave an orphan file, never a row without an attempted removal.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    ImageContent, ImageLibrary, ImageRepository, ImageStore, ImageUpload, PatientRepository,
};
use crate::domain::{
    CurrentUser, Error, FieldError, FieldErrorKind, FieldErrors, Image, ImageFilename,
    ImageFilenameError, ImageId, NewImage, Patient,
};

/// Image library backed by a metadata repository and a file store.
#[derive(Clone)]
pub struct ImageLibraryService {
    patients: Arc<dyn PatientRepository>,
    images: Arc<dyn ImageRepository>,
    store: Arc<dyn ImageStore>,
    clock: Arc<dyn Clock>,
}

impl ImageLibraryService {
    pub fn new(
        patients: Arc<dyn PatientRepository>,
        images: Arc<dyn ImageRepository>,
        store: Arc<dyn ImageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            patients,
            images,
            store,
            clock,
        }
    }
}

fn upload_field_error(kind: FieldErrorKind, message: &str) -> Error {
    let mut errors = FieldErrors::new();
    errors.push(FieldError::new("image", kind, message));
    Error::from(errors)
}

fn validate_upload(upload: &ImageUpload) -> Result<ImageFilename, Error> {
    let raw = upload
        .filename
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| upload_field_error(FieldErrorKind::Required, "No file selected"))?;
    ImageFilename::for_upload(raw).map_err(|err| match err {
        ImageFilenameError::DisallowedExtension => {
            upload_field_error(FieldErrorKind::Invalid, "Images only! (jpg, jpeg, png, gif)")
        }
        ImageFilenameError::Empty => upload_field_error(FieldErrorKind::Invalid, "Invalid filename"),
    })
}

#[async_trait]
impl ImageLibrary for ImageLibraryService {
    async fn upload(&self, user: &CurrentUser, upload: ImageUpload) -> Result<Image, Error> {
        let filename = validate_upload(&upload)?;
        let patient = self
            .patients
            .ensure_primary(&Patient::primary_default())
            .await?;

        self.store.save(&filename, &upload.bytes).await?;
        let image = self
            .images
            .insert(&NewImage {
                patient_id: patient.id(),
                filename,
                timestamp: self.clock.utc(),
            })
            .await?;
        info!(
            user_id = %user.id(),
            image_id = image.id.get(),
            filename = %image.filename,
            bytes = upload.bytes.len(),
            "image uploaded"
        );
        Ok(image)
    }

    async fn open(&self, _user: &CurrentUser, name: &str) -> Result<ImageContent, Error> {
        let filename = match ImageFilename::sanitize(name) {
            Ok(clean) if clean.as_ref() == name => clean,
            _ => return Err(Error::not_found(format!("no image named {name}"))),
        };
        let bytes = self.store.read(&filename).await?;
        Ok(ImageContent { filename, bytes })
    }

    async fn delete(&self, user: &CurrentUser, id: ImageId) -> Result<(), Error> {
        let image = self
            .images
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("image {} not found", id.get())))?;

        if !self.store.remove(&image.filename).await? {
            warn!(filename = %image.filename, "image file already absent");
        }
        self.images.delete(id).await?;
        info!(user_id = %user.id(), image_id = id.get(), "image deleted");
        Ok(())
    }
}
