//! Uploaded images and filename sanitisation.
//!
//! Image bytes live in the upload directory under a sanitised version of the
//! client's filename; the database row only records that name. Two uploads
//! that sanitise to the same name share one file, the later overwriting the
//! earlier.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::PatientId;

/// Extensions accepted for upload, compared case-insensitively.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Rejections raised while turning a client filename into a storage key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageFilenameError {
    #[error("filename is empty after removing unsafe characters")]
    Empty,
    #[error("file type not allowed; expected one of jpg, jpeg, png, gif")]
    DisallowedExtension,
}

/// Identifier of a stored image row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageId(i32);

impl ImageId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Filename safe to use as a key inside the upload directory.
///
/// Contains only ASCII letters, digits, `_`, `.` and `-`, never starts or
/// ends with `.` or `_`, and is never empty, so it cannot name a parent
/// directory or a path outside the upload directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageFilename(String);

impl ImageFilename {
    /// Sanitise a client-supplied filename.
    ///
    /// # Examples
    /// ```
    /// use carelog::domain::ImageFilename;
    ///
    /// let name = ImageFilename::sanitize("../../etc/My Photo.JPG").expect("usable");
    /// assert_eq!(name.as_ref(), "etc_My_Photo.JPG");
    /// ```
    pub fn sanitize(raw: &str) -> Result<Self, ImageFilenameError> {
        let joined = raw
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let underscored = joined.split_whitespace().collect::<Vec<_>>().join("_");
        let filtered: String = underscored
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
            .collect();
        let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');
        if trimmed.is_empty() {
            return Err(ImageFilenameError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Sanitise and require an allowed image extension.
    pub fn for_upload(raw: &str) -> Result<Self, ImageFilenameError> {
        if !has_allowed_extension(raw) {
            return Err(ImageFilenameError::DisallowedExtension);
        }
        let name = Self::sanitize(raw)?;
        if !has_allowed_extension(name.as_ref()) {
            return Err(ImageFilenameError::DisallowedExtension);
        }
        Ok(name)
    }

    /// Accept a name read back from storage without re-sanitising it.
    pub fn from_stored(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Lower-case extension, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.0)
    }

    /// MIME type to serve the file with.
    pub fn content_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        }
    }
}

impl AsRef<str> for ImageFilename {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// True when `name` ends in one of [`ALLOWED_IMAGE_EXTENSIONS`].
pub fn has_allowed_extension(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Image row awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub patient_id: PatientId,
    pub filename: ImageFilename,
    pub timestamp: DateTime<Utc>,
}

/// Stored image metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[schema(value_type = i32)]
    pub id: ImageId,
    #[schema(value_type = i32)]
    pub patient_id: PatientId,
    #[schema(value_type = String)]
    pub filename: ImageFilename,
    pub timestamp: DateTime<Utc>,
}

impl Image {
    pub fn from_new(id: ImageId, image: NewImage) -> Self {
        Self {
            id,
            patient_id: image.patient_id,
            filename: image.filename,
            timestamp: image.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.png", "photo.png")]
    #[case("My cat   photo.jpg", "My_cat_photo.jpg")]
    #[case("../../etc/passwd.gif", "etc_passwd.gif")]
    #[case("..\\windows\\win.ini.png", "windows_win.ini.png")]
    #[case("__init__.jpeg", "init__.jpeg")]
    #[case("résumé.png", "rsum.png")]
    #[case(".hidden.gif", "hidden.gif")]
    fn sanitize_strips_unsafe_parts(#[case] raw: &str, #[case] expected: &str) {
        let name = ImageFilename::sanitize(raw).expect("usable name");
        assert_eq!(name.as_ref(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("../..")]
    #[case("///")]
    #[case("日本")]
    fn sanitize_rejects_names_with_nothing_left(#[case] raw: &str) {
        assert_eq!(ImageFilename::sanitize(raw), Err(ImageFilenameError::Empty));
    }

    #[rstest]
    #[case("scan.JPG", true)]
    #[case("scan.Jpeg", true)]
    #[case("scan.gif", true)]
    #[case("scan.pdf", false)]
    #[case("scan.png.exe", false)]
    #[case("png", false)]
    #[case("scan.", false)]
    fn upload_extension_check(#[case] raw: &str, #[case] allowed: bool) {
        assert_eq!(ImageFilename::for_upload(raw).is_ok(), allowed);
    }

    #[rstest]
    #[case("a.JPG", "image/jpeg")]
    #[case("a.jpeg", "image/jpeg")]
    #[case("a.png", "image/png")]
    #[case("a.gif", "image/gif")]
    #[case("a.bin", "application/octet-stream")]
    #[case("noext", "application/octet-stream")]
    fn content_type_follows_extension(#[case] stored: &str, #[case] expected: &str) {
        assert_eq!(ImageFilename::from_stored(stored).content_type(), expected);
    }
}
