//! The single patient whose care is being logged.
//!
//! Storage holds at most one patient row, addressed by the well-known
//! [`PatientId::PRIMARY`]. The row is created lazily with default values the
//! first time any caller needs it.

use serde::Serialize;
use utoipa::ToSchema;

/// Name given to the lazily created patient.
pub const DEFAULT_PATIENT_NAME: &str = "Default Patient";
/// Age given to the lazily created patient.
pub const DEFAULT_PATIENT_AGE: i32 = 0;

/// Identifier of a patient row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PatientId(i32);

impl PatientId {
    /// The only identifier storage accepts.
    pub const PRIMARY: Self = Self(1);

    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Patient aggregate root; care events, notes and images hang off it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[schema(value_type = i32)]
    id: PatientId,
    name: String,
    age: i32,
}

impl Patient {
    pub fn new(id: PatientId, name: impl Into<String>, age: i32) -> Self {
        Self {
            id,
            name: name.into(),
            age,
        }
    }

    /// Default patient created on first access.
    ///
    /// # Examples
    /// ```
    /// use carelog::domain::{Patient, PatientId};
    ///
    /// let patient = Patient::primary_default();
    /// assert_eq!(patient.id(), PatientId::PRIMARY);
    /// assert_eq!(patient.name(), "Default Patient");
    /// assert_eq!(patient.age(), 0);
    /// ```
    pub fn primary_default() -> Self {
        Self::new(PatientId::PRIMARY, DEFAULT_PATIENT_NAME, DEFAULT_PATIENT_AGE)
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> i32 {
        self.age
    }
}
