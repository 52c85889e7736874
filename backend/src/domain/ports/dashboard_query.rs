//! Driving port for the dashboard aggregate read.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{CareEvent, CurrentUser, Error, Image, Note, Patient};

/// Everything the dashboard shows about the patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub patient: Patient,
    pub care_events: Vec<CareEvent>,
    /// Newest first.
    pub notes: Vec<Note>,
    /// Newest first.
    pub images: Vec<Image>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardQuery: Send + Sync {
    /// Load the dashboard, creating the default patient on first use.
    async fn dashboard(&self, user: &CurrentUser) -> Result<Dashboard, Error>;
}
