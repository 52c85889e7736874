//! Driving port for admin user management.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{CurrentUser, Error, Role, User, UserId};

/// Public view of an account; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[schema(value_type = i32)]
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().to_string(),
            email: user.email().as_ref().to_owned(),
            role: user.role(),
        }
    }
}

/// Result of an admin delete request for an existing user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteUserOutcome {
    Deleted,
    /// Target is an administrator and was left in place.
    AdminProtected,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// Every account. Requires an admin caller.
    async fn list_users(&self, caller: &CurrentUser) -> Result<Vec<UserSummary>, Error>;

    /// Delete a non-admin account. Requires an admin caller.
    ///
    /// # Errors
    /// `Forbidden` for non-admin callers and `NotFound` when `target` does
    /// not exist.
    async fn delete_user(
        &self,
        caller: &CurrentUser,
        target: UserId,
    ) -> Result<DeleteUserOutcome, Error>;
}
