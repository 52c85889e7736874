//! Admin-only user listing and deletion.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{DeleteUserOutcome, UserAdministration, UserRepository, UserSummary};
use crate::domain::{CurrentUser, Error, UserId, require_admin};

/// User administration over a user repository.
#[derive(Clone)]
pub struct UserAdministrationService {
    users: Arc<dyn UserRepository>,
}

impl UserAdministrationService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserAdministration for UserAdministrationService {
    async fn list_users(&self, caller: &CurrentUser) -> Result<Vec<UserSummary>, Error> {
        require_admin(caller)?;
        let users = self.users.list().await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    async fn delete_user(
        &self,
        caller: &CurrentUser,
        target: UserId,
    ) -> Result<DeleteUserOutcome, Error> {
        require_admin(caller)?;
        let user = self
            .users
            .find_by_id(target)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {target} not found")))?;

        if user.role().is_admin() {
            warn!(caller_id = %caller.id(), target_id = %target, "refused to delete admin user");
            return Ok(DeleteUserOutcome::AdminProtected);
        }
        if !self.users.delete(target).await? {
            return Err(Error::not_found(format!("user {target} not found")));
        }
        info!(caller_id = %caller.id(), target_id = %target, "user deleted");
        Ok(DeleteUserOutcome::Deleted)
    }
}
