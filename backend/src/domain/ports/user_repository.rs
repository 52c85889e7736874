//! Port abstraction for user account persistence and its errors.
use async_trait::async_trait;

use crate::domain::{NewUser, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this username.
        DuplicateUsername { username: String } => "username already taken: {username}",
        /// Another account already uses this email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Storage of user accounts.
///
/// `insert` must enforce username and email uniqueness itself, so a race
/// between the service's pre-check and the insert still surfaces as a
/// duplicate error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account and return it with its assigned id.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// True when some account uses `email`.
    async fn email_exists(&self, email: &str) -> Result<bool, UserPersistenceError>;

    /// Every account, ordered by id.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Number of administrator accounts.
    async fn count_admins(&self) -> Result<u64, UserPersistenceError>;

    /// Delete the account; `false` when it did not exist.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;
}
