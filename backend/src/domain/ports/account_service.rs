//! Driving port for registration, login and session identity.
//!
//! Inbound adapters call this port to create accounts and authenticate
//! credentials without knowing how users or password hashes are stored.

use async_trait::async_trait;

use crate::domain::{CurrentUser, Error, LoginCredentials, Registration, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account with a freshly hashed password.
    ///
    /// # Errors
    /// `DuplicateUsername` or `DuplicateEmail` when either is taken, and
    /// `Forbidden` when an `admin` role is requested after an administrator
    /// already exists.
    async fn register(&self, registration: Registration) -> Result<UserId, Error>;

    /// Check credentials and return the identity to bind to the session.
    ///
    /// # Errors
    /// `InvalidCredentials`, with the same message whether the user is
    /// unknown or the password is wrong.
    async fn login(&self, credentials: &LoginCredentials) -> Result<CurrentUser, Error>;

    /// Resolve the identity behind a session's user id, `None` once the
    /// account has been deleted.
    async fn current_user(&self, user_id: UserId) -> Result<Option<CurrentUser>, Error>;
}
