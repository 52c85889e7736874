//! Authorization gate for admin-only operations.

use super::{CurrentUser, Error};

/// Allow the call only when `user` is an administrator.
///
/// Callers obtain `user` from an authenticated session first, so an
/// anonymous request has already failed with `Unauthenticated` before this
/// runs.
///
/// # Examples
/// ```
/// use carelog::domain::{require_admin, CurrentUser, ErrorCode, Role, UserId, Username};
///
/// let carer = CurrentUser::new(UserId::new(2), Username::new("bob").unwrap(), Role::Caregiver);
/// let err = require_admin(&carer).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// ```
pub fn require_admin(user: &CurrentUser) -> Result<(), Error> {
    if user.role().is_admin() {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id(), "admin-only operation refused");
        Err(Error::forbidden("You do not have permission to access this page."))
    }
}
