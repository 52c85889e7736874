//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix session so handlers only deal with domain-friendly
//! operations: binding a user id, resolving the [`CurrentUser`] for a request,
//! issuing and checking the form token, and queueing or draining flash
//! notices.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::AccountService;
use crate::domain::{CurrentUser, Error, ErrorCode, UserId};

use super::flash::{FLASHES_KEY, Flash};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const CSRF_KEY: &str = "_csrf_token";

/// Message shown when a protected page is requested without a session.
pub const LOGIN_REQUIRED: &str = "Please log in to access this page.";

/// Message shown when a form post carries no valid token.
pub const CSRF_REJECTED: &str = "The form has expired. Please reload the page and try again.";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Bind the authenticated user's id to the session.
    ///
    /// The session is renewed first so a pre-login cookie cannot be reused.
    pub fn persist_user(&self, user_id: UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.get())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// User id bound to the session, if any.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        match self.0.get::<i32>(USER_ID_KEY) {
            Ok(id) => Ok(id.map(UserId::new)),
            Err(error) => {
                warn!(%error, "unreadable user id in session cookie");
                self.0.remove(USER_ID_KEY);
                Ok(None)
            }
        }
    }

    /// Resolve the authenticated caller for this request.
    ///
    /// A session pointing at a deleted account loses its user id and is
    /// treated as anonymous.
    ///
    /// # Errors
    /// `Unauthenticated` when no live user is bound to the session.
    pub async fn require_user(&self, accounts: &dyn AccountService) -> Result<CurrentUser, Error> {
        let Some(user_id) = self.user_id()? else {
            return Err(Error::unauthenticated(LOGIN_REQUIRED));
        };
        match accounts.current_user(user_id).await? {
            Some(user) => Ok(user),
            None => {
                info!(user_id = %user_id, "session refers to a deleted user");
                self.0.remove(USER_ID_KEY);
                Err(Error::unauthenticated(LOGIN_REQUIRED))
            }
        }
    }

    /// Like [`Self::require_user`], but anonymous callers yield `None`.
    pub async fn current_user(
        &self,
        accounts: &dyn AccountService,
    ) -> Result<Option<CurrentUser>, Error> {
        match self.require_user(accounts).await {
            Ok(user) => Ok(Some(user)),
            Err(error) if error.code() == ErrorCode::Unauthenticated => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// True when a user id is bound, without checking the account still exists.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.user_id(), Ok(Some(_)))
    }

    /// Drop all session state and issue a fresh cookie.
    ///
    /// Safe to call on an anonymous session. Flashes queued afterwards survive.
    pub fn end(&self) {
        self.0.clear();
        self.0.renew();
    }

    /// Token that state-changing form posts must echo back.
    ///
    /// Created on first use and kept until the session ends.
    pub fn csrf_token(&self) -> Result<String, Error> {
        if let Ok(Some(token)) = self.0.get::<String>(CSRF_KEY) {
            return Ok(token);
        }
        let token = Uuid::new_v4().simple().to_string();
        self.0
            .insert(CSRF_KEY, &token)
            .map_err(|error| Error::internal(format!("failed to store form token: {error}")))?;
        Ok(token)
    }

    /// Check a submitted form token against the one bound to this session.
    ///
    /// # Errors
    /// `ValidationFailed` when the token is missing, blank or different.
    pub fn verify_csrf(&self, submitted: Option<&str>) -> Result<(), Error> {
        let expected = self.0.get::<String>(CSRF_KEY).ok().flatten();
        match (expected, submitted) {
            (Some(expected), Some(submitted))
                if !submitted.is_empty()
                    && bool::from(expected.as_bytes().ct_eq(submitted.as_bytes())) =>
            {
                Ok(())
            }
            (expected, submitted) => {
                warn!(
                    session_token = expected.is_some(),
                    submitted_token = submitted.is_some_and(|token| !token.is_empty()),
                    "form post rejected: token mismatch"
                );
                Err(Error::validation_failed(CSRF_REJECTED))
            }
        }
    }

    /// Queue a notice for the next page view.
    pub fn flash(&self, flash: Flash) {
        let mut pending = self.peek_flashes();
        pending.push(flash);
        if let Err(error) = self.0.insert(FLASHES_KEY, pending) {
            warn!(%error, "failed to queue flash notice");
        }
    }

    /// Remove and return every queued notice.
    pub fn take_flashes(&self) -> Vec<Flash> {
        match self.0.remove_as::<Vec<Flash>>(FLASHES_KEY) {
            Some(Ok(flashes)) => flashes,
            Some(Err(raw)) => {
                warn!(len = raw.len(), "discarding unreadable flash notices");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn peek_flashes(&self) -> Vec<Flash> {
        self.0
            .get::<Vec<Flash>>(FLASHES_KEY)
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
