//! Form bodies carrying the session's anti-forgery token.
//!
//! Every state-changing form post echoes the token handed out in the page
//! views as a `csrf_token` field. Handlers check it with
//! [`SessionContext::verify_csrf`](super::session::SessionContext::verify_csrf)
//! before doing anything else.

use serde::Deserialize;

/// Name of the form field holding the token.
pub const CSRF_FIELD: &str = "csrf_token";

/// A urlencoded form plus its `csrf_token` field.
#[derive(Debug, Deserialize)]
pub struct Protected<T> {
    #[serde(default)]
    csrf_token: Option<String>,
    #[serde(flatten)]
    form: T,
}

impl<T> Protected<T> {
    /// Submitted token, if the field was present.
    pub fn token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn form(&self) -> &T {
        &self.form
    }

    pub fn into_form(self) -> T {
        self.form
    }
}

/// Body of a form whose only field is the token.
#[derive(Debug, Default, Deserialize)]
pub struct TokenOnly {}
