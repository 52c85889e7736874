//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while letting Actix
//! handlers either recover a failure into a redirect with a flash notice or
//! turn it into a JSON status response.

use actix_session::SessionExt;
use actix_web::error::{InternalError, UrlencodedError};
use actix_web::{
    HttpRequest, HttpResponse, ResponseError, http::StatusCode, http::header::LOCATION,
};
use tracing::{debug, error, info, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

use super::flash::Flash;
use super::session::SessionContext;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Where `Unauthenticated` requests are sent.
pub const LOGIN_PATH: &str = "/login";
/// Where `Forbidden` requests are sent.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Registration form page.
pub const REGISTER_PATH: &str = "/register";

/// Message shown when a form body cannot be decoded.
pub const UNREADABLE_FORM: &str = "The form could not be read. Please try again.";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::DuplicateUsername | ErrorCode::DuplicateEmail => StatusCode::CONFLICT,
        ErrorCode::InvalidCredentials | ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::StorageFailure | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

/// `302 Found` pointing at `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

/// Turn a page-flow failure into a redirect with a flash notice.
///
/// `Unauthenticated` always goes to the login page and `Forbidden` to the
/// dashboard; the remaining recoverable failures return to `fallback`.
/// `NotFound`, `ServiceUnavailable` and `InternalError` are handed back so
/// Actix renders them as status responses.
///
/// # Errors
/// Returns the original error when it cannot be presented as a redirect.
pub fn recover(session: &SessionContext, error: Error, fallback: &str) -> ApiResult<HttpResponse> {
    match error.code() {
        ErrorCode::Unauthenticated => {
            session.flash(Flash::info(error.message()));
            Ok(redirect(LOGIN_PATH))
        }
        ErrorCode::Forbidden => {
            warn!(message = error.message(), "request refused by authorization gate");
            session.flash(Flash::danger(error.message()));
            Ok(redirect(DASHBOARD_PATH))
        }
        ErrorCode::DuplicateUsername
        | ErrorCode::DuplicateEmail
        | ErrorCode::InvalidCredentials
        | ErrorCode::ValidationFailed => {
            info!(code = ?error.code(), message = error.message(), "form submission rejected");
            session.flash(Flash::danger(error.message()));
            Ok(redirect(fallback))
        }
        ErrorCode::StorageFailure => {
            error!(message = error.message(), "file storage failure");
            session.flash(Flash::danger("The file could not be stored. Please try again."));
            Ok(redirect(fallback))
        }
        _ => {
            if !matches!(error.code(), ErrorCode::NotFound) {
                error!(code = ?error.code(), message = error.message(), "request failed");
            }
            Err(error)
        }
    }
}

/// Page a form post returns to when its body cannot be decoded.
fn form_fallback(path: &str) -> &'static str {
    match path {
        LOGIN_PATH => LOGIN_PATH,
        REGISTER_PATH => REGISTER_PATH,
        _ => DASHBOARD_PATH,
    }
}

/// `FormConfig` error handler: an undecodable urlencoded body is reported
/// like any other invalid submission.
pub fn form_error_handler(err: UrlencodedError, req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, path = req.path(), "undecodable form body");
    let session = SessionContext::new(req.get_session());
    let fallback = form_fallback(req.path());
    match recover(&session, Error::validation_failed(UNREADABLE_FORM), fallback) {
        Ok(response) => InternalError::from_response(err, response).into(),
        Err(error) => error.into(),
    }
}
