//! Test helpers for inbound HTTP components.

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::LOCATION;
use actix_web::{App, HttpResponse, test, web};
use std::sync::Arc;

use crate::domain::ports::{
    MockAccountService, MockCareRecordsCommand, MockDashboardQuery, MockImageLibrary,
    MockUserAdministration,
};
use crate::domain::{CurrentUser, Role, UserId, Username};

use super::session::SessionContext;
use super::state::{HttpState, HttpStatePorts};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by `res`, panicking when the response did not set one.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// `Location` header of a redirect.
pub fn location<B>(res: &ServiceResponse<B>) -> Option<String> {
    res.headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// One-field `multipart/form-data` body.
pub fn multipart_body(boundary: &str, field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; \
         filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// Upload body with an `image` part, preceded by a `csrf_token` part when
/// `token` is given.
pub fn multipart_upload(
    boundary: &str,
    filename: &str,
    bytes: &[u8],
    token: Option<&str>,
) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(token) = token {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"csrf_token\"\r\n\r\n{token}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend(multipart_body(boundary, "image", filename, bytes));
    body
}

/// Driving-port mocks; any call without an expectation fails the test.
pub struct MockPorts {
    pub accounts: MockAccountService,
    pub dashboard: MockDashboardQuery,
    pub care_records: MockCareRecordsCommand,
    pub images: MockImageLibrary,
    pub admin: MockUserAdministration,
}

impl MockPorts {
    pub fn new() -> Self {
        Self {
            accounts: MockAccountService::new(),
            dashboard: MockDashboardQuery::new(),
            care_records: MockCareRecordsCommand::new(),
            images: MockImageLibrary::new(),
            admin: MockUserAdministration::new(),
        }
    }

    /// Resolve every session user id to a user called `alice` with `role`.
    pub fn signed_in_as(mut self, role: Role) -> Self {
        self.accounts.expect_current_user().returning(move |id| {
            Ok(Some(CurrentUser::new(
                id,
                Username::new("alice").expect("username"),
                role,
            )))
        });
        self
    }

    pub fn signed_in_as_caregiver(self) -> Self {
        self.signed_in_as(Role::Caregiver)
    }

    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            accounts: Arc::new(self.accounts),
            dashboard: Arc::new(self.dashboard),
            care_records: Arc::new(self.care_records),
            images: Arc::new(self.images),
            admin: Arc::new(self.admin),
        })
    }
}

async fn sign_in_route(session: SessionContext, path: web::Path<i32>) -> HttpResponse {
    session
        .persist_user(UserId::new(path.into_inner()))
        .expect("persist user");
    HttpResponse::Ok().body(session.csrf_token().expect("form token"))
}

async fn form_token_route(session: SessionContext) -> HttpResponse {
    HttpResponse::Ok().body(session.csrf_token().expect("form token"))
}

/// Every page route plus `/__test/sign_in/{id}` and `/__test/form_token`,
/// behind a test session.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .configure(super::configure)
        .route("/__test/sign_in/{id}", web::get().to(sign_in_route))
        .route("/__test/form_token", web::get().to(form_token_route))
}

async fn cookie_and_token<S, B>(app: &S, uri: &str) -> (Cookie<'static>, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, test::TestRequest::get().uri(uri).to_request()).await;
    let cookie = session_cookie(&res);
    let body = test::read_body(res).await;
    let token = String::from_utf8(body.to_vec()).expect("utf8 token");
    (cookie, token)
}

/// Session cookie and form token for user `id`.
pub async fn sign_in_with_token<S, B>(app: &S, id: i32) -> (Cookie<'static>, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    cookie_and_token(app, &format!("/__test/sign_in/{id}")).await
}

/// Session cookie and form token for an anonymous visitor.
pub async fn anonymous_token<S, B>(app: &S) -> (Cookie<'static>, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    cookie_and_token(app, "/__test/form_token").await
}

/// Session cookie for user `id`, obtained through the test-only route.
pub async fn sign_in<S, B>(app: &S, id: i32) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!("/__test/sign_in/{id}"))
            .to_request(),
    )
    .await;
    session_cookie(&res)
}
