//! Session lifecycle handlers: login, registration and logout.
//!
//! ```text
//! GET  /login
//! POST /login     username=alice&password=...&csrf_token=...
//! GET  /register
//! POST /register  username=alice&email=a@x.com&password=...&password2=...&role=caregiver&csrf_token=...
//! GET  /logout
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, LoginForm, RegistrationForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::csrf::Protected;
use crate::inbound::http::error::{
    DASHBOARD_PATH, LOGIN_PATH, REGISTER_PATH, recover, redirect,
};
use crate::inbound::http::flash::Flash;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const INDEX_PATH: &str = "/";

/// View model for the login and registration pages.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormPageView {
    /// Value to submit as the form's `csrf_token` field.
    pub csrf_token: String,
    pub flashes: Vec<Flash>,
}

fn form_page(session: &SessionContext) -> ApiResult<HttpResponse> {
    if session.is_authenticated() {
        return Ok(redirect(DASHBOARD_PATH));
    }
    Ok(HttpResponse::Ok().json(FormPageView {
        csrf_token: session.csrf_token()?,
        flashes: session.take_flashes(),
    }))
}

/// Login page. Signed-in users are sent to the dashboard.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login page view", body = FormPageView),
        (status = 302, description = "Already signed in; redirect to /dashboard")
    ),
    tags = ["auth"],
    operation_id = "loginPage",
    security([])
)]
#[get("/login")]
pub async fn login_page(session: SessionContext) -> ApiResult<HttpResponse> {
    form_page(&session)
}

/// Verify credentials and bind the user to the session.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded",
        description = "Login fields plus the page's `csrf_token`"),
    responses(
        (status = 302, description = "Redirect to /dashboard on success, /login otherwise",
            headers(("Set-Cookie" = String, description = "Session cookie")))
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<Protected<LoginForm>>,
) -> ApiResult<HttpResponse> {
    if session.is_authenticated() {
        return Ok(redirect(DASHBOARD_PATH));
    }
    sign_in(&state, &session, &form)
        .await
        .or_else(|error| recover(&session, error, LOGIN_PATH))
}

async fn sign_in(
    state: &HttpState,
    session: &SessionContext,
    form: &Protected<LoginForm>,
) -> ApiResult<HttpResponse> {
    session.verify_csrf(form.token())?;
    let credentials = form.form().validate().map_err(Error::from)?;
    let user = state.accounts.login(&credentials).await?;
    session.persist_user(user.id())?;
    Ok(redirect(DASHBOARD_PATH))
}

/// Registration page. Signed-in users are sent to the dashboard.
#[utoipa::path(
    get,
    path = "/register",
    responses(
        (status = 200, description = "Registration page view", body = FormPageView),
        (status = 302, description = "Already signed in; redirect to /dashboard")
    ),
    tags = ["auth"],
    operation_id = "registerPage",
    security([])
)]
#[get("/register")]
pub async fn register_page(session: SessionContext) -> ApiResult<HttpResponse> {
    form_page(&session)
}

/// Create an account, then send the visitor to the login page.
#[utoipa::path(
    post,
    path = "/register",
    request_body(content = RegistrationForm, content_type = "application/x-www-form-urlencoded",
        description = "Registration fields plus the page's `csrf_token`"),
    responses(
        (status = 302, description = "Redirect to /login on success, /register otherwise")
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<Protected<RegistrationForm>>,
) -> ApiResult<HttpResponse> {
    if session.is_authenticated() {
        return Ok(redirect(DASHBOARD_PATH));
    }
    create_account(&state, &session, &form)
        .await
        .or_else(|error| match error.code() {
            // A refused admin bootstrap comes from an anonymous visitor.
            ErrorCode::Forbidden => {
                info!(message = error.message(), "registration refused");
                session.flash(Flash::danger(error.message()));
                Ok(redirect(REGISTER_PATH))
            }
            _ => recover(&session, error, REGISTER_PATH),
        })
}

async fn create_account(
    state: &HttpState,
    session: &SessionContext,
    form: &Protected<RegistrationForm>,
) -> ApiResult<HttpResponse> {
    session.verify_csrf(form.token())?;
    let registration = form.form().validate().map_err(Error::from)?;
    state.accounts.register(registration).await?;
    session.flash(Flash::success(
        "Congratulations, you are now a registered user!",
    ));
    Ok(redirect(LOGIN_PATH))
}

/// End the session. Works for anonymous visitors too.
#[utoipa::path(
    get,
    path = "/logout",
    responses((status = 302, description = "Redirect to /")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[get("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    if let Ok(Some(user_id)) = session.user_id() {
        info!(user_id = %user_id, "user signed out");
    }
    session.end();
    session.flash(Flash::info("You have been logged out."));
    redirect(INDEX_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurrentUser, Role, UserId, Username};
    use crate::inbound::http::session::CSRF_REJECTED;
    use crate::inbound::http::test_utils::{
        MockPorts, anonymous_token, location, session_cookie, test_app,
    };
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;

    fn alice() -> CurrentUser {
        CurrentUser::new(
            UserId::new(1),
            Username::new("alice").expect("username"),
            Role::Caregiver,
        )
    }

    #[rstest]
    #[actix_web::test]
    async fn successful_login_redirects_to_dashboard() {
        let mut ports = MockPorts::new();
        ports
            .accounts
            .expect_login()
            .withf(|credentials| credentials.username() == "alice")
            .times(1)
            .returning(|_| Ok(alice()));
        let app = test::init_service(test_app(ports.into_state())).await;
        let (cookie, token) = anonymous_token(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .cookie(cookie)
                .set_form([
                    ("username", "alice"),
                    ("password", "secret"),
                    ("csrf_token", token.as_str()),
                ])
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res).as_deref(), Some("/dashboard"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("not-the-session-token"))]
    #[actix_web::test]
    async fn login_without_the_form_token_is_refused(#[case] submitted: Option<&str>) {
        let mut ports = MockPorts::new();
        ports.accounts.expect_login().never();
        let app = test::init_service(test_app(ports.into_state())).await;
        let (cookie, _) = anonymous_token(&app).await;
        let mut fields = vec![("username", "alice"), ("password", "secret")];
        if let Some(token) = submitted {
            fields.push(("csrf_token", token));
        }

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .cookie(cookie)
                .set_form(fields)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res).as_deref(), Some("/login"));

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/login")
                .cookie(session_cookie(&res))
                .to_request(),
        )
        .await;
        let view: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(view["flashes"][0]["message"], CSRF_REJECTED);
    }

    #[rstest]
    #[actix_web::test]
    async fn undecodable_form_returns_to_the_page_with_a_notice() {
        let mut ports = MockPorts::new();
        ports.accounts.expect_register().never();
        let app = test::init_service(test_app(ports.into_state())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .insert_header(("content-type", "application/json"))
                .set_payload(r#"{"username":"alice"}"#)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res).as_deref(), Some("/register"));

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/register")
                .cookie(session_cookie(&res))
                .to_request(),
        )
        .await;
        let view: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(view["flashes"][0]["category"], "danger");
    }

    #[rstest]
    #[actix_web::test]
    async fn failed_login_flashes_generic_message() {
        let mut ports = MockPorts::new();
        ports
            .accounts
            .expect_login()
            .returning(|_| Err(Error::invalid_credentials("Invalid username or password")));
        let app = test::init_service(test_app(ports.into_state())).await;
        let (cookie, token) = anonymous_token(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .cookie(cookie)
                .set_form([
                    ("username", "alice"),
                    ("password", "wrong"),
                    ("csrf_token", token.as_str()),
                ])
                .to_request(),
        )
        .await;
        assert_eq!(location(&res).as_deref(), Some("/login"));

        let cookie = session_cookie(&res);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/login").cookie(cookie).to_request(),
        )
        .await;
        let view: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(view["flashes"][0]["message"], "Invalid username or password");
        assert_eq!(view["flashes"][0]["category"], "danger");
    }

    #[rstest]
    #[actix_web::test]
    async fn blank_login_fields_never_reach_the_service() {
        let mut ports = MockPorts::new();
        ports.accounts.expect_login().never();
        let app = test::init_service(test_app(ports.into_state())).await;
        let (cookie, token) = anonymous_token(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .cookie(cookie)
                .set_form([
                    ("username", " "),
                    ("password", ""),
                    ("csrf_token", token.as_str()),
                ])
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res).as_deref(), Some("/login"));
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_registration_returns_to_the_form() {
        let mut ports = MockPorts::new();
        ports
            .accounts
            .expect_register()
            .returning(|_| Err(Error::duplicate_username("Please use a different username.")));
        let app = test::init_service(test_app(ports.into_state())).await;
        let (cookie, token) = anonymous_token(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .cookie(cookie)
                .set_form([
                    ("username", "alice"),
                    ("email", "a@x.com"),
                    ("password", "pw"),
                    ("password2", "pw"),
                    ("role", "caregiver"),
                    ("csrf_token", token.as_str()),
                ])
                .to_request(),
        )
        .await;

        assert_eq!(location(&res).as_deref(), Some("/register"));
    }

    #[rstest]
    #[actix_web::test]
    async fn signed_in_users_skip_the_login_page() {
        let mut ports = MockPorts::new();
        ports.accounts.expect_login().returning(|_| Ok(alice()));
        let app = test::init_service(test_app(ports.into_state())).await;
        let (cookie, token) = anonymous_token(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .cookie(cookie)
                .set_form([
                    ("username", "alice"),
                    ("password", "secret"),
                    ("csrf_token", token.as_str()),
                ])
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&res);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/register").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res).as_deref(), Some("/dashboard"));
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_logout_still_redirects_home() {
        let app = test::init_service(test_app(MockPorts::new().into_state())).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/logout").to_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res).as_deref(), Some("/"));

        let cookie = session_cookie(&res);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/login").cookie(cookie).to_request(),
        )
        .await;
        let view: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(view["flashes"][0]["category"], "info");
        assert_eq!(view["flashes"][0]["message"], "You have been logged out.");
    }

    #[rstest]
    #[actix_web::test]
    async fn form_pages_hand_out_a_stable_token() {
        let app = test::init_service(test_app(MockPorts::new().into_state())).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = session_cookie(&res);
        let first: serde_json::Value = test::read_body_json(res).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/register").cookie(cookie).to_request(),
        )
        .await;
        let second: serde_json::Value = test::read_body_json(res).await;

        let token = first["csrfToken"].as_str().expect("token");
        assert!(!token.is_empty());
        assert_eq!(second["csrfToken"], token);
    }
}
