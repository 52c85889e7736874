//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use carelog::Trace;
#[cfg(debug_assertions)]
use carelog::doc::ApiDoc;
use carelog::inbound::http::configure;
use carelog::inbound::http::health::{HealthState, live, ready};
use carelog::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(session)
        .wrap(Trace)
        .service(ready)
        .service(live)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when the upload directory cannot be opened
/// or binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! End-to-end wiring tests for the assembled application.

    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use std::sync::Arc;

    use carelog::domain::CredentialStore;
    use carelog::inbound::http::state::DrivenPorts;
    use carelog::outbound::memory::InMemoryStore;
    use carelog::outbound::storage::CapStdImageStore;
    use mockable::DefaultClock;

    fn deps(upload_dir: &std::path::Path) -> AppDependencies {
        let store = Arc::new(InMemoryStore::new());
        let ports = DrivenPorts {
            users: store.clone(),
            patients: store.clone(),
            care_events: store.clone(),
            notes: store.clone(),
            images: store,
            image_store: Arc::new(CapStdImageStore::open(upload_dir).expect("image store")),
        };
        let health = HealthState::new();
        health.mark_ready();
        AppDependencies {
            health_state: web::Data::new(health),
            http_state: web::Data::new(HttpState::from_driven_ports(
                ports,
                Arc::new(CredentialStore::low_cost()),
                Arc::new(DefaultClock),
            )),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    #[rstest]
    #[case("/health/live", StatusCode::OK)]
    #[case("/health/ready", StatusCode::OK)]
    #[case("/", StatusCode::OK)]
    #[case("/login", StatusCode::OK)]
    #[case("/dashboard", StatusCode::FOUND)]
    #[actix_web::test]
    async fn routes_are_mounted(#[case] path: &str, #[case] expected: StatusCode) {
        let dir = tempfile::tempdir().expect("temp dir");
        let app = test::init_service(build_app(deps(dir.path()))).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;

        assert_eq!(res.status(), expected);
        assert!(res.headers().contains_key("trace-id"));
    }

    #[actix_web::test]
    async fn session_cookie_is_private_and_http_only() {
        let dir = tempfile::tempdir().expect("temp dir");
        let app = test::init_service(build_app(deps(dir.path()))).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/dashboard").to_request(),
        )
        .await;

        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("flash stored in session cookie");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.max_age().is_some());
    }
}
