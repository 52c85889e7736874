//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] describes the page and form endpoints together with the JSON
//! view models they return to an external renderer. Form endpoints answer
//! with redirects and carry their outcome as flash notices in the session.
//!
//! The generated document is served by Swagger UI in debug builds.

use crate::domain::ports::{Dashboard, UserSummary};
use crate::domain::{
    CareEvent, CareEventForm, CurrentUser, Error, ErrorCode, Image, LoginForm, Note, NoteForm,
    Patient, RegistrationForm, Role,
};
use crate::inbound::http::auth::FormPageView;
use crate::inbound::http::admin::UserManagementView;
use crate::inbound::http::dashboard::DashboardView;
use crate::inbound::http::flash::{Flash, FlashCategory};
use crate::inbound::http::pages::IndexView;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /login.",
            ))),
        );
    }
}

/// OpenAPI document for the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Carelog",
        description = "Caregiving log for one patient: accounts, care events, notes and images.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::pages::index,
        crate::inbound::http::auth::login_page,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::register_page,
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::logout,
        crate::inbound::http::dashboard::dashboard,
        crate::inbound::http::care_records::add_care_event,
        crate::inbound::http::care_records::add_note,
        crate::inbound::http::images::upload_image,
        crate::inbound::http::images::serve_image,
        crate::inbound::http::images::delete_image,
        crate::inbound::http::admin::user_management,
        crate::inbound::http::admin::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Flash,
        FlashCategory,
        IndexView,
        FormPageView,
        DashboardView,
        UserManagementView,
        Dashboard,
        Patient,
        CareEvent,
        Note,
        Image,
        CurrentUser,
        Role,
        UserSummary,
        Error,
        ErrorCode,
        LoginForm,
        RegistrationForm,
        CareEventForm,
        NoteForm,
    )),
    tags(
        (name = "pages", description = "Landing and dashboard views"),
        (name = "auth", description = "Registration, login and logout"),
        (name = "care records", description = "Care events and notes"),
        (name = "images", description = "Image upload, download and removal"),
        (name = "admin", description = "User management for administrators"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
