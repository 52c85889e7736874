//! Patient dashboard.
//!
//! ```text
//! GET /dashboard
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::CurrentUser;
use crate::domain::ports::Dashboard;
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::recover;
use crate::inbound::http::flash::Flash;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// View model for the dashboard page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub user: CurrentUser,
    pub dashboard: Dashboard,
    /// Value to submit as `csrf_token` with the dashboard's forms.
    pub csrf_token: String,
    pub flashes: Vec<Flash>,
}

/// Patient overview: care events, notes and images.
///
/// The default patient is created on first access.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard view", body = DashboardView),
        (status = 302, description = "Not signed in; redirect to /login"),
        (status = 503, description = "Store unavailable", body = crate::domain::Error)
    ),
    tags = ["pages"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    load(&state, &session)
        .await
        .or_else(|error| recover(&session, error, "/"))
}

async fn load(state: &HttpState, session: &SessionContext) -> ApiResult<HttpResponse> {
    let user = session.require_user(state.accounts.as_ref()).await?;
    let view = state.dashboard.dashboard(&user).await?;
    Ok(HttpResponse::Ok().json(DashboardView {
        user,
        dashboard: view,
        csrf_token: session.csrf_token()?,
        flashes: session.take_flashes(),
    }))
}
