//! Public landing page.
//!
//! ```text
//! GET /
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::CurrentUser;
use crate::inbound::http::ApiResult;
use crate::inbound::http::flash::Flash;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// View model for the landing page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexView {
    /// Signed-in user, absent for anonymous visitors.
    pub user: Option<CurrentUser>,
    pub flashes: Vec<Flash>,
}

/// Landing page; open to everyone.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Landing page view", body = IndexView),
        (status = 503, description = "Account store unavailable", body = crate::domain::Error)
    ),
    tags = ["pages"],
    operation_id = "index",
    security([])
)]
#[get("/")]
pub async fn index(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<IndexView>> {
    let user = session.current_user(state.accounts.as_ref()).await?;
    Ok(web::Json(IndexView {
        user,
        flashes: session.take_flashes(),
    }))
}
