//! Care event and note creation.
//!
//! ```text
//! POST /add_care_event  title=...&description=...&start_time=...&end_time=...&csrf_token=...
//! POST /add_note        content=...&csrf_token=...
//! ```

use actix_web::{HttpResponse, post, web};

use crate::domain::{CareEventForm, NoteForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::csrf::Protected;
use crate::inbound::http::error::{DASHBOARD_PATH, recover, redirect};
use crate::inbound::http::flash::Flash;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Record a care event for the patient.
#[utoipa::path(
    post,
    path = "/add_care_event",
    request_body(content = CareEventForm, content_type = "application/x-www-form-urlencoded",
        description = "Care event fields plus the page's `csrf_token`"),
    responses((status = 302, description = "Redirect to /dashboard")),
    tags = ["care records"],
    operation_id = "addCareEvent"
)]
#[post("/add_care_event")]
pub async fn add_care_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<Protected<CareEventForm>>,
) -> ApiResult<HttpResponse> {
    create_care_event(&state, &session, form.into_inner())
        .await
        .or_else(|error| recover(&session, error, DASHBOARD_PATH))
}

async fn create_care_event(
    state: &HttpState,
    session: &SessionContext,
    form: Protected<CareEventForm>,
) -> ApiResult<HttpResponse> {
    session.verify_csrf(form.token())?;
    let user = session.require_user(state.accounts.as_ref()).await?;
    state
        .care_records
        .add_care_event(&user, form.into_form())
        .await?;
    session.flash(Flash::success("Care event added successfully"));
    Ok(redirect(DASHBOARD_PATH))
}

/// Add a note stamped with the current time.
#[utoipa::path(
    post,
    path = "/add_note",
    request_body(content = NoteForm, content_type = "application/x-www-form-urlencoded",
        description = "Note text plus the page's `csrf_token`"),
    responses((status = 302, description = "Redirect to /dashboard")),
    tags = ["care records"],
    operation_id = "addNote"
)]
#[post("/add_note")]
pub async fn add_note(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<Protected<NoteForm>>,
) -> ApiResult<HttpResponse> {
    create_note(&state, &session, form.into_inner())
        .await
        .or_else(|error| recover(&session, error, DASHBOARD_PATH))
}

async fn create_note(
    state: &HttpState,
    session: &SessionContext,
    form: Protected<NoteForm>,
) -> ApiResult<HttpResponse> {
    session.verify_csrf(form.token())?;
    let user = session.require_user(state.accounts.as_ref()).await?;
    state.care_records.add_note(&user, form.into_form()).await?;
    session.flash(Flash::success("Note added successfully"));
    Ok(redirect(DASHBOARD_PATH))
}
