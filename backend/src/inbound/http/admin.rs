//! Administrator user management.
//!
//! ```text
//! GET /user_management
//! GET /delete_user/{id}
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{DeleteUserOutcome, UserSummary};
use crate::domain::{CurrentUser, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::{DASHBOARD_PATH, recover, redirect};
use crate::inbound::http::flash::Flash;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const USER_MANAGEMENT_PATH: &str = "/user_management";

/// View model for the user management page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserManagementView {
    pub user: CurrentUser,
    pub users: Vec<UserSummary>,
    pub flashes: Vec<Flash>,
}

/// List every account. Administrators only.
#[utoipa::path(
    get,
    path = "/user_management",
    responses(
        (status = 200, description = "User management view", body = UserManagementView),
        (status = 302, description = "Not signed in, or not an administrator")
    ),
    tags = ["admin"],
    operation_id = "userManagement"
)]
#[get("/user_management")]
pub async fn user_management(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    list(&state, &session)
        .await
        .or_else(|error| recover(&session, error, DASHBOARD_PATH))
}

async fn list(state: &HttpState, session: &SessionContext) -> ApiResult<HttpResponse> {
    let user = session.require_user(state.accounts.as_ref()).await?;
    let users = state.admin.list_users(&user).await?;
    Ok(HttpResponse::Ok().json(UserManagementView {
        user,
        users,
        flashes: session.take_flashes(),
    }))
}

/// Delete a non-admin account. Administrators only.
#[utoipa::path(
    get,
    path = "/delete_user/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 302, description = "Redirect to /user_management"),
        (status = 404, description = "No such user", body = crate::domain::Error)
    ),
    tags = ["admin"],
    operation_id = "deleteUser"
)]
#[get("/delete_user/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let target = UserId::new(path.into_inner());
    remove(&state, &session, target)
        .await
        .or_else(|error| recover(&session, error, USER_MANAGEMENT_PATH))
}

async fn remove(
    state: &HttpState,
    session: &SessionContext,
    target: UserId,
) -> ApiResult<HttpResponse> {
    let user = session.require_user(state.accounts.as_ref()).await?;
    match state.admin.delete_user(&user, target).await? {
        DeleteUserOutcome::Deleted => {
            session.flash(Flash::success("User deleted successfully"));
        }
        DeleteUserOutcome::AdminProtected => {
            session.flash(Flash::danger("Cannot delete admin users"));
        }
    }
    Ok(redirect(USER_MANAGEMENT_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, Role};
    use crate::inbound::http::test_utils::{MockPorts, location, session_cookie, sign_in, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[actix_web::test]
    async fn caregivers_are_sent_back_to_the_dashboard() {
        let mut ports = MockPorts::new().signed_in_as_caregiver();
        ports
            .admin
            .expect_list_users()
            .returning(|_| Err(Error::forbidden("Administrator access required.")));
        let app = test::init_service(test_app(ports.into_state())).await;
        let cookie = sign_in(&app, 1).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/user_management").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res).as_deref(), Some("/dashboard"));
    }

    #[rstest]
    #[case(DeleteUserOutcome::Deleted, "success", "User deleted successfully")]
    #[case(DeleteUserOutcome::AdminProtected, "danger", "Cannot delete admin users")]
    #[actix_web::test]
    async fn delete_outcomes_flash_on_user_management(
        #[case] outcome: DeleteUserOutcome,
        #[case] category: &str,
        #[case] message: &str,
    ) {
        let mut ports = MockPorts::new().signed_in_as(Role::Admin);
        ports
            .admin
            .expect_delete_user()
            .withf(|_, target| *target == UserId::new(2))
            .returning(move |_, _| Ok(outcome));
        ports.admin.expect_list_users().returning(|_| Ok(Vec::new()));
        let app = test::init_service(test_app(ports.into_state())).await;
        let cookie = sign_in(&app, 1).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/delete_user/2").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(location(&res).as_deref(), Some("/user_management"));

        let cookie = session_cookie(&res);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/user_management").cookie(cookie).to_request(),
        )
        .await;
        let view: Value = test::read_body_json(res).await;
        assert_eq!(view["flashes"][0]["category"], category);
        assert_eq!(view["flashes"][0]["message"], message);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_user_is_not_found() {
        let mut ports = MockPorts::new().signed_in_as(Role::Admin);
        ports
            .admin
            .expect_delete_user()
            .returning(|_, _| Err(Error::not_found("user 42 not found")));
        let app = test::init_service(test_app(ports.into_state())).await;
        let cookie = sign_in(&app, 1).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/delete_user/42").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
