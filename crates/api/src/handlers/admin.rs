//! Staff-only user management (`/admin/users`).

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::error::CoreError;
use folio_core::types::DbId;
use folio_db::models::user::{AdminUpdateUser, UserResponse};
use folio_db::repositories::{SessionRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::query::PageParams;
use crate::response::Page;
use crate::state::AppState;

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<UserResponse>>> {
    let page = params.page_request()?;
    let (users, total) = UserRepo::list(&state.pool, page.limit(), page.offset()).await?;
    let results = users.iter().map(UserResponse::from).collect();
    Ok(Json(Page::new(results, total, &page, &uri)))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<AdminUpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::admin_update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(
        user_id = id,
        admin_id = staff.user_id,
        is_active = user.is_active,
        is_staff = user.is_staff,
        "User updated by staff"
    );
    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Removes the user with everything they own and revokes their sessions.
/// Staff delete their own account through `DELETE /account` instead, which
/// asks for the password.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == staff.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Staff cannot delete their own account from the admin endpoint".into(),
        )));
    }

    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    tracing::info!(user_id = id, admin_id = staff.user_id, "User deleted by staff");
    Ok(StatusCode::NO_CONTENT)
}
