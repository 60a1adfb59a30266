//! Handlers for the caller's own account (`/account`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use folio_core::error::CoreError;
use folio_core::types::DbId;
use folio_core::validation::{validate_text, MAX_NAME_LENGTH};
use folio_core::visibility::ChildScope;
use folio_db::models::competence::{Competence, CompetenceFilter};
use folio_db::models::contact::{Contact, ContactFilter};
use folio_db::models::portfolio::Portfolio;
use folio_db::models::projet::{Projet, ProjetFilter};
use folio_db::models::stats::AccountStats;
use folio_db::models::user::{UpdateProfile, User, UserResponse};
use folio_db::repositories::{
    CompetenceRepo, ContactRepo, PortfolioRepo, ProjetRepo, SessionRepo, StatsRepo, UserRepo,
};
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, validate_new_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(default)]
    pub password: String,
}

/// Everything the caller owns, as returned by `GET /account/export`.
#[derive(Debug, Serialize)]
pub struct AccountExport {
    pub profile: UserResponse,
    pub contacts: Vec<Contact>,
    pub competences: Vec<Competence>,
    pub projets: Vec<Projet>,
    pub portfolio: Option<Portfolio>,
    pub exported_at: chrono::DateTime<chrono::Utc>,
}

/// Load a user by id. A token for a deleted user is treated as unauthenticated.
pub(crate) async fn load_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))
}

/// GET /api/v1/account/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = load_user(&state, auth_user.user_id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/v1/account/profile
///
/// Only names are editable here; the email is immutable.
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<UserResponse>> {
    if let Some(first) = &input.first_name {
        validate_text("first_name", first, MAX_NAME_LENGTH)?;
    }
    if let Some(last) = &input.last_name {
        validate_text("last_name", last, MAX_NAME_LENGTH)?;
    }

    let user = UserRepo::update_profile(&state.pool, auth_user.user_id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/v1/account/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user = load_user(&state, auth_user.user_id).await?;

    let current_ok = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_ok {
        return Err(AppError::Core(CoreError::Validation(
            "Current password is incorrect".into(),
        )));
    }

    validate_new_password(
        &input.new_password,
        &input.confirm_password,
        state.config.min_password_length,
    )?;

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &new_hash).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// GET /api/v1/account/stats
pub async fn stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<AccountStats>> {
    let user = load_user(&state, auth_user.user_id).await?;
    let stats = StatsRepo::account_stats(&state.pool, &user).await?;
    Ok(Json(stats))
}

/// GET /api/v1/account/export
pub async fn export(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<AccountExport>> {
    let user = load_user(&state, auth_user.user_id).await?;
    let scope = ChildScope::OwnedBy(user.id);

    let contacts = ContactRepo::list_all(&state.pool, scope, &ContactFilter::default()).await?;
    let competences =
        CompetenceRepo::list_all(&state.pool, scope, &CompetenceFilter::default()).await?;
    let projets = ProjetRepo::list_all(&state.pool, scope, &ProjetFilter::default()).await?;
    let portfolio = PortfolioRepo::find_by_owner(&state.pool, user.id).await?;

    Ok(Json(AccountExport {
        profile: UserResponse::from(&user),
        contacts,
        competences,
        projets,
        portfolio,
        exported_at: chrono::Utc::now(),
    }))
}

/// DELETE /api/v1/account
///
/// Requires the current password. Cascades to the portfolio, children,
/// memberships and sessions.
pub async fn delete_account(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<DeleteAccountRequest>,
) -> AppResult<StatusCode> {
    let user = load_user(&state, auth_user.user_id).await?;

    if input.password.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Password is required to delete the account".into(),
        )));
    }
    let password_ok = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_ok {
        return Err(AppError::Core(CoreError::Validation(
            "Password is incorrect".into(),
        )));
    }

    SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;
    UserRepo::delete(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}
