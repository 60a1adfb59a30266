//! Handlers for the `/auth` resource (register, login, refresh, logout, verify).

use axum::extract::State;
use axum::http::{header::USER_AGENT, HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use folio_core::error::CoreError;
use folio_core::validation::{
    normalize_email, validate_email, validate_text, MAX_NAME_LENGTH,
};
use folio_db::models::session::CreateSession;
use folio_db::models::user::{CreateUser, User, UserResponse};
use folio_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{hash_refresh_token, issue_tokens};
use crate::auth::password::{hash_password, validate_new_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    validate_text("first_name", &input.first_name, MAX_NAME_LENGTH)?;
    validate_text("last_name", &input.last_name, MAX_NAME_LENGTH)?;
    validate_new_password(
        &input.password,
        &input.password_confirmation,
        state.config.min_password_length,
    )?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // A concurrent duplicate trips uq_users_email and surfaces as 409.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    let response = create_auth_response(&state, &user, user_agent(&headers)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Unknown email and wrong password share one message so accounts cannot
/// be enumerated.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(&input.email);

    let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? else {
        tracing::warn!(email = %email, "Login failed: unknown email");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    };

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(user_id = user.id, "Login failed: wrong password");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    let response = create_auth_response(&state, &user, user_agent(&headers)).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Rotates the session: the presented token is revoked and a new pair issued.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_active_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let response = create_auth_response(&state, &user, user_agent(&headers)).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/verify
pub async fn verify(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<VerifyResponse>> {
    let user = super::account::load_user(&state, auth_user.user_id).await?;
    Ok(Json(VerifyResponse {
        valid: true,
        user: UserResponse::from(&user),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Issue a token pair, persist its session row, and build the response.
async fn create_auth_response(
    state: &AppState,
    user: &User,
    user_agent: Option<String>,
) -> AppResult<AuthResponse> {
    let tokens = issue_tokens(user.id, user.role(), &state.config.jwt, Utc::now())
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: tokens.refresh_token_hash,
            expires_at: tokens.refresh_expires_at,
            user_agent,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: UserResponse::from(user),
    })
}
