//! JWT-based authentication extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use folio_core::actor::Actor;
use folio_core::error::CoreError;
use folio_core::roles::is_staff_role;
use folio_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user taken from the `Authorization: Bearer` header.
///
/// ```ignore
/// async fn handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Role name from the token (`"admin"`, `"staff"` or `"user"`).
    pub role: String,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::User {
            id: self.user_id,
            is_staff: is_staff_role(&self.role),
        }
    }

    pub fn is_staff(&self) -> bool {
        is_staff_role(&self.role)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;
        decode_bearer(header, state)
    }
}

/// The request's [`Actor`]: anonymous when no `Authorization` header is sent.
///
/// A header that is present but malformed, expired or forged is still a 401;
/// it never silently degrades to anonymous.
#[derive(Debug, Clone, Copy)]
pub struct OptionalActor(pub Actor);

impl FromRequestParts<AppState> for OptionalActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get("authorization") else {
            return Ok(OptionalActor(Actor::Anonymous));
        };
        let header = header.to_str().map_err(|_| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization header".into(),
            ))
        })?;
        Ok(OptionalActor(decode_bearer(header, state)?.actor()))
    }
}

fn decode_bearer(header: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let token = header.strip_prefix("Bearer ").map(str::trim).ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })?;

    let claims = validate_token(token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    Ok(AuthUser {
        user_id: claims.sub,
        role: claims.role,
    })
}
