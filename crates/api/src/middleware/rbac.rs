//! Staff-only gate for the `/admin` routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use folio_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated caller whose token carries the `staff` or `admin` role.
///
/// Missing or invalid tokens are 401 (from [`AuthUser`]); a valid token
/// for a plain user is 403. The role is read from the token, so a promotion
/// takes effect on the next login.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.is_staff() {
            return Ok(RequireStaff(user));
        }
        tracing::warn!(user_id = user.user_id, path = %parts.uri.path(), "Staff route denied");
        Err(AppError::Core(CoreError::Forbidden(
            "Staff role required".into(),
        )))
    }
}
