//! Route definitions for the caller's own `/account`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// Routes mounted at `/account`. All require auth.
///
/// ```text
/// DELETE /                 -> delete_account
/// GET    /profile          -> get_profile
/// PUT    /profile          -> update_profile
/// POST   /change-password  -> change_password
/// GET    /stats            -> stats
/// GET    /export           -> export
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", delete(account::delete_account))
        .route(
            "/profile",
            get(account::get_profile).put(account::update_profile),
        )
        .route("/change-password", post(account::change_password))
        .route("/stats", get(account::stats))
        .route("/export", get(account::export))
}
