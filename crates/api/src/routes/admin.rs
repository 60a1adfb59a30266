//! Route definitions for staff user management.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Staff only.
///
/// ```text
/// GET    /users       -> list_users
/// GET    /users/{id}  -> get_user
/// PUT    /users/{id}  -> update_user
/// DELETE /users/{id}  -> delete_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
}
