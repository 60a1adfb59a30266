//! Route definitions for the `/projets` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::projet;
use crate::state::AppState;

/// Routes mounted at `/projets`.
///
/// ```text
/// GET, POST          /        -> list, create
/// GET                /public  -> public
/// GET, PUT, DELETE   /{id}    -> get_by_id, update, delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projet::list).post(projet::create))
        .route("/public", get(projet::public))
        .route(
            "/{id}",
            get(projet::get_by_id)
                .put(projet::update)
                .delete(projet::delete),
        )
}
