//! Route definitions for the `/competences` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::competence;
use crate::state::AppState;

/// Routes mounted at `/competences`.
///
/// ```text
/// GET, POST          /             -> list, create
/// GET                /by-category  -> by_category
/// GET, PUT, DELETE   /{id}         -> get_by_id, update, delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(competence::list).post(competence::create))
        .route("/by-category", get(competence::by_category))
        .route(
            "/{id}",
            get(competence::get_by_id)
                .put(competence::update)
                .delete(competence::delete),
        )
}
