//! Route definitions for the `/portfolios` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::portfolio;
use crate::state::AppState;

/// Routes mounted at `/portfolios`.
///
/// ```text
/// GET, POST          /                                   -> list, create
/// GET                /mine                               -> mine
/// GET                /published                          -> published
/// GET                /search                             -> search
/// GET, PUT, DELETE   /{id}                               -> get_by_id, update, delete (archive)
/// POST               /{id}/publish                       -> publish
/// POST               /{id}/duplicate                     -> duplicate
/// GET                /{id}/stats                         -> stats
/// POST               /{id}/contacts                      -> add_contact
/// DELETE             /{id}/contacts/{contact_id}         -> remove_contact
/// POST               /{id}/competences                   -> add_competence
/// DELETE             /{id}/competences/{competence_id}   -> remove_competence
/// POST               /{id}/projets                       -> add_projet
/// DELETE             /{id}/projets/{projet_id}           -> remove_projet
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(portfolio::list).post(portfolio::create))
        .route("/mine", get(portfolio::mine))
        .route("/published", get(portfolio::published))
        .route("/search", get(portfolio::search))
        .route(
            "/{id}",
            get(portfolio::get_by_id)
                .put(portfolio::update)
                .delete(portfolio::delete),
        )
        .route("/{id}/publish", post(portfolio::publish))
        .route("/{id}/duplicate", post(portfolio::duplicate))
        .route("/{id}/stats", get(portfolio::stats))
        .route("/{id}/contacts", post(portfolio::add_contact))
        .route(
            "/{id}/contacts/{contact_id}",
            delete(portfolio::remove_contact),
        )
        .route("/{id}/competences", post(portfolio::add_competence))
        .route(
            "/{id}/competences/{competence_id}",
            delete(portfolio::remove_competence),
        )
        .route("/{id}/projets", post(portfolio::add_projet))
        .route(
            "/{id}/projets/{projet_id}",
            delete(portfolio::remove_projet),
        )
}
