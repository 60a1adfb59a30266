//! Route definitions for the read-only `/public` mirrors.

use axum::routing::get;
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// Routes mounted at `/public`. No auth required.
///
/// ```text
/// GET /portfolios                     -> portfolios (cards)
/// GET /portfolios/{id}                -> portfolio_data
/// GET /portfolios/{id}/contacts       -> portfolio_contacts
/// GET /portfolios/{id}/competences    -> portfolio_competences
/// GET /portfolios/{id}/projets        -> portfolio_projets
/// GET /portfolios/{id}/stats          -> portfolio_stats
/// GET /contacts, /contacts/{id}
/// GET /competences, /competences/by-category, /competences/{id}
/// GET /projets, /projets/by-language, /projets/{id}
/// GET /stats                          -> platform_stats
/// GET /search?q=                      -> search
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/portfolios", get(public::portfolios))
        .route("/portfolios/{id}", get(public::portfolio_data))
        .route("/portfolios/{id}/contacts", get(public::portfolio_contacts))
        .route(
            "/portfolios/{id}/competences",
            get(public::portfolio_competences),
        )
        .route("/portfolios/{id}/projets", get(public::portfolio_projets))
        .route("/portfolios/{id}/stats", get(public::portfolio_stats))
        .route("/contacts", get(public::contacts))
        .route("/contacts/{id}", get(public::contact))
        .route("/competences", get(public::competences))
        .route(
            "/competences/by-category",
            get(public::competences_by_category),
        )
        .route("/competences/{id}", get(public::competence))
        .route("/projets", get(public::projets))
        .route("/projets/by-language", get(public::projets_by_language))
        .route("/projets/{id}", get(public::projet))
        .route("/stats", get(public::platform_stats))
        .route("/search", get(public::search))
}
