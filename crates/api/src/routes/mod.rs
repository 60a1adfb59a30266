pub mod account;
pub mod admin;
pub mod auth;
pub mod competence;
pub mod contact;
pub mod health;
pub mod portfolio;
pub mod projet;
pub mod public;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/...          register, login, refresh, logout, verify
/// /account/...       profile, password, stats, export, delete
/// /admin/users/...   staff user management
/// /contacts/...      contact CRUD
/// /competences/...   competence CRUD
/// /projets/...       projet CRUD
/// /portfolios/...    portfolio CRUD, lifecycle, duplication, members
/// /public/...        read-only published mirrors
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/account", account::router())
        .nest("/admin", admin::router())
        .nest("/contacts", contact::router())
        .nest("/competences", competence::router())
        .nest("/projets", projet::router())
        .nest("/portfolios", portfolio::router())
        .nest("/public", public::router())
}
