//! Read-only public mirrors (`/public/...`).
//!
//! Everything here is evaluated as an anonymous caller regardless of any
//! token sent: only published portfolios and the members they expose.

use std::collections::{BTreeMap, HashMap};

use axum::extract::{OriginalUri, Path, Query, State};
use axum::Json;
use chrono::Utc;
use folio_core::access::Operation;
use folio_core::actor::Actor;
use folio_core::error::CoreError;
use folio_core::stats::parse_search_query;
use folio_core::types::DbId;
use folio_core::visibility::{ChildScope, PortfolioScope};
use folio_db::models::competence::Competence;
use folio_db::models::contact::Contact;
use folio_db::models::portfolio::{Portfolio, PublicPortfolioCard, PublicPortfolioData};
use folio_db::models::projet::Projet;
use folio_db::models::stats::{GlobalSearchResults, PlatformStats, PortfolioStats};
use folio_db::repositories::{CompetenceRepo, ContactRepo, PortfolioRepo, ProjetRepo, StatsRepo};
use folio_db::DbPool;

use super::competence::group_by_category;
use super::guard_child;
use super::projet::group_by_language;
use crate::error::{AppError, AppResult};
use crate::query::{
    CompetenceListParams, ContactListParams, PortfolioListParams, ProjetListParams, SearchParams,
};
use crate::response::Page;
use crate::state::AppState;

/// Members shown on each card of the public portfolio list.
const CARD_PRIMARY_CONTACTS: i64 = 3;
const CARD_COMPETENCES: i64 = 5;
const CARD_PROJETS: i64 = 3;

fn by_portfolio<T>(rows: Vec<(DbId, T)>) -> HashMap<DbId, Vec<T>> {
    let mut grouped: HashMap<DbId, Vec<T>> = HashMap::new();
    for (portfolio_id, item) in rows {
        grouped.entry(portfolio_id).or_default().push(item);
    }
    grouped
}

async fn published_or_404(pool: &DbPool, id: DbId) -> AppResult<Portfolio> {
    PortfolioRepo::find_published(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Portfolio",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Portfolios
// ---------------------------------------------------------------------------

/// GET /api/v1/public/portfolios
pub async fn portfolios(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PortfolioListParams>,
) -> AppResult<Json<Page<PublicPortfolioCard>>> {
    let page = params.page_request()?;
    let sort = params.sort()?;
    let filter = params.filter()?;
    let (summaries, total) = PortfolioRepo::list(
        &state.pool,
        PortfolioScope::PublishedOnly,
        &filter,
        sort,
        page.limit(),
        page.offset(),
    )
    .await?;

    let ids: Vec<DbId> = summaries.iter().map(|s| s.id).collect();
    let mut contacts = by_portfolio(
        ContactRepo::list_for_portfolios(&state.pool, &ids, true, CARD_PRIMARY_CONTACTS).await?,
    );
    let mut competences = by_portfolio(
        CompetenceRepo::list_for_portfolios(&state.pool, &ids, true, CARD_COMPETENCES).await?,
    );
    let mut projets = by_portfolio(
        ProjetRepo::list_for_portfolios(&state.pool, &ids, true, CARD_PROJETS).await?,
    );

    let cards = summaries
        .into_iter()
        .map(|summary| {
            let id = summary.id;
            PublicPortfolioCard {
                summary,
                primary_contacts: contacts.remove(&id).unwrap_or_default(),
                visible_competences: competences.remove(&id).unwrap_or_default(),
                public_projets: projets.remove(&id).unwrap_or_default(),
            }
        })
        .collect();

    Ok(Json(Page::new(cards, total, &page, &uri)))
}

/// GET /api/v1/public/portfolios/{id}
///
/// Counts as a view, like the authenticated detail endpoint.
pub async fn portfolio_data(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PublicPortfolioData>> {
    let mut portfolio = published_or_404(&state.pool, id).await?;
    if let Some(count) = PortfolioRepo::increment_view_count(&state.pool, id).await? {
        portfolio.view_count = count;
    }

    let detail = PortfolioRepo::load_detail(&state.pool, portfolio, true).await?;
    Ok(Json(PublicPortfolioData {
        contacts: detail.contacts.clone(),
        competences: detail.competences.clone(),
        projets: detail.projets.clone(),
        portfolio: detail,
    }))
}

/// GET /api/v1/public/portfolios/{id}/contacts
pub async fn portfolio_contacts(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Contact>>> {
    published_or_404(&state.pool, id).await?;
    let contacts = ContactRepo::list_for_portfolio(&state.pool, id, false).await?;
    Ok(Json(contacts))
}

/// GET /api/v1/public/portfolios/{id}/competences
pub async fn portfolio_competences(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Competence>>> {
    published_or_404(&state.pool, id).await?;
    let competences = CompetenceRepo::list_for_portfolio(&state.pool, id, true).await?;
    Ok(Json(competences))
}

/// GET /api/v1/public/portfolios/{id}/projets
pub async fn portfolio_projets(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Projet>>> {
    published_or_404(&state.pool, id).await?;
    let projets = ProjetRepo::list_for_portfolio(&state.pool, id, true).await?;
    Ok(Json(projets))
}

/// GET /api/v1/public/portfolios/{id}/stats
pub async fn portfolio_stats(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PortfolioStats>> {
    let portfolio = published_or_404(&state.pool, id).await?;
    let stats = StatsRepo::portfolio_stats(&state.pool, &portfolio, Utc::now()).await?;
    Ok(Json(stats))
}

// ---------------------------------------------------------------------------
// Child entities
// ---------------------------------------------------------------------------

/// GET /api/v1/public/contacts
pub async fn contacts(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ContactListParams>,
) -> AppResult<Json<Page<Contact>>> {
    let page = params.page_request()?;
    let sort = params.sort()?;
    let (items, total) = ContactRepo::list(
        &state.pool,
        ChildScope::PublishedOnly,
        &params.filter(),
        sort,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(Page::new(items, total, &page, &uri)))
}

/// GET /api/v1/public/contacts/{id}
pub async fn contact(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Contact>> {
    let facts = ContactRepo::facts(&state.pool, id).await?;
    guard_child(facts, &Actor::Anonymous, Operation::Retrieve, "Contact", id)?;
    let contact = ContactRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Contact",
            id,
        }))?;
    Ok(Json(contact))
}

/// GET /api/v1/public/competences
pub async fn competences(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<CompetenceListParams>,
) -> AppResult<Json<Page<Competence>>> {
    let page = params.page_request()?;
    let sort = params.sort()?;
    let (items, total) = CompetenceRepo::list(
        &state.pool,
        ChildScope::PublishedOnly,
        &params.filter(),
        sort,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(Page::new(items, total, &page, &uri)))
}

/// GET /api/v1/public/competences/by-category
pub async fn competences_by_category(
    State(state): State<AppState>,
    Query(params): Query<CompetenceListParams>,
) -> AppResult<Json<BTreeMap<String, Vec<Competence>>>> {
    let items =
        CompetenceRepo::list_all(&state.pool, ChildScope::PublishedOnly, &params.filter()).await?;
    Ok(Json(group_by_category(items)))
}

/// GET /api/v1/public/competences/{id}
pub async fn competence(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Competence>> {
    let facts = CompetenceRepo::facts(&state.pool, id).await?;
    guard_child(facts, &Actor::Anonymous, Operation::Retrieve, "Competence", id)?;
    let competence = CompetenceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Competence",
            id,
        }))?;
    Ok(Json(competence))
}

/// GET /api/v1/public/projets
pub async fn projets(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ProjetListParams>,
) -> AppResult<Json<Page<Projet>>> {
    let page = params.page_request()?;
    let sort = params.sort()?;
    let (items, total) = ProjetRepo::list(
        &state.pool,
        ChildScope::PublishedOnly,
        &params.filter(),
        sort,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(Page::new(items, total, &page, &uri)))
}

/// GET /api/v1/public/projets/by-language
pub async fn projets_by_language(
    State(state): State<AppState>,
    Query(params): Query<ProjetListParams>,
) -> AppResult<Json<BTreeMap<String, Vec<Projet>>>> {
    let items =
        ProjetRepo::list_all(&state.pool, ChildScope::PublishedOnly, &params.filter()).await?;
    Ok(Json(group_by_language(items)))
}

/// GET /api/v1/public/projets/{id}
pub async fn projet(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Projet>> {
    let facts = ProjetRepo::facts(&state.pool, id).await?;
    guard_child(facts, &Actor::Anonymous, Operation::Retrieve, "Projet", id)?;
    let projet = ProjetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Projet",
            id,
        }))?;
    Ok(Json(projet))
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// GET /api/v1/public/stats
pub async fn platform_stats(State(state): State<AppState>) -> AppResult<Json<PlatformStats>> {
    let stats = StatsRepo::platform_stats(&state.pool).await?;
    Ok(Json(stats))
}

/// GET /api/v1/public/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<GlobalSearchResults>> {
    let term = parse_search_query(params.q.as_deref())?;
    let results = StatsRepo::global_search(&state.pool, &term).await?;
    tracing::debug!(term = %term, total = results.counts.total, "Global search");
    Ok(Json(results))
}
