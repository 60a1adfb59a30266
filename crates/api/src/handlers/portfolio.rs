//! Handlers for the `/portfolios` resource.
//!
//! Reads go through the visibility scope and the ownership guard; every
//! write requires the caller to own the portfolio. Status changes only
//! happen through `publish` and `delete` (which archives).

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use folio_core::access::{require_portfolio, Operation};
use folio_core::actor::Actor;
use folio_core::error::CoreError;
use folio_core::lifecycle::PortfolioStatus;
use folio_core::types::DbId;
use folio_core::validation::{
    validate_id_list, validate_max_length, validate_optional_url, validate_required,
    validate_text, validate_theme_color, MAX_LAYOUT_TYPE_LENGTH, MAX_META_DESCRIPTION_LENGTH,
    MAX_META_KEYWORDS_LENGTH, MAX_TITLE_LENGTH,
};
use folio_core::visibility::PortfolioScope;
use folio_db::models::portfolio::{
    CreatePortfolio, MemberKind, Portfolio, PortfolioDetail, PortfolioSummary, UpdatePortfolio,
};
use folio_db::models::stats::PortfolioStats;
use folio_db::repositories::{CompetenceRepo, ContactRepo, PortfolioRepo, ProjetRepo, StatsRepo};
use folio_db::DbPool;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, OptionalActor};
use crate::query::PortfolioListParams;
use crate::response::{MessageResponse, Page};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /portfolios/{id}/publish`.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub status: String,
}

/// Request body for the add-member endpoints. Each endpoint reads its own
/// field (`contact_id`, `competence_id` or `projet_id`).
#[derive(Debug, Default, Deserialize)]
pub struct AddMemberRequest {
    pub contact_id: Option<DbId>,
    pub competence_id: Option<DbId>,
    pub projet_id: Option<DbId>,
}

impl AddMemberRequest {
    fn id_for(&self, kind: MemberKind) -> Option<DbId> {
        match kind {
            MemberKind::Contact => self.contact_id,
            MemberKind::Competence => self.competence_id,
            MemberKind::Projet => self.projet_id,
        }
    }
}

fn id_field(kind: MemberKind) -> &'static str {
    match kind {
        MemberKind::Contact => "contact_id",
        MemberKind::Competence => "competence_id",
        MemberKind::Projet => "projet_id",
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

struct ScalarFields<'a> {
    title: Option<&'a str>,
    photo_url: Option<&'a str>,
    theme_color: Option<&'a str>,
    layout_type: Option<&'a str>,
    meta_description: Option<&'a str>,
    meta_keywords: Option<&'a str>,
}

fn validate_scalars(fields: ScalarFields<'_>) -> AppResult<()> {
    if let Some(title) = fields.title {
        validate_text("title", title, MAX_TITLE_LENGTH)?;
    }
    validate_optional_url("photo_url", fields.photo_url)?;
    if let Some(color) = fields.theme_color {
        validate_theme_color(color)?;
    }
    if let Some(layout) = fields.layout_type {
        validate_required("layout_type", layout)?;
        validate_max_length("layout_type", layout, MAX_LAYOUT_TYPE_LENGTH)?;
    }
    if let Some(meta) = fields.meta_description {
        validate_max_length("meta_description", meta, MAX_META_DESCRIPTION_LENGTH)?;
    }
    if let Some(keywords) = fields.meta_keywords {
        validate_max_length("meta_keywords", keywords, MAX_META_KEYWORDS_LENGTH)?;
    }
    Ok(())
}

fn validate_create(input: &CreatePortfolio) -> AppResult<()> {
    validate_scalars(ScalarFields {
        title: Some(&input.title),
        photo_url: input.photo_url.as_deref(),
        theme_color: input.theme_color.as_deref(),
        layout_type: input.layout_type.as_deref(),
        meta_description: input.meta_description.as_deref(),
        meta_keywords: input.meta_keywords.as_deref(),
    })?;
    validate_id_list("contact_ids", &input.contact_ids)?;
    validate_id_list("competence_ids", &input.competence_ids)?;
    validate_id_list("projet_ids", &input.projet_ids)?;
    Ok(())
}

fn validate_update(input: &UpdatePortfolio) -> AppResult<()> {
    validate_scalars(ScalarFields {
        title: input.title.as_deref(),
        photo_url: input.photo_url.as_deref(),
        theme_color: input.theme_color.as_deref(),
        layout_type: input.layout_type.as_deref(),
        meta_description: input.meta_description.as_deref(),
        meta_keywords: input.meta_keywords.as_deref(),
    })?;
    for (field, ids) in [
        ("contact_ids", &input.contact_ids),
        ("competence_ids", &input.competence_ids),
        ("projet_ids", &input.projet_ids),
    ] {
        if let Some(ids) = ids {
            validate_id_list(field, ids)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load(pool: &DbPool, id: DbId) -> AppResult<Portfolio> {
    PortfolioRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Portfolio",
            id,
        }))
}

/// Load a portfolio and check `op` against the ownership guard.
async fn load_guarded(
    pool: &DbPool,
    actor: &Actor,
    id: DbId,
    op: Operation,
) -> AppResult<Portfolio> {
    let portfolio = load(pool, id).await?;
    require_portfolio(actor, &portfolio.facts()?, op, id)?;
    Ok(portfolio)
}

/// Full detail as seen by `actor`: non-owners only see public members.
async fn detail_for(
    pool: &DbPool,
    actor: &Actor,
    portfolio: Portfolio,
) -> AppResult<PortfolioDetail> {
    let public_members = !actor.owns(portfolio.owner_id);
    Ok(PortfolioRepo::load_detail(pool, portfolio, public_members).await?)
}

/// Owner of a child entity, or `None` if it does not exist.
async fn child_owner(pool: &DbPool, kind: MemberKind, id: DbId) -> AppResult<Option<DbId>> {
    let facts = match kind {
        MemberKind::Contact => ContactRepo::facts(pool, id).await?,
        MemberKind::Competence => CompetenceRepo::facts(pool, id).await?,
        MemberKind::Projet => ProjetRepo::facts(pool, id).await?,
    };
    Ok(facts.map(|f| f.owner_id))
}

async fn list_scoped(
    state: &AppState,
    scope: PortfolioScope,
    params: &PortfolioListParams,
    uri: &axum::http::Uri,
) -> AppResult<Page<PortfolioSummary>> {
    let page = params.page_request()?;
    let sort = params.sort()?;
    let filter = params.filter()?;
    let (items, total) = PortfolioRepo::list(
        &state.pool,
        scope,
        &filter,
        sort,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Page::new(items, total, &page, uri))
}

// ---------------------------------------------------------------------------
// Collection handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/portfolios
///
/// Anonymous: published only. Users: published or their own. Staff: all.
pub async fn list(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PortfolioListParams>,
) -> AppResult<Json<Page<PortfolioSummary>>> {
    let page = list_scoped(&state, PortfolioScope::for_actor(&actor), &params, &uri).await?;
    Ok(Json(page))
}

/// GET /api/v1/portfolios/published
pub async fn published(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PortfolioListParams>,
) -> AppResult<Json<Page<PortfolioSummary>>> {
    let page = list_scoped(&state, PortfolioScope::PublishedOnly, &params, &uri).await?;
    Ok(Json(page))
}

/// GET /api/v1/portfolios/search?competence=&language=&level=&category=
///
/// Published portfolios whose members match the given predicates.
pub async fn search(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PortfolioListParams>,
) -> AppResult<Json<Page<PortfolioSummary>>> {
    let page = list_scoped(&state, PortfolioScope::PublishedOnly, &params, &uri).await?;
    Ok(Json(page))
}

/// POST /api/v1/portfolios
///
/// Creates the caller's only portfolio as a draft with its member sets.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreatePortfolio>,
) -> AppResult<(StatusCode, Json<PortfolioDetail>)> {
    validate_create(&input)?;

    let portfolio = PortfolioRepo::create(&state.pool, auth_user.user_id, &input).await?;
    tracing::info!(
        portfolio_id = portfolio.id,
        owner_id = portfolio.owner_id,
        slug = %portfolio.slug,
        "Portfolio created"
    );

    let detail = PortfolioRepo::load_detail(&state.pool, portfolio, false).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/portfolios/mine
pub async fn mine(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<PortfolioDetail>> {
    let portfolio = PortfolioRepo::find_by_owner(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Missing(
                "You do not have a portfolio yet".into(),
            ))
        })?;
    let detail = PortfolioRepo::load_detail(&state.pool, portfolio, false).await?;
    Ok(Json(detail))
}

// ---------------------------------------------------------------------------
// Item handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/portfolios/{id}
///
/// Every successful read of a published portfolio counts as a view,
/// including the owner's own.
pub async fn get_by_id(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<PortfolioDetail>> {
    let mut portfolio = load_guarded(&state.pool, &actor, id, Operation::Retrieve).await?;

    if portfolio.is_published() {
        if let Some(count) = PortfolioRepo::increment_view_count(&state.pool, id).await? {
            portfolio.view_count = count;
        }
    }

    let detail = detail_for(&state.pool, &actor, portfolio).await?;
    Ok(Json(detail))
}

/// PUT /api/v1/portfolios/{id}
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePortfolio>,
) -> AppResult<Json<PortfolioDetail>> {
    let actor = auth_user.actor();
    load_guarded(&state.pool, &actor, id, Operation::Update).await?;
    validate_update(&input)?;

    let portfolio = PortfolioRepo::update(&state.pool, id, &input).await?;
    tracing::debug!(portfolio_id = id, "Portfolio updated");

    let detail = PortfolioRepo::load_detail(&state.pool, portfolio, false).await?;
    Ok(Json(detail))
}

/// DELETE /api/v1/portfolios/{id}
///
/// Archives instead of deleting the row.
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let actor = auth_user.actor();
    load_guarded(&state.pool, &actor, id, Operation::Delete).await?;

    PortfolioRepo::transition(&state.pool, id, PortfolioStatus::Archived, Utc::now()).await?;
    tracing::info!(portfolio_id = id, "Portfolio archived");

    Ok(Json(MessageResponse::new("Portfolio archived successfully")))
}

/// POST /api/v1/portfolios/{id}/publish
///
/// Body `{"status": "draft" | "published" | "archived"}`.
pub async fn publish(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<PublishRequest>,
) -> AppResult<Json<PortfolioDetail>> {
    let target: PortfolioStatus = input.status.trim().parse()?;
    let actor = auth_user.actor();
    let before = load_guarded(&state.pool, &actor, id, Operation::Update).await?;

    let portfolio = PortfolioRepo::transition(&state.pool, id, target, Utc::now()).await?;

    if before.status != portfolio.status {
        match target {
            PortfolioStatus::Published => {
                tracing::info!(portfolio_id = id, "Portfolio published");
            }
            PortfolioStatus::Draft => {
                tracing::info!(portfolio_id = id, "Portfolio unpublished");
            }
            PortfolioStatus::Archived => {
                tracing::info!(portfolio_id = id, "Portfolio archived");
            }
        }
    }

    let detail = PortfolioRepo::load_detail(&state.pool, portfolio, false).await?;
    Ok(Json(detail))
}

/// POST /api/v1/portfolios/{id}/duplicate
///
/// Deep-copies a readable portfolio into a new draft owned by the caller.
pub async fn duplicate(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<PortfolioDetail>)> {
    let actor = auth_user.actor();
    load_guarded(&state.pool, &actor, id, Operation::Retrieve).await?;

    let copy = PortfolioRepo::duplicate(&state.pool, id, auth_user.user_id).await?;
    tracing::info!(
        source_id = id,
        portfolio_id = copy.id,
        owner_id = copy.owner_id,
        "Portfolio duplicated"
    );

    let detail = PortfolioRepo::load_detail(&state.pool, copy, false).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/portfolios/{id}/stats
pub async fn stats(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<PortfolioStats>> {
    let portfolio = load_guarded(&state.pool, &actor, id, Operation::Retrieve).await?;
    let stats = StatsRepo::portfolio_stats(&state.pool, &portfolio, Utc::now()).await?;
    Ok(Json(stats))
}

// ---------------------------------------------------------------------------
// Membership handlers
// ---------------------------------------------------------------------------

async fn add_member(
    state: &AppState,
    auth_user: &AuthUser,
    id: DbId,
    kind: MemberKind,
    input: &AddMemberRequest,
) -> AppResult<Json<PortfolioDetail>> {
    let actor = auth_user.actor();
    let portfolio = load_guarded(&state.pool, &actor, id, Operation::Update).await?;

    let child_id = input
        .id_for(kind)
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", id_field(kind))))?;

    let owner = child_owner(&state.pool, kind, child_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: kind.entity(),
            id: child_id,
        }))?;
    if owner != portfolio.owner_id {
        return Err(AppError::Core(CoreError::not_owner(kind.entity())));
    }

    let added = PortfolioRepo::add_member(&state.pool, id, kind, child_id).await?;
    tracing::debug!(portfolio_id = id, child_id, kind = kind.entity(), added, "Member added");

    let portfolio = load(&state.pool, id).await?;
    let detail = PortfolioRepo::load_detail(&state.pool, portfolio, false).await?;
    Ok(Json(detail))
}

async fn remove_member(
    state: &AppState,
    auth_user: &AuthUser,
    id: DbId,
    kind: MemberKind,
    child_id: DbId,
) -> AppResult<StatusCode> {
    let actor = auth_user.actor();
    load_guarded(&state.pool, &actor, id, Operation::Update).await?;

    let removed = PortfolioRepo::remove_member(&state.pool, id, kind, child_id).await?;
    tracing::debug!(portfolio_id = id, child_id, kind = kind.entity(), removed, "Member removed");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/portfolios/{id}/contacts
pub async fn add_contact(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AddMemberRequest>,
) -> AppResult<Json<PortfolioDetail>> {
    add_member(&state, &auth_user, id, MemberKind::Contact, &input).await
}

/// POST /api/v1/portfolios/{id}/competences
pub async fn add_competence(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AddMemberRequest>,
) -> AppResult<Json<PortfolioDetail>> {
    add_member(&state, &auth_user, id, MemberKind::Competence, &input).await
}

/// POST /api/v1/portfolios/{id}/projets
pub async fn add_projet(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AddMemberRequest>,
) -> AppResult<Json<PortfolioDetail>> {
    add_member(&state, &auth_user, id, MemberKind::Projet, &input).await
}

/// DELETE /api/v1/portfolios/{id}/contacts/{contact_id}
pub async fn remove_contact(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, child_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    remove_member(&state, &auth_user, id, MemberKind::Contact, child_id).await
}

/// DELETE /api/v1/portfolios/{id}/competences/{competence_id}
pub async fn remove_competence(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, child_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    remove_member(&state, &auth_user, id, MemberKind::Competence, child_id).await
}

/// DELETE /api/v1/portfolios/{id}/projets/{projet_id}
pub async fn remove_projet(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, child_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    remove_member(&state, &auth_user, id, MemberKind::Projet, child_id).await
}
