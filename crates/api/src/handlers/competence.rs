//! Handlers for the `/competences` resource.

use std::collections::BTreeMap;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::access::Operation;
use folio_core::catalog::{validate_category, validate_level};
use folio_core::error::CoreError;
use folio_core::types::DbId;
use folio_core::validation::{validate_non_negative, validate_text, MAX_COMPETENCE_NAME_LENGTH};
use folio_core::visibility::ChildScope;
use folio_db::models::competence::{Competence, CreateCompetence, UpdateCompetence};
use folio_db::repositories::CompetenceRepo;

use super::{check_display_order, guard_child};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, OptionalActor};
use crate::query::CompetenceListParams;
use crate::response::Page;
use crate::state::AppState;

const ENTITY: &str = "Competence";

/// Group competences by category, preserving list order inside each group.
pub(crate) fn group_by_category(items: Vec<Competence>) -> BTreeMap<String, Vec<Competence>> {
    let mut grouped: BTreeMap<String, Vec<Competence>> = BTreeMap::new();
    for item in items {
        grouped.entry(item.category.clone()).or_default().push(item);
    }
    grouped
}

fn validate_fields(
    name: Option<&str>,
    level: Option<&str>,
    category: Option<&str>,
    years_experience: Option<i32>,
    display_order: Option<i32>,
) -> AppResult<()> {
    if let Some(name) = name {
        validate_text("name", name, MAX_COMPETENCE_NAME_LENGTH)?;
    }
    if let Some(level) = level {
        validate_level(level)?;
    }
    if let Some(category) = category {
        validate_category(category)?;
    }
    if let Some(years) = years_experience {
        validate_non_negative("years_experience", years)?;
    }
    check_display_order(display_order)
}

/// GET /api/v1/competences
pub async fn list(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<CompetenceListParams>,
) -> AppResult<Json<Page<Competence>>> {
    let page = params.page_request()?;
    let sort = params.sort()?;
    let (items, total) = CompetenceRepo::list(
        &state.pool,
        ChildScope::for_actor(&actor),
        &params.filter(),
        sort,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(Page::new(items, total, &page, &uri)))
}

/// GET /api/v1/competences/by-category
///
/// Visible competences within the caller's scope, keyed by category.
pub async fn by_category(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    Query(params): Query<CompetenceListParams>,
) -> AppResult<Json<BTreeMap<String, Vec<Competence>>>> {
    let mut filter = params.filter();
    filter.is_visible = Some(true);
    let items =
        CompetenceRepo::list_all(&state.pool, ChildScope::for_actor(&actor), &filter).await?;
    Ok(Json(group_by_category(items)))
}

/// POST /api/v1/competences
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateCompetence>,
) -> AppResult<(StatusCode, Json<Competence>)> {
    validate_fields(
        Some(&input.name),
        Some(&input.level),
        input.category.as_deref(),
        input.years_experience,
        input.display_order,
    )?;

    let competence = CompetenceRepo::create(&state.pool, auth_user.user_id, &input).await?;
    tracing::debug!(
        competence_id = competence.id,
        owner_id = competence.owner_id,
        "Competence created"
    );
    Ok((StatusCode::CREATED, Json(competence)))
}

/// GET /api/v1/competences/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<Competence>> {
    let facts = CompetenceRepo::facts(&state.pool, id).await?;
    guard_child(facts, &actor, Operation::Retrieve, ENTITY, id)?;

    let competence = CompetenceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;
    Ok(Json(competence))
}

/// PUT /api/v1/competences/{id}
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCompetence>,
) -> AppResult<Json<Competence>> {
    let facts = CompetenceRepo::facts(&state.pool, id).await?;
    guard_child(facts, &auth_user.actor(), Operation::Update, ENTITY, id)?;

    validate_fields(
        input.name.as_deref(),
        input.level.as_deref(),
        input.category.as_deref(),
        input.years_experience,
        input.display_order,
    )?;

    let competence = CompetenceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;
    Ok(Json(competence))
}

/// DELETE /api/v1/competences/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let facts = CompetenceRepo::facts(&state.pool, id).await?;
    guard_child(facts, &auth_user.actor(), Operation::Delete, ENTITY, id)?;

    if CompetenceRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))
    }
}
