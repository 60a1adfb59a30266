//! Handlers for the `/projets` resource.

use std::collections::BTreeMap;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::access::Operation;
use folio_core::error::CoreError;
use folio_core::types::DbId;
use folio_core::validation::{
    validate_max_length, validate_optional_url, validate_text, MAX_LANGUAGE_LENGTH,
    MAX_TITLE_LENGTH,
};
use folio_core::visibility::ChildScope;
use folio_db::models::projet::{CreateProjet, Projet, UpdateProjet};
use folio_db::repositories::ProjetRepo;

use super::{check_display_order, guard_child};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, OptionalActor};
use crate::query::ProjetListParams;
use crate::response::Page;
use crate::state::AppState;

const ENTITY: &str = "Projet";

/// Group projets by primary language. Projets without one are skipped.
pub(crate) fn group_by_language(items: Vec<Projet>) -> BTreeMap<String, Vec<Projet>> {
    let mut grouped: BTreeMap<String, Vec<Projet>> = BTreeMap::new();
    for item in items {
        if item.primary_language.trim().is_empty() {
            continue;
        }
        grouped
            .entry(item.primary_language.clone())
            .or_default()
            .push(item);
    }
    grouped
}

struct ProjetFields<'a> {
    title: Option<&'a str>,
    primary_language: Option<&'a str>,
    project_url: Option<&'a str>,
    github_url: Option<&'a str>,
    image_url: Option<&'a str>,
    technologies: Option<&'a [String]>,
    display_order: Option<i32>,
}

fn validate_fields(fields: ProjetFields<'_>) -> AppResult<()> {
    if let Some(title) = fields.title {
        validate_text("title", title, MAX_TITLE_LENGTH)?;
    }
    if let Some(language) = fields.primary_language {
        validate_max_length("primary_language", language, MAX_LANGUAGE_LENGTH)?;
    }
    validate_optional_url("project_url", fields.project_url)?;
    validate_optional_url("github_url", fields.github_url)?;
    validate_optional_url("image_url", fields.image_url)?;
    if let Some(techs) = fields.technologies {
        if techs.iter().any(|t| t.trim().is_empty()) {
            return Err(AppError::Core(CoreError::Validation(
                "technologies must not contain blank entries".into(),
            )));
        }
    }
    check_display_order(fields.display_order)
}

/// GET /api/v1/projets
pub async fn list(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ProjetListParams>,
) -> AppResult<Json<Page<Projet>>> {
    let page = params.page_request()?;
    let sort = params.sort()?;
    let (items, total) = ProjetRepo::list(
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

/// GET /api/v1/projets/public
///
/// Public projets within the caller's scope.
pub async fn public(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ProjetListParams>,
) -> AppResult<Json<Page<Projet>>> {
    let page = params.page_request()?;
    let sort = params.sort()?;
    let mut filter = params.filter();
    filter.is_public = Some(true);
    let (items, total) = ProjetRepo::list(
        &state.pool,
        ChildScope::for_actor(&actor),
        &filter,
        sort,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(Page::new(items, total, &page, &uri)))
}

/// POST /api/v1/projets
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateProjet>,
) -> AppResult<(StatusCode, Json<Projet>)> {
    validate_fields(ProjetFields {
        title: Some(&input.title),
        primary_language: Some(&input.primary_language),
        project_url: input.project_url.as_deref(),
        github_url: input.github_url.as_deref(),
        image_url: input.image_url.as_deref(),
        technologies: Some(&input.technologies),
        display_order: input.display_order,
    })?;

    let projet = ProjetRepo::create(&state.pool, auth_user.user_id, &input).await?;
    tracing::debug!(projet_id = projet.id, owner_id = projet.owner_id, "Projet created");
    Ok((StatusCode::CREATED, Json(projet)))
}

/// GET /api/v1/projets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<Projet>> {
    let facts = ProjetRepo::facts(&state.pool, id).await?;
    guard_child(facts, &actor, Operation::Retrieve, ENTITY, id)?;

    let projet = ProjetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;
    Ok(Json(projet))
}

/// PUT /api/v1/projets/{id}
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjet>,
) -> AppResult<Json<Projet>> {
    let facts = ProjetRepo::facts(&state.pool, id).await?;
    guard_child(facts, &auth_user.actor(), Operation::Update, ENTITY, id)?;

    validate_fields(ProjetFields {
        title: input.title.as_deref(),
        primary_language: input.primary_language.as_deref(),
        project_url: input.project_url.as_deref(),
        github_url: input.github_url.as_deref(),
        image_url: input.image_url.as_deref(),
        technologies: input.technologies.as_deref(),
        display_order: input.display_order,
    })?;

    let projet = ProjetRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;
    Ok(Json(projet))
}

/// DELETE /api/v1/projets/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let facts = ProjetRepo::facts(&state.pool, id).await?;
    guard_child(facts, &auth_user.actor(), Operation::Delete, ENTITY, id)?;

    if ProjetRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))
    }
}
