//! Handlers for the `/contacts` resource.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::access::Operation;
use folio_core::catalog::{validate_contact_type, CONTACT_EMAIL};
use folio_core::error::CoreError;
use folio_core::types::DbId;
use folio_core::validation::{validate_email, validate_text, MAX_CONTACT_VALUE_LENGTH};
use folio_core::visibility::ChildScope;
use folio_db::models::contact::{Contact, CreateContact, UpdateContact};
use folio_db::repositories::ContactRepo;

use super::{check_display_order, guard_child};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, OptionalActor};
use crate::query::ContactListParams;
use crate::response::Page;
use crate::state::AppState;

const ENTITY: &str = "Contact";

fn validate_value(contact_type: &str, value: &str) -> AppResult<()> {
    validate_text("value", value, MAX_CONTACT_VALUE_LENGTH)?;
    if contact_type == CONTACT_EMAIL {
        validate_email(value.trim())?;
    }
    Ok(())
}

/// GET /api/v1/contacts
///
/// Anonymous callers see contacts linked to a published portfolio; signed-in
/// callers see only their own.
pub async fn list(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ContactListParams>,
) -> AppResult<Json<Page<Contact>>> {
    let page = params.page_request()?;
    let sort = params.sort()?;
    let (contacts, total) = ContactRepo::list(
        &state.pool,
        ChildScope::for_actor(&actor),
        &params.filter(),
        sort,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(Page::new(contacts, total, &page, &uri)))
}

/// GET /api/v1/contacts/primary
///
/// Primary contacts linked to a published portfolio.
pub async fn primary(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ContactListParams>,
) -> AppResult<Json<Page<Contact>>> {
    let page = params.page_request()?;
    let sort = params.sort()?;
    let mut filter = params.filter();
    filter.is_primary = Some(true);
    let (contacts, total) = ContactRepo::list(
        &state.pool,
        ChildScope::PublishedOnly,
        &filter,
        sort,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(Page::new(contacts, total, &page, &uri)))
}

/// POST /api/v1/contacts
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateContact>,
) -> AppResult<(StatusCode, Json<Contact>)> {
    validate_contact_type(&input.contact_type)?;
    validate_value(&input.contact_type, &input.value)?;
    check_display_order(input.display_order)?;

    let contact = ContactRepo::create(&state.pool, auth_user.user_id, &input).await?;
    tracing::debug!(contact_id = contact.id, owner_id = contact.owner_id, "Contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /api/v1/contacts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<Contact>> {
    let facts = ContactRepo::facts(&state.pool, id).await?;
    guard_child(facts, &actor, Operation::Retrieve, ENTITY, id)?;

    let contact = ContactRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;
    Ok(Json(contact))
}

/// PUT /api/v1/contacts/{id}
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateContact>,
) -> AppResult<Json<Contact>> {
    let facts = ContactRepo::facts(&state.pool, id).await?;
    guard_child(facts, &auth_user.actor(), Operation::Update, ENTITY, id)?;

    let current = ContactRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;

    if let Some(contact_type) = &input.contact_type {
        validate_contact_type(contact_type)?;
    }
    let effective_type = input
        .contact_type
        .as_deref()
        .unwrap_or(&current.contact_type);
    if let Some(value) = &input.value {
        validate_value(effective_type, value)?;
    }
    check_display_order(input.display_order)?;

    let contact = ContactRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;
    Ok(Json(contact))
}

/// DELETE /api/v1/contacts/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let facts = ContactRepo::facts(&state.pool, id).await?;
    guard_child(facts, &auth_user.actor(), Operation::Delete, ENTITY, id)?;

    if ContactRepo::delete(&state.pool, id).await? {
        tracing::debug!(contact_id = id, "Contact deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))
    }
}
