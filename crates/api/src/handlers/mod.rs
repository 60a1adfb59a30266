pub mod account;
pub mod admin;
pub mod auth;
pub mod competence;
pub mod contact;
pub mod portfolio;
pub mod projet;
pub mod public;

use folio_core::access::{require_child, ChildFacts, Operation};
use folio_core::actor::Actor;
use folio_core::error::CoreError;
use folio_core::types::DbId;

use crate::error::AppResult;

/// Run the ownership guard against facts loaded for a child entity.
/// A missing row is reported the same way as a hidden one.
pub(crate) fn guard_child(
    facts: Option<ChildFacts>,
    actor: &Actor,
    op: Operation,
    entity: &'static str,
    id: DbId,
) -> AppResult<()> {
    let facts = facts.ok_or(CoreError::NotFound { entity, id })?;
    require_child(actor, &facts, op, entity, id)?;
    Ok(())
}

/// Reject negative ordering hints.
pub(crate) fn check_display_order(value: Option<i32>) -> AppResult<()> {
    if let Some(order) = value {
        folio_core::validation::validate_non_negative("display_order", order)?;
    }
    Ok(())
}
