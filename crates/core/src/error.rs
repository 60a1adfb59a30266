use crate::types::DbId;

/// Domain errors shared by the repository and HTTP layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A row looked up by id does not exist, or the caller may not know it does.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Not-found condition that has no single id to report (lookups by owner, slug, ...).
    #[error("Not found: {0}")]
    Missing(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The caller can see `entity` but is not its owner.
    pub fn not_owner(entity: &str) -> Self {
        CoreError::Forbidden(format!("You do not own this {}", entity.to_lowercase()))
    }
}
