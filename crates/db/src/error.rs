//! Error type for transactional repository operations.
//!
//! Plain CRUD methods return `sqlx::Error`. Methods that check domain rules
//! inside a transaction (contact capacity, publication, duplication) can also
//! fail with a [`CoreError`], in which case the transaction is rolled back.

use folio_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
