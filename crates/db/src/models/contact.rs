//! Contact entity model and DTOs.

use folio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: DbId,
    pub owner_id: DbId,
    pub contact_type: String,
    pub value: String,
    pub is_primary: bool,
    pub display_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a contact. The owner comes from the caller.
#[derive(Debug, Deserialize)]
pub struct CreateContact {
    pub contact_type: String,
    pub value: String,
    #[serde(default)]
    pub is_primary: bool,
    pub display_order: Option<i32>,
}

/// DTO for updating a contact. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateContact {
    pub contact_type: Option<String>,
    pub value: Option<String>,
    pub is_primary: Option<bool>,
    pub display_order: Option<i32>,
}

/// List filters for contacts.
#[derive(Debug, Default, Clone)]
pub struct ContactFilter {
    pub contact_type: Option<String>,
    pub is_primary: Option<bool>,
    /// Already an `ILIKE` pattern.
    pub search: Option<String>,
}
