//! Competence (skill) entity model and DTOs.

use folio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `competences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Competence {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub level: String,
    pub category: String,
    pub years_experience: i32,
    pub description: String,
    pub is_visible: bool,
    pub display_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a competence.
#[derive(Debug, Deserialize)]
pub struct CreateCompetence {
    pub name: String,
    pub level: String,
    pub category: Option<String>,
    pub years_experience: Option<i32>,
    pub description: Option<String>,
    pub is_visible: Option<bool>,
    pub display_order: Option<i32>,
}

/// DTO for updating a competence. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCompetence {
    pub name: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
    pub years_experience: Option<i32>,
    pub description: Option<String>,
    pub is_visible: Option<bool>,
    pub display_order: Option<i32>,
}

/// List filters for competences.
#[derive(Debug, Default, Clone)]
pub struct CompetenceFilter {
    pub category: Option<String>,
    pub level: Option<String>,
    pub is_visible: Option<bool>,
    /// Already an `ILIKE` pattern.
    pub search: Option<String>,
}
