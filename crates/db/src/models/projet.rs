//! Projet (project) entity model and DTOs.

use chrono::NaiveDate;
use folio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Projet {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    pub primary_language: String,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub image_url: Option<String>,
    /// JSON array of technology names.
    pub technologies: serde_json::Value,
    pub realization_date: Option<NaiveDate>,
    pub is_public: bool,
    pub is_complete: bool,
    pub display_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a projet.
#[derive(Debug, Deserialize)]
pub struct CreateProjet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub primary_language: String,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub realization_date: Option<NaiveDate>,
    pub is_public: Option<bool>,
    pub is_complete: Option<bool>,
    pub display_order: Option<i32>,
}

/// DTO for updating a projet. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub primary_language: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub image_url: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub realization_date: Option<NaiveDate>,
    pub is_public: Option<bool>,
    pub is_complete: Option<bool>,
    pub display_order: Option<i32>,
}

/// List filters for projets.
#[derive(Debug, Default, Clone)]
pub struct ProjetFilter {
    /// Exact language match.
    pub primary_language: Option<String>,
    pub is_public: Option<bool>,
    pub is_complete: Option<bool>,
    /// Already an `ILIKE` pattern.
    pub search: Option<String>,
}
