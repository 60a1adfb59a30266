//! Portfolio entity model, response shapes and DTOs.

use folio_core::access::PortfolioFacts;
use folio_core::error::CoreError;
use folio_core::lifecycle::{PortfolioStatus, STATUS_PUBLISHED};
use folio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::competence::Competence;
use crate::models::contact::Contact;
use crate::models::projet::Projet;
use crate::models::user::OwnerSummary;

/// A row from the `portfolios` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Portfolio {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub professional_title: String,
    pub biography: String,
    pub photo_url: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub published_at: Option<Timestamp>,
    pub view_count: i64,
    pub theme_color: String,
    pub layout_type: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub show_photo: bool,
    pub show_competences: bool,
    pub show_projets: bool,
    pub show_contacts: bool,
    pub show_formations: bool,
    pub show_experiences: bool,
    pub formations: serde_json::Value,
    pub experiences: serde_json::Value,
    pub languages: serde_json::Value,
    pub certifications: serde_json::Value,
    pub interests: serde_json::Value,
}

impl Portfolio {
    /// Parsed status. The column CHECK constraint guarantees a known value.
    pub fn parsed_status(&self) -> Result<PortfolioStatus, CoreError> {
        self.status
            .parse()
            .map_err(|_| CoreError::Internal(format!("Unknown stored status '{}'", self.status)))
    }

    pub fn is_published(&self) -> bool {
        self.status == STATUS_PUBLISHED
    }

    pub fn facts(&self) -> Result<PortfolioFacts, CoreError> {
        Ok(PortfolioFacts {
            owner_id: self.owner_id,
            status: self.parsed_status()?,
        })
    }
}

/// A portfolio row as shown in list endpoints.
#[derive(Debug, Clone, FromRow)]
pub struct PortfolioListRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub title: String,
    pub slug: String,
    pub professional_title: String,
    pub photo_url: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub published_at: Option<Timestamp>,
    pub view_count: i64,
    pub contact_count: i64,
    pub competence_count: i64,
    pub projet_count: i64,
}

/// List-endpoint representation of a portfolio.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub id: DbId,
    pub owner: OwnerSummary,
    pub title: String,
    pub slug: String,
    pub professional_title: String,
    pub photo_url: Option<String>,
    pub status: String,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub published_at: Option<Timestamp>,
    pub view_count: i64,
    pub contact_count: i64,
    pub competence_count: i64,
    pub projet_count: i64,
}

impl From<PortfolioListRow> for PortfolioSummary {
    fn from(row: PortfolioListRow) -> Self {
        Self {
            id: row.id,
            owner: OwnerSummary::new(row.owner_id, row.owner_first_name, row.owner_last_name),
            is_published: row.status == STATUS_PUBLISHED,
            title: row.title,
            slug: row.slug,
            professional_title: row.professional_title,
            photo_url: row.photo_url,
            status: row.status,
            created_at: row.created_at,
            modified_at: row.modified_at,
            published_at: row.published_at,
            view_count: row.view_count,
            contact_count: row.contact_count,
            competence_count: row.competence_count,
            projet_count: row.projet_count,
        }
    }
}

/// A published portfolio summary with a preview of its content, as returned
/// by the public listing.
#[derive(Debug, Clone, Serialize)]
pub struct PublicPortfolioCard {
    #[serde(flatten)]
    pub summary: PortfolioSummary,
    pub primary_contacts: Vec<Contact>,
    pub visible_competences: Vec<Competence>,
    pub public_projets: Vec<Projet>,
}

/// Full portfolio representation with owner and members.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioDetail {
    #[serde(flatten)]
    pub portfolio: Portfolio,
    pub owner: OwnerSummary,
    pub contacts: Vec<Contact>,
    pub competences: Vec<Competence>,
    pub projets: Vec<Projet>,
    pub is_published: bool,
    pub can_be_published: bool,
}

/// Everything a visitor needs to render a published portfolio.
#[derive(Debug, Clone, Serialize)]
pub struct PublicPortfolioData {
    pub portfolio: PortfolioDetail,
    pub contacts: Vec<Contact>,
    pub competences: Vec<Competence>,
    pub projets: Vec<Projet>,
}

/// DTO for creating a portfolio. Status is never accepted from clients.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePortfolio {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub professional_title: String,
    #[serde(default)]
    pub biography: String,
    pub photo_url: Option<String>,
    pub theme_color: Option<String>,
    pub layout_type: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub show_photo: Option<bool>,
    pub show_competences: Option<bool>,
    pub show_projets: Option<bool>,
    pub show_contacts: Option<bool>,
    pub show_formations: Option<bool>,
    pub show_experiences: Option<bool>,
    pub formations: Option<serde_json::Value>,
    pub experiences: Option<serde_json::Value>,
    pub languages: Option<serde_json::Value>,
    pub certifications: Option<serde_json::Value>,
    pub interests: Option<serde_json::Value>,
    #[serde(default)]
    pub contact_ids: Vec<DbId>,
    #[serde(default)]
    pub competence_ids: Vec<DbId>,
    #[serde(default)]
    pub projet_ids: Vec<DbId>,
}

/// DTO for updating a portfolio. Membership lists, when present, replace the
/// whole set.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePortfolio {
    pub title: Option<String>,
    pub description: Option<String>,
    pub professional_title: Option<String>,
    pub biography: Option<String>,
    pub photo_url: Option<String>,
    pub theme_color: Option<String>,
    pub layout_type: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub show_photo: Option<bool>,
    pub show_competences: Option<bool>,
    pub show_projets: Option<bool>,
    pub show_contacts: Option<bool>,
    pub show_formations: Option<bool>,
    pub show_experiences: Option<bool>,
    pub formations: Option<serde_json::Value>,
    pub experiences: Option<serde_json::Value>,
    pub languages: Option<serde_json::Value>,
    pub certifications: Option<serde_json::Value>,
    pub interests: Option<serde_json::Value>,
    pub contact_ids: Option<Vec<DbId>>,
    pub competence_ids: Option<Vec<DbId>>,
    pub projet_ids: Option<Vec<DbId>>,
}

/// List filters for portfolios.
#[derive(Debug, Default, Clone)]
pub struct PortfolioFilter {
    pub status: Option<String>,
    pub owner_id: Option<DbId>,
    pub layout_type: Option<String>,
    /// `ILIKE` pattern matched against member competence names.
    pub competence: Option<String>,
    /// `ILIKE` pattern matched against member projet languages.
    pub language: Option<String>,
    /// Exact member competence level.
    pub level: Option<String>,
    /// Exact member competence category.
    pub category: Option<String>,
    /// `ILIKE` pattern over the portfolio's text fields.
    pub search: Option<String>,
}

/// Which membership table a child reference lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Contact,
    Competence,
    Projet,
}

impl MemberKind {
    pub fn entity(self) -> &'static str {
        match self {
            MemberKind::Contact => "Contact",
            MemberKind::Competence => "Competence",
            MemberKind::Projet => "Projet",
        }
    }

    pub(crate) fn child_table(self) -> &'static str {
        match self {
            MemberKind::Contact => "contacts",
            MemberKind::Competence => "competences",
            MemberKind::Projet => "projets",
        }
    }

    pub(crate) fn link_table(self) -> &'static str {
        match self {
            MemberKind::Contact => "portfolio_contacts",
            MemberKind::Competence => "portfolio_competences",
            MemberKind::Projet => "portfolio_projets",
        }
    }

    pub(crate) fn link_column(self) -> &'static str {
        match self {
            MemberKind::Contact => "contact_id",
            MemberKind::Competence => "competence_id",
            MemberKind::Projet => "projet_id",
        }
    }
}
