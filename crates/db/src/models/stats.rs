//! Read-only aggregate shapes for portfolio, platform and account statistics.

use std::collections::BTreeMap;

use folio_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

use crate::models::competence::Competence;
use crate::models::portfolio::PortfolioSummary;
use crate::models::projet::Projet;

/// Member counts of one portfolio, total and visible per child type.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct ContentCounts {
    pub contacts: i64,
    pub primary_contacts: i64,
    pub competences: i64,
    pub visible_competences: i64,
    pub projets: i64,
    pub public_projets: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioGeneralStats {
    pub view_count: i64,
    pub status: String,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub published_at: Option<Timestamp>,
    pub days_active: i64,
}

/// Statistics for a single portfolio.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioStats {
    pub general: PortfolioGeneralStats,
    pub content: ContentCounts,
    pub competences_by_category: BTreeMap<String, i64>,
    pub projets_by_language: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct PlatformPortfolioStats {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
    pub archived: i64,
    pub total_views: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlatformCompetenceStats {
    pub total: i64,
    pub visible: i64,
    /// Visible competences per category; zero-count categories are omitted.
    pub by_category: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlatformProjetStats {
    pub total: i64,
    pub public: i64,
    pub complete: i64,
    /// Top languages by public projet count, descending.
    pub by_language: Vec<LanguageCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageCount {
    pub language: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct PlatformContactStats {
    pub total: i64,
    pub primary: i64,
}

/// Platform-wide totals, recomputed per request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlatformStats {
    pub portfolios: PlatformPortfolioStats,
    pub competences: PlatformCompetenceStats,
    pub projets: PlatformProjetStats,
    pub contacts: PlatformContactStats,
}

/// Per-account counters shown on the account page.
#[derive(Debug, Clone, Serialize)]
pub struct AccountStats {
    pub portfolio_count: i64,
    pub portfolio_status: Option<String>,
    pub portfolio_views: i64,
    pub contact_count: i64,
    pub competence_count: i64,
    pub projet_count: i64,
    pub member_since: Timestamp,
    pub last_login_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchCounts {
    pub portfolios: i64,
    pub competences: i64,
    pub projets: i64,
    pub total: i64,
}

/// Result of the public global search.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalSearchResults {
    pub portfolios: Vec<PortfolioSummary>,
    pub competences: Vec<Competence>,
    pub projets: Vec<Projet>,
    pub counts: SearchCounts,
}

impl GlobalSearchResults {
    pub fn new(
        portfolios: Vec<PortfolioSummary>,
        competences: Vec<Competence>,
        projets: Vec<Projet>,
    ) -> Self {
        let counts = SearchCounts {
            portfolios: portfolios.len() as i64,
            competences: competences.len() as i64,
            projets: projets.len() as i64,
            total: (portfolios.len() + competences.len() + projets.len()) as i64,
        };
        Self {
            portfolios,
            competences,
            projets,
            counts,
        }
    }
}
