//! Shared query parameter types for API handlers.
//!
//! Each list endpoint takes `page`, `page_size`, `ordering` and `search`
//! plus its own filter fields. Conversion helpers turn the raw values into
//! validated [`PageRequest`] / [`SortOrder`] values and repository filters.

use folio_core::error::CoreError;
use folio_core::pagination::PageRequest;
use folio_core::types::DbId;
use folio_core::visibility::{
    like_pattern, normalize_search, parse_sort, SortOrder, COMPETENCE_ORDERING, CONTACT_ORDERING,
    PORTFOLIO_ORDERING, PROJET_ORDERING,
};
use folio_db::models::competence::CompetenceFilter;
use folio_db::models::contact::ContactFilter;
use folio_db::models::portfolio::PortfolioFilter;
use folio_db::models::projet::ProjetFilter;
use serde::Deserialize;

/// Plain pagination parameters (`?page=&page_size=`).
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn page_request(&self) -> Result<PageRequest, CoreError> {
        PageRequest::new(self.page, self.page_size)
    }
}

/// Trim and drop blank filter values so `?category=` means "no filter".
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ContactListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub ordering: Option<String>,
    pub search: Option<String>,
    pub contact_type: Option<String>,
    pub is_primary: Option<bool>,
}

impl ContactListParams {
    pub fn page_request(&self) -> Result<PageRequest, CoreError> {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn sort(&self) -> Result<Option<SortOrder>, CoreError> {
        parse_sort(self.ordering.as_deref(), CONTACT_ORDERING)
    }

    pub fn filter(&self) -> ContactFilter {
        ContactFilter {
            contact_type: present(&self.contact_type),
            is_primary: self.is_primary,
            search: normalize_search(self.search.as_deref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Competences
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CompetenceListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub ordering: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub is_visible: Option<bool>,
}

impl CompetenceListParams {
    pub fn page_request(&self) -> Result<PageRequest, CoreError> {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn sort(&self) -> Result<Option<SortOrder>, CoreError> {
        parse_sort(self.ordering.as_deref(), COMPETENCE_ORDERING)
    }

    pub fn filter(&self) -> CompetenceFilter {
        CompetenceFilter {
            category: present(&self.category),
            level: present(&self.level),
            is_visible: self.is_visible,
            search: normalize_search(self.search.as_deref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Projets
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ProjetListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub ordering: Option<String>,
    pub search: Option<String>,
    pub primary_language: Option<String>,
    pub is_public: Option<bool>,
    pub is_complete: Option<bool>,
}

impl ProjetListParams {
    pub fn page_request(&self) -> Result<PageRequest, CoreError> {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn sort(&self) -> Result<Option<SortOrder>, CoreError> {
        parse_sort(self.ordering.as_deref(), PROJET_ORDERING)
    }

    pub fn filter(&self) -> ProjetFilter {
        ProjetFilter {
            primary_language: present(&self.primary_language),
            is_public: self.is_public,
            is_complete: self.is_complete,
            search: normalize_search(self.search.as_deref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Portfolios
// ---------------------------------------------------------------------------

/// `GET /portfolios`, `/portfolios/published`, `/portfolios/search` and the
/// public portfolio list all accept this shape.
#[derive(Debug, Default, Deserialize)]
pub struct PortfolioListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub ordering: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub owner: Option<DbId>,
    pub layout_type: Option<String>,
    /// Substring of a linked competence name.
    pub competence: Option<String>,
    /// Substring of a linked projet language.
    pub language: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
}

impl PortfolioListParams {
    pub fn page_request(&self) -> Result<PageRequest, CoreError> {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn sort(&self) -> Result<Option<SortOrder>, CoreError> {
        parse_sort(self.ordering.as_deref(), PORTFOLIO_ORDERING)
    }

    pub fn filter(&self) -> Result<PortfolioFilter, CoreError> {
        let status = present(&self.status);
        if let Some(s) = status.as_deref() {
            s.parse::<folio_core::lifecycle::PortfolioStatus>()?;
        }
        Ok(PortfolioFilter {
            status,
            owner_id: self.owner,
            layout_type: present(&self.layout_type),
            competence: present(&self.competence).map(|c| like_pattern(&c)),
            language: present(&self.language).map(|l| like_pattern(&l)),
            level: present(&self.level),
            category: present(&self.category),
            search: normalize_search(self.search.as_deref()),
        })
    }
}

/// `?q=` for the global search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}
