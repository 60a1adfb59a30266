//! Portfolio publication lifecycle.
//!
//! A portfolio moves `draft -> published -> draft/archived`. Archived is
//! terminal: no transition leaves it. Publishing requires the portfolio to be
//! complete enough to show (see [`PublishReadiness`]) and no other portfolio
//! of the same owner to be published already.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PUBLISHED: &str = "published";
pub const STATUS_ARCHIVED: &str = "archived";

/// Suffix appended to the title of a duplicated portfolio.
pub const COPY_SUFFIX: &str = " (Copy)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioStatus {
    Draft,
    Published,
    Archived,
}

impl PortfolioStatus {
    pub const ALL: [PortfolioStatus; 3] = [
        PortfolioStatus::Draft,
        PortfolioStatus::Published,
        PortfolioStatus::Archived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PortfolioStatus::Draft => STATUS_DRAFT,
            PortfolioStatus::Published => STATUS_PUBLISHED,
            PortfolioStatus::Archived => STATUS_ARCHIVED,
        }
    }
}

impl fmt::Display for PortfolioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortfolioStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_DRAFT => Ok(PortfolioStatus::Draft),
            STATUS_PUBLISHED => Ok(PortfolioStatus::Published),
            STATUS_ARCHIVED => Ok(PortfolioStatus::Archived),
            other => Err(CoreError::Validation(format!(
                "Invalid status '{other}'. Must be one of: {STATUS_DRAFT}, {STATUS_PUBLISHED}, {STATUS_ARCHIVED}"
            ))),
        }
    }
}

/// Facts about a portfolio gathered (inside the publishing transaction)
/// before a status change is planned.
#[derive(Debug, Clone, Default)]
pub struct PublishReadiness {
    pub has_title: bool,
    pub has_description: bool,
    pub competence_count: i64,
    pub public_projet_count: i64,
    /// Another portfolio of the same owner is currently published.
    pub other_published: bool,
}

impl PublishReadiness {
    pub fn new(
        title: &str,
        description: &str,
        competence_count: i64,
        public_projet_count: i64,
        other_published: bool,
    ) -> Self {
        Self {
            has_title: !title.trim().is_empty(),
            has_description: !description.trim().is_empty(),
            competence_count,
            public_projet_count,
            other_published,
        }
    }

    /// Content requirements only; the one-published-per-owner rule is
    /// checked separately by [`plan_transition`].
    pub fn can_publish(&self) -> bool {
        self.missing().is_empty()
    }

    /// Names of the unmet publication requirements, in a stable order.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_title {
            missing.push("title");
        }
        if !self.has_description {
            missing.push("description");
        }
        if self.competence_count < 1 {
            missing.push("at least one competence");
        }
        if self.public_projet_count < 1 {
            missing.push("at least one public projet");
        }
        missing
    }
}

/// The status and publication timestamp a portfolio must be written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub status: PortfolioStatus,
    pub published_at: Option<Timestamp>,
}

/// Decide whether `current -> target` is allowed and compute the new
/// `published_at`.
///
/// - Leaving `archived` is never allowed (`archived -> archived` is a no-op).
/// - Entering `published` requires `readiness` to pass and no other published
///   portfolio for the owner; `published_at` is kept if already set, otherwise
///   stamped with `now`.
/// - Entering `draft` or `archived` always clears `published_at`.
pub fn plan_transition(
    current: PortfolioStatus,
    target: PortfolioStatus,
    published_at: Option<Timestamp>,
    readiness: &PublishReadiness,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    if current == PortfolioStatus::Archived && target != PortfolioStatus::Archived {
        return Err(CoreError::Validation(
            "Archived portfolios cannot change status".into(),
        ));
    }

    match target {
        PortfolioStatus::Published => {
            if !readiness.can_publish() {
                return Err(CoreError::Validation(format!(
                    "Portfolio does not meet the publication requirements. Missing: {}",
                    readiness.missing().join(", ")
                )));
            }
            if readiness.other_published {
                return Err(CoreError::Validation(
                    "Another portfolio is already published for this user. Archive it first."
                        .into(),
                ));
            }
            Ok(Transition {
                status: PortfolioStatus::Published,
                published_at: published_at.or(Some(now)),
            })
        }
        PortfolioStatus::Draft | PortfolioStatus::Archived => Ok(Transition {
            status: target,
            published_at: None,
        }),
    }
}

/// Title given to a duplicated portfolio.
pub fn copy_title(title: &str) -> String {
    format!("{title}{COPY_SUFFIX}")
}
