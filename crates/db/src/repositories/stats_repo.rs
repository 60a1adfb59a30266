//! Read-only aggregation queries: per-portfolio, platform and account
//! statistics, and the public global search.
//!
//! Nothing here is cached; every call recomputes from the live tables.

use folio_core::stats::{days_active, tally, top_n, TOP_LANGUAGES};
use folio_core::types::Timestamp;
use folio_core::visibility::{like_pattern, ChildScope, PortfolioScope};
use sqlx::PgPool;

use crate::models::competence::CompetenceFilter;
use crate::models::portfolio::{Portfolio, PortfolioFilter};
use crate::models::projet::ProjetFilter;
use crate::models::stats::{
    AccountStats, ContentCounts, GlobalSearchResults, LanguageCount, PlatformCompetenceStats,
    PlatformContactStats, PlatformPortfolioStats, PlatformProjetStats, PlatformStats,
    PortfolioGeneralStats, PortfolioStats,
};
use crate::models::user::User;
use crate::repositories::{CompetenceRepo, PortfolioRepo, ProjetRepo};

pub struct StatsRepo;

impl StatsRepo {
    /// Statistics for one portfolio. Category and language breakdowns cover
    /// every member, visible or not.
    pub async fn portfolio_stats(
        pool: &PgPool,
        portfolio: &Portfolio,
        now: Timestamp,
    ) -> Result<PortfolioStats, sqlx::Error> {
        let content = sqlx::query_as::<_, ContentCounts>(
            "SELECT
                (SELECT COUNT(*) FROM portfolio_contacts l WHERE l.portfolio_id = $1)
                    AS contacts,
                (SELECT COUNT(*) FROM portfolio_contacts l JOIN contacts c ON c.id = l.contact_id
                  WHERE l.portfolio_id = $1 AND c.is_primary) AS primary_contacts,
                (SELECT COUNT(*) FROM portfolio_competences l WHERE l.portfolio_id = $1)
                    AS competences,
                (SELECT COUNT(*) FROM portfolio_competences l
                   JOIN competences c ON c.id = l.competence_id
                  WHERE l.portfolio_id = $1 AND c.is_visible) AS visible_competences,
                (SELECT COUNT(*) FROM portfolio_projets l WHERE l.portfolio_id = $1)
                    AS projets,
                (SELECT COUNT(*) FROM portfolio_projets l JOIN projets c ON c.id = l.projet_id
                  WHERE l.portfolio_id = $1 AND c.is_public) AS public_projets",
        )
        .bind(portfolio.id)
        .fetch_one(pool)
        .await?;

        let categories: Vec<(String, i64)> = sqlx::query_as(
            "SELECT c.category, COUNT(*) FROM competences c
             JOIN portfolio_competences l ON l.competence_id = c.id
             WHERE l.portfolio_id = $1
             GROUP BY c.category",
        )
        .bind(portfolio.id)
        .fetch_all(pool)
        .await?;

        let languages: Vec<(String, i64)> = sqlx::query_as(
            "SELECT c.primary_language, COUNT(*) FROM projets c
             JOIN portfolio_projets l ON l.projet_id = c.id
             WHERE l.portfolio_id = $1 AND c.primary_language <> ''
             GROUP BY c.primary_language",
        )
        .bind(portfolio.id)
        .fetch_all(pool)
        .await?;

        Ok(PortfolioStats {
            general: PortfolioGeneralStats {
                view_count: portfolio.view_count,
                status: portfolio.status.clone(),
                created_at: portfolio.created_at,
                modified_at: portfolio.modified_at,
                published_at: portfolio.published_at,
                days_active: days_active(Some(portfolio.created_at), now),
            },
            content,
            competences_by_category: tally(categories),
            projets_by_language: tally(languages),
        })
    }

    /// Platform-wide totals.
    pub async fn platform_stats(pool: &PgPool) -> Result<PlatformStats, sqlx::Error> {
        let portfolios = sqlx::query_as::<_, PlatformPortfolioStats>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'published') AS published,
                COUNT(*) FILTER (WHERE status = 'draft') AS draft,
                COUNT(*) FILTER (WHERE status = 'archived') AS archived,
                COALESCE(SUM(view_count), 0)::BIGINT AS total_views
             FROM portfolios",
        )
        .fetch_one(pool)
        .await?;

        let (competence_total, competence_visible): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_visible) FROM competences",
        )
        .fetch_one(pool)
        .await?;
        let categories: Vec<(String, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) FROM competences WHERE is_visible GROUP BY category",
        )
        .fetch_all(pool)
        .await?;

        let (projet_total, projet_public, projet_complete): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_public),
                    COUNT(*) FILTER (WHERE is_complete)
             FROM projets",
        )
        .fetch_one(pool)
        .await?;
        let languages: Vec<(String, i64)> = sqlx::query_as(
            "SELECT primary_language, COUNT(*) FROM projets
             WHERE is_public AND primary_language <> ''
             GROUP BY primary_language",
        )
        .fetch_all(pool)
        .await?;

        let contacts = sqlx::query_as::<_, PlatformContactStats>(
            "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE is_primary) AS \"primary\"
             FROM contacts",
        )
        .fetch_one(pool)
        .await?;

        Ok(PlatformStats {
            portfolios,
            competences: PlatformCompetenceStats {
                total: competence_total,
                visible: competence_visible,
                by_category: tally(categories),
            },
            projets: PlatformProjetStats {
                total: projet_total,
                public: projet_public,
                complete: projet_complete,
                by_language: top_n(languages, TOP_LANGUAGES)
                    .into_iter()
                    .map(|(language, count)| LanguageCount { language, count })
                    .collect(),
            },
            contacts,
        })
    }

    /// Counters for the account page of `user`.
    pub async fn account_stats(pool: &PgPool, user: &User) -> Result<AccountStats, sqlx::Error> {
        let portfolio = PortfolioRepo::find_by_owner(pool, user.id).await?;

        let (contact_count, competence_count, projet_count): (i64, i64, i64) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM contacts WHERE owner_id = $1),
                (SELECT COUNT(*) FROM competences WHERE owner_id = $1),
                (SELECT COUNT(*) FROM projets WHERE owner_id = $1)",
        )
        .bind(user.id)
        .fetch_one(pool)
        .await?;

        Ok(AccountStats {
            portfolio_count: i64::from(portfolio.is_some()),
            portfolio_views: portfolio.as_ref().map_or(0, |p| p.view_count),
            portfolio_status: portfolio.map(|p| p.status),
            contact_count,
            competence_count,
            projet_count,
            member_since: user.created_at,
            last_login_at: user.last_login_at,
        })
    }

    /// Case-insensitive substring search over published portfolios and the
    /// publicly visible competences and projets.
    pub async fn global_search(
        pool: &PgPool,
        term: &str,
    ) -> Result<GlobalSearchResults, sqlx::Error> {
        let pattern = like_pattern(term);

        let portfolios = PortfolioRepo::list_all(
            pool,
            PortfolioScope::PublishedOnly,
            &PortfolioFilter {
                search: Some(pattern.clone()),
                ..Default::default()
            },
        )
        .await?;
        let competences = CompetenceRepo::list_all(
            pool,
            ChildScope::PublishedOnly,
            &CompetenceFilter {
                search: Some(pattern.clone()),
                ..Default::default()
            },
        )
        .await?;
        let projets = ProjetRepo::list_all(
            pool,
            ChildScope::PublishedOnly,
            &ProjetFilter {
                search: Some(pattern),
                ..Default::default()
            },
        )
        .await?;

        Ok(GlobalSearchResults::new(portfolios, competences, projets))
    }
}
