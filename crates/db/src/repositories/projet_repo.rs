//! Repository for the `projets` table.

use folio_core::access::ChildFacts;
use folio_core::types::DbId;
use folio_core::visibility::{search_clause, ChildScope, SortOrder, PROJET_SEARCH_FIELDS};
use sqlx::PgPool;

use crate::models::portfolio::MemberKind;
use crate::models::projet::{CreateProjet, Projet, ProjetFilter, UpdateProjet};
use crate::repositories::{
    capped_members_query, order_clause, pair_with_portfolio, published_clause,
};

const COLUMNS: &str = "c.id, c.owner_id, c.title, c.description, c.primary_language, \
                        c.project_url, c.github_url, c.image_url, c.technologies, \
                        c.realization_date, c.is_public, c.is_complete, c.display_order, \
                        c.created_at, c.updated_at";

const DEFAULT_ORDER: &str = "c.display_order, c.realization_date DESC NULLS LAST, c.title";

/// Provides CRUD and scoped listing for projets.
pub struct ProjetRepo;

impl ProjetRepo {
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateProjet,
    ) -> Result<Projet, sqlx::Error> {
        let query = format!(
            "INSERT INTO projets AS c
                (owner_id, title, description, primary_language, project_url, github_url,
                 image_url, technologies, realization_date, is_public, is_complete, display_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9,
                     COALESCE($10, true), COALESCE($11, true), COALESCE($12, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Projet>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.primary_language)
            .bind(&input.project_url)
            .bind(&input.github_url)
            .bind(&input.image_url)
            .bind(serde_json::json!(input.technologies))
            .bind(input.realization_date)
            .bind(input.is_public)
            .bind(input.is_complete)
            .bind(input.display_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Projet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projets c WHERE c.id = $1");
        sqlx::query_as::<_, Projet>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Owner and public visibility of a projet, for the ownership guard.
    pub async fn facts(pool: &PgPool, id: DbId) -> Result<Option<ChildFacts>, sqlx::Error> {
        let published = published_clause(MemberKind::Projet, "c");
        let query = format!("SELECT c.owner_id, {published} FROM projets c WHERE c.id = $1");
        let row: Option<(DbId, bool)> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|(owner_id, publicly_visible)| ChildFacts {
            owner_id,
            publicly_visible,
        }))
    }

    /// One page of projets in `scope`, plus the total match count.
    pub async fn list(
        pool: &PgPool,
        scope: ChildScope,
        filter: &ProjetFilter,
        sort: Option<SortOrder>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Projet>, i64), sqlx::Error> {
        let count_query = format!("SELECT COUNT(*) FROM projets c WHERE {}", Self::where_clause());
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(scope.owner_id())
            .bind(&filter.primary_language)
            .bind(filter.is_public)
            .bind(filter.is_complete)
            .bind(&filter.search)
            .fetch_one(pool)
            .await?;

        let rows = Self::fetch(pool, scope, filter, sort, Some(limit), offset).await?;
        Ok((rows, total))
    }

    /// Every projet in `scope` matching `filter`, in default order.
    pub async fn list_all(
        pool: &PgPool,
        scope: ChildScope,
        filter: &ProjetFilter,
    ) -> Result<Vec<Projet>, sqlx::Error> {
        Self::fetch(pool, scope, filter, None, None, 0).await
    }

    /// Members of a portfolio in default order.
    pub async fn list_for_portfolio(
        pool: &PgPool,
        portfolio_id: DbId,
        public_only: bool,
    ) -> Result<Vec<Projet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projets c
             JOIN portfolio_projets pp ON pp.projet_id = c.id
             WHERE pp.portfolio_id = $1 AND ($2 = false OR c.is_public = true)
             ORDER BY {DEFAULT_ORDER}, c.id"
        );
        sqlx::query_as::<_, Projet>(&query)
            .bind(portfolio_id)
            .bind(public_only)
            .fetch_all(pool)
            .await
    }

    /// Batched [`Self::list_for_portfolio`] over several portfolios.
    pub async fn list_for_portfolios(
        pool: &PgPool,
        portfolio_ids: &[DbId],
        public_only: bool,
        per_portfolio: i64,
    ) -> Result<Vec<(DbId, Projet)>, sqlx::Error> {
        let query = capped_members_query(
            MemberKind::Projet,
            "projets",
            COLUMNS,
            DEFAULT_ORDER,
            "is_public",
        );
        let rows = sqlx::query(&query)
            .bind(portfolio_ids)
            .bind(public_only)
            .bind(per_portfolio)
            .fetch_all(pool)
            .await?;
        pair_with_portfolio(rows)
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProjet,
    ) -> Result<Option<Projet>, sqlx::Error> {
        let query = format!(
            "UPDATE projets AS c SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                primary_language = COALESCE($4, primary_language),
                project_url = COALESCE($5, project_url),
                github_url = COALESCE($6, github_url),
                image_url = COALESCE($7, image_url),
                technologies = COALESCE($8, technologies),
                realization_date = COALESCE($9, realization_date),
                is_public = COALESCE($10, is_public),
                is_complete = COALESCE($11, is_complete),
                display_order = COALESCE($12, display_order)
             WHERE c.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Projet>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.primary_language)
            .bind(&input.project_url)
            .bind(&input.github_url)
            .bind(&input.image_url)
            .bind(input.technologies.as_ref().map(|t| serde_json::json!(t)))
            .bind(input.realization_date)
            .bind(input.is_public)
            .bind(input.is_complete)
            .bind(input.display_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch(
        pool: &PgPool,
        scope: ChildScope,
        filter: &ProjetFilter,
        sort: Option<SortOrder>,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Projet>, sqlx::Error> {
        let order = order_clause(sort, "c", DEFAULT_ORDER);
        let query = format!(
            "SELECT {COLUMNS} FROM projets c WHERE {}
             ORDER BY {order} LIMIT $6 OFFSET $7",
            Self::where_clause()
        );
        sqlx::query_as::<_, Projet>(&query)
            .bind(scope.owner_id())
            .bind(&filter.primary_language)
            .bind(filter.is_public)
            .bind(filter.is_complete)
            .bind(&filter.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Binds: `$1` owner (NULL = published only), `$2` language, `$3` public
    /// flag, `$4` complete flag, `$5` search pattern.
    fn where_clause() -> String {
        let published = published_clause(MemberKind::Projet, "c");
        let search = search_clause(PROJET_SEARCH_FIELDS, "c", 5);
        format!(
            "($1::BIGINT IS NULL OR c.owner_id = $1)
             AND ($1::BIGINT IS NOT NULL OR {published})
             AND ($2::TEXT IS NULL OR c.primary_language = $2)
             AND ($3::BOOLEAN IS NULL OR c.is_public = $3)
             AND ($4::BOOLEAN IS NULL OR c.is_complete = $4)
             AND ($5::TEXT IS NULL OR {search})"
        )
    }
}
