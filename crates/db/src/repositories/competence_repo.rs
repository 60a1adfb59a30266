//! Repository for the `competences` table.

use folio_core::access::ChildFacts;
use folio_core::catalog::DEFAULT_CATEGORY;
use folio_core::types::DbId;
use folio_core::visibility::{search_clause, ChildScope, SortOrder, COMPETENCE_SEARCH_FIELDS};
use sqlx::PgPool;

use crate::models::competence::{Competence, CompetenceFilter, CreateCompetence, UpdateCompetence};
use crate::models::portfolio::MemberKind;
use crate::repositories::{
    capped_members_query, order_clause, pair_with_portfolio, published_clause,
};

const COLUMNS: &str = "c.id, c.owner_id, c.name, c.level, c.category, c.years_experience, \
                        c.description, c.is_visible, c.display_order, c.created_at, c.updated_at";

const DEFAULT_ORDER: &str = "c.category, c.display_order, c.name";

/// Provides CRUD and scoped listing for competences.
///
/// `(owner_id, name)` is unique; inserts and renames that collide fail with
/// the `uq_competences_owner_name` constraint.
pub struct CompetenceRepo;

impl CompetenceRepo {
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateCompetence,
    ) -> Result<Competence, sqlx::Error> {
        let query = format!(
            "INSERT INTO competences AS c
                (owner_id, name, level, category, years_experience, description,
                 is_visible, display_order)
             VALUES ($1, $2, $3, COALESCE($4, $9), COALESCE($5, 0), COALESCE($6, ''),
                     COALESCE($7, true), COALESCE($8, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Competence>(&query)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.level)
            .bind(&input.category)
            .bind(input.years_experience)
            .bind(&input.description)
            .bind(input.is_visible)
            .bind(input.display_order)
            .bind(DEFAULT_CATEGORY)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Competence>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM competences c WHERE c.id = $1");
        sqlx::query_as::<_, Competence>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Owner and public visibility of a competence, for the ownership guard.
    pub async fn facts(pool: &PgPool, id: DbId) -> Result<Option<ChildFacts>, sqlx::Error> {
        let published = published_clause(MemberKind::Competence, "c");
        let query = format!("SELECT c.owner_id, {published} FROM competences c WHERE c.id = $1");
        let row: Option<(DbId, bool)> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|(owner_id, publicly_visible)| ChildFacts {
            owner_id,
            publicly_visible,
        }))
    }

    /// One page of competences in `scope`, plus the total match count.
    pub async fn list(
        pool: &PgPool,
        scope: ChildScope,
        filter: &CompetenceFilter,
        sort: Option<SortOrder>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Competence>, i64), sqlx::Error> {
        let count_query = format!(
            "SELECT COUNT(*) FROM competences c WHERE {}",
            Self::where_clause()
        );
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(scope.owner_id())
            .bind(&filter.category)
            .bind(&filter.level)
            .bind(filter.is_visible)
            .bind(&filter.search)
            .fetch_one(pool)
            .await?;

        let rows = Self::fetch(pool, scope, filter, sort, Some(limit), offset).await?;
        Ok((rows, total))
    }

    /// Every competence in `scope` matching `filter`, in default order.
    pub async fn list_all(
        pool: &PgPool,
        scope: ChildScope,
        filter: &CompetenceFilter,
    ) -> Result<Vec<Competence>, sqlx::Error> {
        Self::fetch(pool, scope, filter, None, None, 0).await
    }

    /// Members of a portfolio in default order.
    pub async fn list_for_portfolio(
        pool: &PgPool,
        portfolio_id: DbId,
        visible_only: bool,
    ) -> Result<Vec<Competence>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM competences c
             JOIN portfolio_competences pc ON pc.competence_id = c.id
             WHERE pc.portfolio_id = $1 AND ($2 = false OR c.is_visible = true)
             ORDER BY {DEFAULT_ORDER}, c.id"
        );
        sqlx::query_as::<_, Competence>(&query)
            .bind(portfolio_id)
            .bind(visible_only)
            .fetch_all(pool)
            .await
    }

    /// Batched [`Self::list_for_portfolio`] over several portfolios.
    pub async fn list_for_portfolios(
        pool: &PgPool,
        portfolio_ids: &[DbId],
        visible_only: bool,
        per_portfolio: i64,
    ) -> Result<Vec<(DbId, Competence)>, sqlx::Error> {
        let query = capped_members_query(
            MemberKind::Competence,
            "competences",
            COLUMNS,
            DEFAULT_ORDER,
            "is_visible",
        );
        let rows = sqlx::query(&query)
            .bind(portfolio_ids)
            .bind(visible_only)
            .bind(per_portfolio)
            .fetch_all(pool)
            .await?;
        pair_with_portfolio(rows)
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCompetence,
    ) -> Result<Option<Competence>, sqlx::Error> {
        let query = format!(
            "UPDATE competences AS c SET
                name = COALESCE($2, name),
                level = COALESCE($3, level),
                category = COALESCE($4, category),
                years_experience = COALESCE($5, years_experience),
                description = COALESCE($6, description),
                is_visible = COALESCE($7, is_visible),
                display_order = COALESCE($8, display_order)
             WHERE c.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Competence>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.level)
            .bind(&input.category)
            .bind(input.years_experience)
            .bind(&input.description)
            .bind(input.is_visible)
            .bind(input.display_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM competences WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch(
        pool: &PgPool,
        scope: ChildScope,
        filter: &CompetenceFilter,
        sort: Option<SortOrder>,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Competence>, sqlx::Error> {
        let order = order_clause(sort, "c", DEFAULT_ORDER);
        let query = format!(
            "SELECT {COLUMNS} FROM competences c WHERE {}
             ORDER BY {order} LIMIT $6 OFFSET $7",
            Self::where_clause()
        );
        sqlx::query_as::<_, Competence>(&query)
            .bind(scope.owner_id())
            .bind(&filter.category)
            .bind(&filter.level)
            .bind(filter.is_visible)
            .bind(&filter.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Binds: `$1` owner (NULL = published only), `$2` category, `$3` level,
    /// `$4` visibility flag, `$5` search pattern.
    fn where_clause() -> String {
        let published = published_clause(MemberKind::Competence, "c");
        let search = search_clause(COMPETENCE_SEARCH_FIELDS, "c", 5);
        format!(
            "($1::BIGINT IS NULL OR c.owner_id = $1)
             AND ($1::BIGINT IS NOT NULL OR {published})
             AND ($2::TEXT IS NULL OR c.category = $2)
             AND ($3::TEXT IS NULL OR c.level = $3)
             AND ($4::BOOLEAN IS NULL OR c.is_visible = $4)
             AND ($5::TEXT IS NULL OR {search})"
        )
    }
}
