//! Repository for the `contacts` table.

use folio_core::access::ChildFacts;
use folio_core::catalog::validate_contact_capacity;
use folio_core::types::DbId;
use folio_core::visibility::{search_clause, ChildScope, SortOrder, CONTACT_SEARCH_FIELDS};
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::contact::{Contact, ContactFilter, CreateContact, UpdateContact};
use crate::models::portfolio::MemberKind;
use crate::repositories::{
    capped_members_query, order_clause, pair_with_portfolio, published_clause,
};

const COLUMNS: &str = "c.id, c.owner_id, c.contact_type, c.value, c.is_primary, \
                        c.display_order, c.created_at, c.updated_at";

const DEFAULT_ORDER: &str = "c.display_order, c.created_at";

/// Provides CRUD and scoped listing for contacts.
pub struct ContactRepo;

impl ContactRepo {
    /// Insert a contact for `owner_id`.
    ///
    /// Runs in one transaction: the owner row is locked, the per-user limit
    /// is checked, and when the new contact is primary every other contact
    /// of the owner loses its primary flag.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateContact,
    ) -> Result<Contact, DbError> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        let current: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;
        validate_contact_capacity(current)?;

        if input.is_primary {
            sqlx::query(
                "UPDATE contacts SET is_primary = false WHERE owner_id = $1 AND is_primary = true",
            )
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            "INSERT INTO contacts AS c (owner_id, contact_type, value, is_primary, display_order)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0))
             RETURNING {COLUMNS}"
        );
        let contact = sqlx::query_as::<_, Contact>(&query)
            .bind(owner_id)
            .bind(&input.contact_type)
            .bind(&input.value)
            .bind(input.is_primary)
            .bind(input.display_order)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(contact)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts c WHERE c.id = $1");
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Owner and public visibility of a contact, for the ownership guard.
    pub async fn facts(pool: &PgPool, id: DbId) -> Result<Option<ChildFacts>, sqlx::Error> {
        let published = published_clause(MemberKind::Contact, "c");
        let query = format!("SELECT c.owner_id, {published} FROM contacts c WHERE c.id = $1");
        let row: Option<(DbId, bool)> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|(owner_id, publicly_visible)| ChildFacts {
            owner_id,
            publicly_visible,
        }))
    }

    /// One page of contacts in `scope`, plus the total match count.
    pub async fn list(
        pool: &PgPool,
        scope: ChildScope,
        filter: &ContactFilter,
        sort: Option<SortOrder>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Contact>, i64), sqlx::Error> {
        let where_clause = Self::where_clause();

        let count_query = format!("SELECT COUNT(*) FROM contacts c WHERE {where_clause}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(scope.owner_id())
            .bind(&filter.contact_type)
            .bind(filter.is_primary)
            .bind(&filter.search)
            .fetch_one(pool)
            .await?;

        let order = order_clause(sort, "c", DEFAULT_ORDER);
        let query = format!(
            "SELECT {COLUMNS} FROM contacts c WHERE {where_clause}
             ORDER BY {order} LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, Contact>(&query)
            .bind(scope.owner_id())
            .bind(&filter.contact_type)
            .bind(filter.is_primary)
            .bind(&filter.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Ok((rows, total))
    }

    /// Every contact in `scope` matching `filter`, in default order.
    pub async fn list_all(
        pool: &PgPool,
        scope: ChildScope,
        filter: &ContactFilter,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let where_clause = Self::where_clause();
        let query = format!(
            "SELECT {COLUMNS} FROM contacts c WHERE {where_clause}
             ORDER BY {DEFAULT_ORDER}, c.id"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(scope.owner_id())
            .bind(&filter.contact_type)
            .bind(filter.is_primary)
            .bind(&filter.search)
            .fetch_all(pool)
            .await
    }

    /// Members of a portfolio in default order, optionally only primary
    /// contacts.
    pub async fn list_for_portfolio(
        pool: &PgPool,
        portfolio_id: DbId,
        primary_only: bool,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts c
             JOIN portfolio_contacts pc ON pc.contact_id = c.id
             WHERE pc.portfolio_id = $1 AND ($2 = false OR c.is_primary = true)
             ORDER BY {DEFAULT_ORDER}, c.id"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(portfolio_id)
            .bind(primary_only)
            .fetch_all(pool)
            .await
    }

    /// Up to `per_portfolio` members of each listed portfolio, optionally
    /// only primary contacts, paired with their portfolio id. One query for the
    /// whole page of the public listing.
    pub async fn list_for_portfolios(
        pool: &PgPool,
        portfolio_ids: &[DbId],
        primary_only: bool,
        per_portfolio: i64,
    ) -> Result<Vec<(DbId, Contact)>, sqlx::Error> {
        let query = capped_members_query(
            MemberKind::Contact,
            "contacts",
            COLUMNS,
            DEFAULT_ORDER,
            "is_primary",
        );
        let rows = sqlx::query(&query)
            .bind(portfolio_ids)
            .bind(primary_only)
            .bind(per_portfolio)
            .fetch_all(pool)
            .await?;
        pair_with_portfolio(rows)
    }

    /// Update a contact. Setting `is_primary` clears it on the owner's other
    /// contacts in the same transaction.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateContact,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if input.is_primary == Some(true) {
            sqlx::query(
                "UPDATE contacts SET is_primary = false
                 WHERE owner_id = (SELECT owner_id FROM contacts WHERE id = $1)
                   AND id <> $1 AND is_primary = true",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            "UPDATE contacts AS c SET
                contact_type = COALESCE($2, contact_type),
                value = COALESCE($3, value),
                is_primary = COALESCE($4, is_primary),
                display_order = COALESCE($5, display_order)
             WHERE c.id = $1
             RETURNING {COLUMNS}"
        );
        let contact = sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(&input.contact_type)
            .bind(&input.value)
            .bind(input.is_primary)
            .bind(input.display_order)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(contact)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Shared `WHERE` body. Binds: `$1` owner (NULL = published only),
    /// `$2` type, `$3` primary flag, `$4` search pattern.
    fn where_clause() -> String {
        let published = published_clause(MemberKind::Contact, "c");
        let search = search_clause(CONTACT_SEARCH_FIELDS, "c", 4);
        format!(
            "($1::BIGINT IS NULL OR c.owner_id = $1)
             AND ($1::BIGINT IS NOT NULL OR {published})
             AND ($2::TEXT IS NULL OR c.contact_type = $2)
             AND ($3::BOOLEAN IS NULL OR c.is_primary = $3)
             AND ($4::TEXT IS NULL OR {search})"
        )
    }
}
