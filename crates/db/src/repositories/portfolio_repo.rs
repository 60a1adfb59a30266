//! Repository for the `portfolios` table and its membership tables.
//!
//! Multi-step mutations (create with members, update with member
//! replacement, status transitions, duplication) each run in a single
//! transaction; any error drops the transaction and rolls everything back.

use folio_core::catalog::{DEFAULT_LAYOUT_TYPE, DEFAULT_THEME_COLOR};
use folio_core::error::CoreError;
use folio_core::lifecycle::{copy_title, plan_transition, PortfolioStatus, PublishReadiness};
use folio_core::slug::{dedupe_slug, portfolio_base_slug};
use folio_core::types::{DbId, Timestamp};
use folio_core::visibility::{search_clause, PortfolioScope, SortOrder, PORTFOLIO_SEARCH_FIELDS};
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use crate::error::DbError;
use crate::models::competence::Competence;
use crate::models::contact::Contact;
use crate::models::portfolio::{
    CreatePortfolio, MemberKind, Portfolio, PortfolioDetail, PortfolioFilter, PortfolioListRow,
    PortfolioSummary, UpdatePortfolio,
};
use crate::models::projet::Projet;
use crate::models::user::OwnerSummary;
use crate::repositories::{order_clause, CompetenceRepo, ContactRepo, ProjetRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "p.id, p.owner_id, p.title, p.slug, p.description, p.professional_title, \
    p.biography, p.photo_url, p.status, p.created_at, p.modified_at, p.published_at, \
    p.view_count, p.theme_color, p.layout_type, p.meta_description, p.meta_keywords, \
    p.show_photo, p.show_competences, p.show_projets, p.show_contacts, p.show_formations, \
    p.show_experiences, p.formations, p.experiences, p.languages, p.certifications, p.interests";

/// Columns for list rows (joined with `users u`).
const LIST_COLUMNS: &str = "p.id, p.owner_id, u.first_name AS owner_first_name, \
    u.last_name AS owner_last_name, p.title, p.slug, p.professional_title, p.photo_url, \
    p.status, p.created_at, p.modified_at, p.published_at, p.view_count, \
    (SELECT COUNT(*) FROM portfolio_contacts l WHERE l.portfolio_id = p.id) AS contact_count, \
    (SELECT COUNT(*) FROM portfolio_competences l WHERE l.portfolio_id = p.id) AS competence_count, \
    (SELECT COUNT(*) FROM portfolio_projets l WHERE l.portfolio_id = p.id) AS projet_count";

const DEFAULT_ORDER: &str = "p.modified_at DESC";

/// Provides lifecycle, membership and listing operations for portfolios.
pub struct PortfolioRepo;

impl PortfolioRepo {
    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Portfolio>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM portfolios p WHERE p.id = $1");
        sqlx::query_as::<_, Portfolio>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Option<Portfolio>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM portfolios p WHERE p.owner_id = $1");
        sqlx::query_as::<_, Portfolio>(&query)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a portfolio only if it is currently published.
    pub async fn find_published(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Portfolio>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM portfolios p WHERE p.id = $1 AND p.status = 'published'"
        );
        sqlx::query_as::<_, Portfolio>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of portfolio summaries in `scope`, plus the total count.
    pub async fn list(
        pool: &PgPool,
        scope: PortfolioScope,
        filter: &PortfolioFilter,
        sort: Option<SortOrder>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PortfolioSummary>, i64), sqlx::Error> {
        let (published_only, also_owned_by) = scope.binds();
        let where_clause = Self::where_clause();

        let count_query = format!("SELECT COUNT(*) FROM portfolios p WHERE {where_clause}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(published_only)
            .bind(also_owned_by)
            .bind(&filter.status)
            .bind(filter.owner_id)
            .bind(&filter.layout_type)
            .bind(&filter.competence)
            .bind(&filter.language)
            .bind(&filter.level)
            .bind(&filter.category)
            .bind(&filter.search)
            .fetch_one(pool)
            .await?;

        let rows = Self::fetch(pool, scope, filter, sort, Some(limit), offset).await?;
        Ok((rows, total))
    }

    /// Every portfolio in `scope` matching `filter`, in default order.
    pub async fn list_all(
        pool: &PgPool,
        scope: PortfolioScope,
        filter: &PortfolioFilter,
    ) -> Result<Vec<PortfolioSummary>, sqlx::Error> {
        Self::fetch(pool, scope, filter, None, None, 0).await
    }

    /// Assemble the full representation of `portfolio`.
    ///
    /// With `public_members` only visible competences and public projets are
    /// included, which is what non-owners are allowed to read.
    pub async fn load_detail(
        pool: &PgPool,
        portfolio: Portfolio,
        public_members: bool,
    ) -> Result<PortfolioDetail, sqlx::Error> {
        let (first_name, last_name): (String, String) =
            sqlx::query_as("SELECT first_name, last_name FROM users WHERE id = $1")
                .bind(portfolio.owner_id)
                .fetch_one(pool)
                .await?;

        let contacts: Vec<Contact> =
            ContactRepo::list_for_portfolio(pool, portfolio.id, false).await?;
        let competences: Vec<Competence> =
            CompetenceRepo::list_for_portfolio(pool, portfolio.id, public_members).await?;
        let projets: Vec<Projet> =
            ProjetRepo::list_for_portfolio(pool, portfolio.id, public_members).await?;
        let readiness = Self::readiness(pool, &portfolio).await?;

        Ok(PortfolioDetail {
            owner: OwnerSummary::new(portfolio.owner_id, first_name, last_name),
            is_published: portfolio.is_published(),
            can_be_published: readiness.can_publish(),
            portfolio,
            contacts,
            competences,
            projets,
        })
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create the single portfolio of `owner_id` together with its member
    /// references. Status starts as `draft`.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreatePortfolio,
    ) -> Result<Portfolio, DbError> {
        let mut tx = pool.begin().await?;

        Self::ensure_no_portfolio(&mut tx, owner_id).await?;
        Self::validate_owned(&mut tx, MemberKind::Contact, owner_id, &input.contact_ids).await?;
        Self::validate_owned(&mut tx, MemberKind::Competence, owner_id, &input.competence_ids)
            .await?;
        Self::validate_owned(&mut tx, MemberKind::Projet, owner_id, &input.projet_ids).await?;

        let slug = Self::unique_slug(&mut tx, owner_id, &input.title).await?;

        let query = format!(
            "INSERT INTO portfolios AS p
                (owner_id, title, slug, description, professional_title, biography, photo_url,
                 theme_color, layout_type, meta_description, meta_keywords,
                 show_photo, show_competences, show_projets, show_contacts,
                 show_formations, show_experiences,
                 formations, experiences, languages, certifications, interests)
             VALUES ($1, $2, $3, $4, $5, $6, $7,
                     COALESCE($8, '{DEFAULT_THEME_COLOR}'), COALESCE($9, '{DEFAULT_LAYOUT_TYPE}'),
                     COALESCE($10, ''), COALESCE($11, ''),
                     COALESCE($12, true), COALESCE($13, true), COALESCE($14, true),
                     COALESCE($15, true), COALESCE($16, true), COALESCE($17, true),
                     COALESCE($18, '[]'::jsonb), COALESCE($19, '[]'::jsonb),
                     COALESCE($20, '[]'::jsonb), COALESCE($21, '[]'::jsonb),
                     COALESCE($22, '[]'::jsonb))
             RETURNING {COLUMNS}"
        );
        let portfolio = sqlx::query_as::<_, Portfolio>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&slug)
            .bind(&input.description)
            .bind(&input.professional_title)
            .bind(&input.biography)
            .bind(&input.photo_url)
            .bind(&input.theme_color)
            .bind(&input.layout_type)
            .bind(&input.meta_description)
            .bind(&input.meta_keywords)
            .bind(input.show_photo)
            .bind(input.show_competences)
            .bind(input.show_projets)
            .bind(input.show_contacts)
            .bind(input.show_formations)
            .bind(input.show_experiences)
            .bind(&input.formations)
            .bind(&input.experiences)
            .bind(&input.languages)
            .bind(&input.certifications)
            .bind(&input.interests)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_members_inner(&mut tx, MemberKind::Contact, portfolio.id, &input.contact_ids)
            .await?;
        Self::set_members_inner(
            &mut tx,
            MemberKind::Competence,
            portfolio.id,
            &input.competence_ids,
        )
        .await?;
        Self::set_members_inner(&mut tx, MemberKind::Projet, portfolio.id, &input.projet_ids)
            .await?;

        tx.commit().await?;
        Ok(portfolio)
    }

    /// Partially update a portfolio. Member lists that are present replace
    /// the whole set after ownership validation against the portfolio owner.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePortfolio,
    ) -> Result<Portfolio, DbError> {
        let mut tx = pool.begin().await?;

        let current = Self::lock(&mut tx, id).await?;
        let members = [
            (MemberKind::Contact, &input.contact_ids),
            (MemberKind::Competence, &input.competence_ids),
            (MemberKind::Projet, &input.projet_ids),
        ];
        for (kind, ids) in members {
            if let Some(ids) = ids {
                Self::validate_owned(&mut tx, kind, current.owner_id, ids).await?;
            }
        }

        let query = format!(
            "UPDATE portfolios AS p SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                professional_title = COALESCE($4, professional_title),
                biography = COALESCE($5, biography),
                photo_url = COALESCE($6, photo_url),
                theme_color = COALESCE($7, theme_color),
                layout_type = COALESCE($8, layout_type),
                meta_description = COALESCE($9, meta_description),
                meta_keywords = COALESCE($10, meta_keywords),
                show_photo = COALESCE($11, show_photo),
                show_competences = COALESCE($12, show_competences),
                show_projets = COALESCE($13, show_projets),
                show_contacts = COALESCE($14, show_contacts),
                show_formations = COALESCE($15, show_formations),
                show_experiences = COALESCE($16, show_experiences),
                formations = COALESCE($17, formations),
                experiences = COALESCE($18, experiences),
                languages = COALESCE($19, languages),
                certifications = COALESCE($20, certifications),
                interests = COALESCE($21, interests),
                modified_at = NOW()
             WHERE p.id = $1
             RETURNING {COLUMNS}"
        );
        let portfolio = sqlx::query_as::<_, Portfolio>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.professional_title)
            .bind(&input.biography)
            .bind(&input.photo_url)
            .bind(&input.theme_color)
            .bind(&input.layout_type)
            .bind(&input.meta_description)
            .bind(&input.meta_keywords)
            .bind(input.show_photo)
            .bind(input.show_competences)
            .bind(input.show_projets)
            .bind(input.show_contacts)
            .bind(input.show_formations)
            .bind(input.show_experiences)
            .bind(&input.formations)
            .bind(&input.experiences)
            .bind(&input.languages)
            .bind(&input.certifications)
            .bind(&input.interests)
            .fetch_one(&mut *tx)
            .await?;

        for (kind, ids) in members {
            if let Some(ids) = ids {
                Self::set_members_inner(&mut tx, kind, id, ids).await?;
            }
        }

        tx.commit().await?;
        Ok(portfolio)
    }

    /// Move a portfolio to `target`, enforcing the publication rules.
    ///
    /// The row is locked for the duration of the check so the readiness and
    /// one-published-per-owner facts cannot change underneath the write.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        target: PortfolioStatus,
        now: Timestamp,
    ) -> Result<Portfolio, DbError> {
        let mut tx = pool.begin().await?;

        let current = Self::lock(&mut tx, id).await?;
        let status = current.parsed_status()?;
        let readiness = if target == PortfolioStatus::Published {
            Self::readiness(&mut *tx, &current).await?
        } else {
            PublishReadiness::default()
        };

        let plan = plan_transition(status, target, current.published_at, &readiness, now)?;
        if plan.status == status && plan.published_at == current.published_at {
            tx.commit().await?;
            return Ok(current);
        }

        let query = format!(
            "UPDATE portfolios AS p SET status = $2, published_at = $3, modified_at = NOW()
             WHERE p.id = $1
             RETURNING {COLUMNS}"
        );
        let portfolio = sqlx::query_as::<_, Portfolio>(&query)
            .bind(id)
            .bind(plan.status.as_str())
            .bind(plan.published_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(portfolio)
    }

    /// Bump the view counter of a published portfolio, returning the new
    /// count, or `None` if the portfolio is not (or no longer) published.
    pub async fn increment_view_count(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE portfolios SET view_count = view_count + 1
             WHERE id = $1 AND status = 'published'
             RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Clone `source_id` into a new draft portfolio owned by `actor_id`.
    ///
    /// Every contact, competence and projet referenced by the source is
    /// copied into a new row owned by the actor and linked to the copy. The
    /// source is left untouched. Fails if the actor already owns a portfolio.
    pub async fn duplicate(
        pool: &PgPool,
        source_id: DbId,
        actor_id: DbId,
    ) -> Result<Portfolio, DbError> {
        let mut tx = pool.begin().await?;

        Self::ensure_no_portfolio(&mut tx, actor_id).await?;

        let source_query = format!("SELECT {COLUMNS} FROM portfolios p WHERE p.id = $1");
        let source = sqlx::query_as::<_, Portfolio>(&source_query)
            .bind(source_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Portfolio",
                id: source_id,
            })?;

        let title = copy_title(&source.title);
        let slug = Self::unique_slug(&mut tx, actor_id, &title).await?;

        let insert = format!(
            "INSERT INTO portfolios AS p
                (owner_id, title, slug, description, professional_title, biography, photo_url,
                 theme_color, layout_type, meta_description, meta_keywords,
                 show_photo, show_competences, show_projets, show_contacts,
                 show_formations, show_experiences,
                 formations, experiences, languages, certifications, interests)
             SELECT $1, $2, $3, s.description, s.professional_title, s.biography, s.photo_url,
                    s.theme_color, s.layout_type, s.meta_description, s.meta_keywords,
                    s.show_photo, s.show_competences, s.show_projets, s.show_contacts,
                    s.show_formations, s.show_experiences,
                    s.formations, s.experiences, s.languages, s.certifications, s.interests
             FROM portfolios s WHERE s.id = $4
             RETURNING {COLUMNS}"
        );
        let copy = sqlx::query_as::<_, Portfolio>(&insert)
            .bind(actor_id)
            .bind(&title)
            .bind(&slug)
            .bind(source_id)
            .fetch_one(&mut *tx)
            .await?;

        let contact_ids: Vec<DbId> = sqlx::query_scalar(
            "INSERT INTO contacts (owner_id, contact_type, value, is_primary, display_order)
             SELECT $1, c.contact_type, c.value, c.is_primary, c.display_order
             FROM contacts c JOIN portfolio_contacts l ON l.contact_id = c.id
             WHERE l.portfolio_id = $2
             ORDER BY c.id
             RETURNING id",
        )
        .bind(actor_id)
        .bind(source_id)
        .fetch_all(&mut *tx)
        .await?;

        let competence_ids: Vec<DbId> = sqlx::query_scalar(
            "INSERT INTO competences
                (owner_id, name, level, category, years_experience, description,
                 is_visible, display_order)
             SELECT $1, c.name, c.level, c.category, c.years_experience, c.description,
                    c.is_visible, c.display_order
             FROM competences c JOIN portfolio_competences l ON l.competence_id = c.id
             WHERE l.portfolio_id = $2
             ORDER BY c.id
             RETURNING id",
        )
        .bind(actor_id)
        .bind(source_id)
        .fetch_all(&mut *tx)
        .await?;

        let projet_ids: Vec<DbId> = sqlx::query_scalar(
            "INSERT INTO projets
                (owner_id, title, description, primary_language, project_url, github_url,
                 image_url, technologies, realization_date, is_public, is_complete,
                 display_order)
             SELECT $1, c.title, c.description, c.primary_language, c.project_url,
                    c.github_url, c.image_url, c.technologies, c.realization_date,
                    c.is_public, c.is_complete, c.display_order
             FROM projets c JOIN portfolio_projets l ON l.projet_id = c.id
             WHERE l.portfolio_id = $2
             ORDER BY c.id
             RETURNING id",
        )
        .bind(actor_id)
        .bind(source_id)
        .fetch_all(&mut *tx)
        .await?;

        Self::set_members_inner(&mut tx, MemberKind::Contact, copy.id, &contact_ids).await?;
        Self::set_members_inner(&mut tx, MemberKind::Competence, copy.id, &competence_ids).await?;
        Self::set_members_inner(&mut tx, MemberKind::Projet, copy.id, &projet_ids).await?;

        tx.commit().await?;
        Ok(copy)
    }

    /// Link a child to a portfolio. Returns `false` if it was already linked.
    pub async fn add_member(
        pool: &PgPool,
        portfolio_id: DbId,
        kind: MemberKind,
        child_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (portfolio_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            kind.link_table(),
            kind.link_column()
        );
        let result = sqlx::query(&query)
            .bind(portfolio_id)
            .bind(child_id)
            .execute(pool)
            .await?;
        Self::touch(pool, portfolio_id).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unlink a child from a portfolio. Returns `false` if it was not linked.
    pub async fn remove_member(
        pool: &PgPool,
        portfolio_id: DbId,
        kind: MemberKind,
        child_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "DELETE FROM {} WHERE portfolio_id = $1 AND {} = $2",
            kind.link_table(),
            kind.link_column()
        );
        let result = sqlx::query(&query)
            .bind(portfolio_id)
            .bind(child_id)
            .execute(pool)
            .await?;
        Self::touch(pool, portfolio_id).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Publication readiness of `portfolio`, including whether another
    /// portfolio of the same owner is already published.
    pub async fn readiness<'e, E>(
        executor: E,
        portfolio: &Portfolio,
    ) -> Result<PublishReadiness, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (competences, public_projets, other_published): (i64, i64, bool) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM portfolio_competences l WHERE l.portfolio_id = $1),
                (SELECT COUNT(*) FROM portfolio_projets l
                   JOIN projets c ON c.id = l.projet_id
                  WHERE l.portfolio_id = $1 AND c.is_public = true),
                EXISTS (SELECT 1 FROM portfolios
                         WHERE owner_id = $2 AND status = 'published' AND id <> $1)",
        )
        .bind(portfolio.id)
        .bind(portfolio.owner_id)
        .fetch_one(executor)
        .await?;

        Ok(PublishReadiness::new(
            &portfolio.title,
            &portfolio.description,
            competences,
            public_projets,
            other_published,
        ))
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn fetch(
        pool: &PgPool,
        scope: PortfolioScope,
        filter: &PortfolioFilter,
        sort: Option<SortOrder>,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<PortfolioSummary>, sqlx::Error> {
        let (published_only, also_owned_by) = scope.binds();
        let order = order_clause(sort, "p", DEFAULT_ORDER);
        let query = format!(
            "SELECT {LIST_COLUMNS}
             FROM portfolios p JOIN users u ON u.id = p.owner_id
             WHERE {}
             ORDER BY {order}
             LIMIT $11 OFFSET $12",
            Self::where_clause()
        );
        let rows = sqlx::query_as::<_, PortfolioListRow>(&query)
            .bind(published_only)
            .bind(also_owned_by)
            .bind(&filter.status)
            .bind(filter.owner_id)
            .bind(&filter.layout_type)
            .bind(&filter.competence)
            .bind(&filter.language)
            .bind(&filter.level)
            .bind(&filter.category)
            .bind(&filter.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(PortfolioSummary::from).collect())
    }

    /// Binds: `$1` published-only flag, `$2` extra owner allowed past the
    /// published-only restriction, `$3` status, `$4` owner, `$5` layout,
    /// `$6` competence name pattern, `$7` language pattern, `$8` competence
    /// level, `$9` competence category, `$10` text search pattern.
    fn where_clause() -> String {
        let search = search_clause(PORTFOLIO_SEARCH_FIELDS, "p", 10);
        format!(
            "($1::BOOLEAN = false OR p.status = 'published'
                OR ($2::BIGINT IS NOT NULL AND p.owner_id = $2))
             AND ($3::TEXT IS NULL OR p.status = $3)
             AND ($4::BIGINT IS NULL OR p.owner_id = $4)
             AND ($5::TEXT IS NULL OR p.layout_type = $5)
             AND ($6::TEXT IS NULL OR EXISTS (
                    SELECT 1 FROM portfolio_competences l JOIN competences c ON c.id = l.competence_id
                     WHERE l.portfolio_id = p.id AND c.name ILIKE $6))
             AND ($7::TEXT IS NULL OR EXISTS (
                    SELECT 1 FROM portfolio_projets l JOIN projets c ON c.id = l.projet_id
                     WHERE l.portfolio_id = p.id AND c.primary_language ILIKE $7))
             AND ($8::TEXT IS NULL OR EXISTS (
                    SELECT 1 FROM portfolio_competences l JOIN competences c ON c.id = l.competence_id
                     WHERE l.portfolio_id = p.id AND c.level = $8))
             AND ($9::TEXT IS NULL OR EXISTS (
                    SELECT 1 FROM portfolio_competences l JOIN competences c ON c.id = l.competence_id
                     WHERE l.portfolio_id = p.id AND c.category = $9))
             AND ($10::TEXT IS NULL OR {search})"
        )
    }

    /// Load and row-lock a portfolio inside a transaction.
    async fn lock(tx: &mut Transaction<'_, Postgres>, id: DbId) -> Result<Portfolio, DbError> {
        let query = format!("SELECT {COLUMNS} FROM portfolios p WHERE p.id = $1 FOR UPDATE");
        sqlx::query_as::<_, Portfolio>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "Portfolio",
                    id,
                }
                .into()
            })
    }

    async fn ensure_no_portfolio(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: DbId,
    ) -> Result<(), DbError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM portfolios WHERE owner_id = $1)")
                .bind(owner_id)
                .fetch_one(&mut **tx)
                .await?;
        if exists {
            return Err(CoreError::Validation("You already have a portfolio".into()).into());
        }
        Ok(())
    }

    /// Every id in `ids` must name an existing child owned by `owner_id`.
    async fn validate_owned(
        tx: &mut Transaction<'_, Postgres>,
        kind: MemberKind,
        owner_id: DbId,
        ids: &[DbId],
    ) -> Result<(), DbError> {
        if ids.is_empty() {
            return Ok(());
        }
        let query = format!(
            "SELECT id FROM {} WHERE owner_id = $1 AND id = ANY($2)",
            kind.child_table()
        );
        let owned: Vec<DbId> = sqlx::query_scalar(&query)
            .bind(owner_id)
            .bind(ids)
            .fetch_all(&mut **tx)
            .await?;
        if let Some(bad) = ids.iter().find(|id| !owned.contains(id)) {
            return Err(CoreError::Validation(format!(
                "{} {bad} does not exist or does not belong to you",
                kind.entity()
            ))
            .into());
        }
        Ok(())
    }

    /// Replace the member set of `kind` within an existing transaction.
    async fn set_members_inner(
        tx: &mut Transaction<'_, Postgres>,
        kind: MemberKind,
        portfolio_id: DbId,
        ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let delete = format!("DELETE FROM {} WHERE portfolio_id = $1", kind.link_table());
        sqlx::query(&delete)
            .bind(portfolio_id)
            .execute(&mut **tx)
            .await?;

        if ids.is_empty() {
            return Ok(());
        }
        let insert = format!(
            "INSERT INTO {} (portfolio_id, {})
             SELECT $1, unnest($2::BIGINT[])
             ON CONFLICT DO NOTHING",
            kind.link_table(),
            kind.link_column()
        );
        sqlx::query(&insert)
            .bind(portfolio_id)
            .bind(ids)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// First free slug for the owner's name plus `title`.
    async fn unique_slug(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: DbId,
        title: &str,
    ) -> Result<String, sqlx::Error> {
        let (first_name, last_name): (String, String) =
            sqlx::query_as("SELECT first_name, last_name FROM users WHERE id = $1")
                .bind(owner_id)
                .fetch_one(&mut **tx)
                .await?;
        let base = portfolio_base_slug(&first_name, &last_name, title);

        // Slugs are [a-z0-9-] only, so the prefix needs no LIKE escaping.
        let prefix: String = base.chars().take(180).collect();
        let taken: Vec<String> = sqlx::query_scalar("SELECT slug FROM portfolios WHERE slug LIKE $1")
            .bind(format!("{prefix}%"))
            .fetch_all(&mut **tx)
            .await?;
        Ok(dedupe_slug(&base, &taken))
    }

    async fn touch(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE portfolios SET modified_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
