//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod competence_repo;
pub mod contact_repo;
pub mod portfolio_repo;
pub mod projet_repo;
pub mod session_repo;
pub mod stats_repo;
pub mod user_repo;

pub use competence_repo::CompetenceRepo;
pub use contact_repo::ContactRepo;
pub use portfolio_repo::PortfolioRepo;
pub use projet_repo::ProjetRepo;
pub use session_repo::SessionRepo;
pub use stats_repo::StatsRepo;
pub use user_repo::UserRepo;

use folio_core::types::DbId;
use folio_core::visibility::SortOrder;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use crate::models::portfolio::MemberKind;

/// SQL predicate: the child row aliased `alias` is linked to at least one
/// published portfolio and, for competences and projets, flagged visible.
pub(crate) fn published_clause(kind: MemberKind, alias: &str) -> String {
    let link = kind.link_table();
    let column = kind.link_column();
    let linked = format!(
        "EXISTS (SELECT 1 FROM {link} l JOIN portfolios p ON p.id = l.portfolio_id \
         WHERE l.{column} = {alias}.id AND p.status = 'published')"
    );
    match kind {
        MemberKind::Contact => linked,
        MemberKind::Competence => format!("({alias}.is_visible AND {linked})"),
        MemberKind::Projet => format!("({alias}.is_public AND {linked})"),
    }
}

/// `ORDER BY` body for a validated sort, falling back to `default`. The row
/// id is always appended so pagination is stable.
pub(crate) fn order_clause(sort: Option<SortOrder>, alias: &str, default: &str) -> String {
    match sort {
        Some(s) => format!("{alias}.{} {}, {alias}.id", s.field, s.direction()),
        None => format!("{default}, {alias}.id"),
    }
}

/// Query returning at most `$3` members of `kind` per portfolio for every
/// portfolio id in `$1`, ranked by `order` within each portfolio. When `$2`
/// is true only rows with `flag_column` set are kept.
///
/// Rows carry a leading `portfolio_id`; decode them with [`pair_with_portfolio`].
pub(crate) fn capped_members_query(
    kind: MemberKind,
    table: &str,
    columns: &str,
    order: &str,
    flag_column: &str,
) -> String {
    let link = kind.link_table();
    let column = kind.link_column();
    format!(
        "SELECT c.portfolio_id, {columns} FROM (
             SELECT l.portfolio_id, c.*,
                    ROW_NUMBER() OVER (PARTITION BY l.portfolio_id ORDER BY {order}, c.id)
                        AS member_rank
             FROM {table} c
             JOIN {link} l ON l.{column} = c.id
             WHERE l.portfolio_id = ANY($1) AND ($2 = false OR c.{flag_column} = true)
         ) c
         WHERE c.member_rank <= $3
         ORDER BY c.portfolio_id, c.member_rank"
    )
}

pub(crate) fn pair_with_portfolio<T>(rows: Vec<PgRow>) -> Result<Vec<(DbId, T)>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    rows.iter()
        .map(|row| Ok((row.try_get("portfolio_id")?, T::from_row(row)?)))
        .collect()
}
