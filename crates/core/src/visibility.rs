//! Visibility filter: which rows each actor may see in list queries, plus the
//! per-entity filter, search and ordering vocabulary.
//!
//! The scopes here are data, not SQL. Repositories translate them into
//! `WHERE` fragments with nullable binds.

use crate::actor::Actor;
use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

/// Row scope for contacts, competences and projets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildScope {
    /// Linked to at least one published portfolio (and flagged visible/public
    /// where the entity has such a flag).
    PublishedOnly,
    /// The owner's private working set, regardless of publication.
    OwnedBy(DbId),
}

impl ChildScope {
    /// Anonymous actors see published content; any authenticated actor,
    /// staff included, sees only what they own.
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.id() {
            Some(id) => ChildScope::OwnedBy(id),
            None => ChildScope::PublishedOnly,
        }
    }

    /// Owner bind for the repository query; `None` means "published only".
    pub fn owner_id(self) -> Option<DbId> {
        match self {
            ChildScope::PublishedOnly => None,
            ChildScope::OwnedBy(id) => Some(id),
        }
    }
}

/// Row scope for portfolio listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortfolioScope {
    PublishedOnly,
    PublishedOrOwnedBy(DbId),
    All,
}

impl PortfolioScope {
    pub fn for_actor(actor: &Actor) -> Self {
        match actor {
            Actor::Anonymous => PortfolioScope::PublishedOnly,
            Actor::User { is_staff: true, .. } => PortfolioScope::All,
            Actor::User { id, .. } => PortfolioScope::PublishedOrOwnedBy(*id),
        }
    }

    /// `(restrict_to_published, also_owned_by)` binds.
    ///
    /// `All` is `(false, None)`; `PublishedOnly` is `(true, None)`;
    /// `PublishedOrOwnedBy(id)` is `(true, Some(id))`.
    pub fn binds(self) -> (bool, Option<DbId>) {
        match self {
            PortfolioScope::PublishedOnly => (true, None),
            PortfolioScope::PublishedOrOwnedBy(id) => (true, Some(id)),
            PortfolioScope::All => (false, None),
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// A validated `ORDER BY` column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: &'static str,
    pub descending: bool,
}

impl SortOrder {
    pub fn direction(&self) -> &'static str {
        if self.descending {
            "DESC"
        } else {
            "ASC"
        }
    }
}

pub const CONTACT_ORDERING: &[&str] = &["display_order", "created_at", "contact_type"];
pub const COMPETENCE_ORDERING: &[&str] = &["name", "category", "display_order", "years_experience"];
pub const PROJET_ORDERING: &[&str] = &["title", "realization_date", "display_order"];
pub const PORTFOLIO_ORDERING: &[&str] = &["created_at", "modified_at", "view_count", "title"];

/// Parse an `ordering` parameter (`field` or `-field`) against a whitelist.
///
/// Returns `Ok(None)` for an absent or blank parameter so the caller applies
/// the entity's default ordering. The returned field is the whitelist's own
/// `&'static str`, safe to splice into SQL.
pub fn parse_sort(raw: Option<&str>, allowed: &[&'static str]) -> Result<Option<SortOrder>, CoreError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(r) => r,
    };
    let (name, descending) = match raw.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };
    allowed
        .iter()
        .find(|f| **f == name)
        .map(|field| {
            Some(SortOrder {
                field: *field,
                descending,
            })
        })
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid ordering '{raw}'. Allowed fields: {}",
                allowed.join(", ")
            ))
        })
}

// ---------------------------------------------------------------------------
// Text search
// ---------------------------------------------------------------------------

pub const CONTACT_SEARCH_FIELDS: &[&str] = &["value"];
pub const COMPETENCE_SEARCH_FIELDS: &[&str] = &["name", "description"];
pub const PROJET_SEARCH_FIELDS: &[&str] = &["title", "description", "primary_language"];
pub const PORTFOLIO_SEARCH_FIELDS: &[&str] =
    &["title", "description", "professional_title", "biography"];

/// Build an `ILIKE` pattern matching `term` as a literal substring.
///
/// `\`, `%` and `_` are escaped with a backslash (Postgres' default `ILIKE`
/// escape character).
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// SQL fragment `(a ILIKE $n OR b ILIKE $n ...)` over `fields`, prefixed with
/// `alias.` when given. Field names come from the constants above.
pub fn search_clause(fields: &[&str], alias: &str, bind_index: usize) -> String {
    let parts: Vec<String> = fields
        .iter()
        .map(|f| {
            if alias.is_empty() {
                format!("{f} ILIKE ${bind_index}")
            } else {
                format!("{alias}.{f} ILIKE ${bind_index}")
            }
        })
        .collect();
    format!("({})", parts.join(" OR "))
}

/// Normalise an optional search parameter: blank becomes `None`.
pub fn normalize_search(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn child_scope_depends_only_on_authentication() {
        assert_eq!(ChildScope::for_actor(&Actor::Anonymous), ChildScope::PublishedOnly);
        assert_eq!(ChildScope::for_actor(&Actor::user(4)), ChildScope::OwnedBy(4));
        assert_eq!(ChildScope::for_actor(&Actor::staff(4)), ChildScope::OwnedBy(4));
        assert_eq!(ChildScope::PublishedOnly.owner_id(), None);
    }

    #[test]
    fn portfolio_scope_per_actor() {
        assert_eq!(
            PortfolioScope::for_actor(&Actor::Anonymous).binds(),
            (true, None)
        );
        assert_eq!(
            PortfolioScope::for_actor(&Actor::user(2)).binds(),
            (true, Some(2))
        );
        assert_eq!(PortfolioScope::for_actor(&Actor::staff(2)).binds(), (false, None));
    }

    #[test]
    fn sort_accepts_whitelisted_fields() {
        let sort = parse_sort(Some("-view_count"), PORTFOLIO_ORDERING)
            .unwrap()
            .unwrap();
        assert_eq!(sort.field, "view_count");
        assert_eq!(sort.direction(), "DESC");

        let sort = parse_sort(Some("name"), COMPETENCE_ORDERING).unwrap().unwrap();
        assert_eq!(sort.direction(), "ASC");
    }

    #[test]
    fn sort_absent_means_default() {
        assert_eq!(parse_sort(None, PROJET_ORDERING).unwrap(), None);
        assert_eq!(parse_sort(Some("  "), PROJET_ORDERING).unwrap(), None);
    }

    #[test]
    fn sort_rejects_unknown_field() {
        assert_matches!(
            parse_sort(Some("owner_id; DROP TABLE users"), CONTACT_ORDERING),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            parse_sort(Some("--title"), PROJET_ORDERING),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn search_clause_joins_fields() {
        assert_eq!(
            search_clause(COMPETENCE_SEARCH_FIELDS, "c", 3),
            "(c.name ILIKE $3 OR c.description ILIKE $3)"
        );
        assert_eq!(search_clause(CONTACT_SEARCH_FIELDS, "", 1), "(value ILIKE $1)");
    }

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(normalize_search(Some("   ")), None);
        assert_eq!(normalize_search(None), None);
        assert_eq!(normalize_search(Some(" Go ")).as_deref(), Some("%Go%"));
    }
}
