//! Ownership guard: read/write authorization for portfolios and their
//! child entities (contacts, competences, projets).
//!
//! [`authorize_child`] and [`authorize_portfolio`] answer allow/deny. The
//! `require_*` wrappers turn a denial into the error the caller should see:
//! entities the actor cannot read are reported as not found so their
//! existence does not leak; entities the actor can read but not modify are
//! forbidden.

use crate::actor::Actor;
use crate::error::CoreError;
use crate::lifecycle::PortfolioStatus;
use crate::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn is_read(self) -> bool {
        matches!(self, Operation::List | Operation::Retrieve)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    fn from_bool(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// What the guard needs to know about a contact, competence or projet.
#[derive(Debug, Clone, Copy)]
pub struct ChildFacts {
    pub owner_id: DbId,
    /// Linked to at least one published portfolio and, for competences and
    /// projets, flagged visible/public.
    pub publicly_visible: bool,
}

/// What the guard needs to know about a portfolio.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioFacts {
    pub owner_id: DbId,
    pub status: PortfolioStatus,
}

/// Creation only requires an authenticated actor; ownership is assigned.
pub fn authorize_create(actor: &Actor) -> Decision {
    Decision::from_bool(actor.is_authenticated())
}

pub fn authorize_child(actor: &Actor, facts: &ChildFacts, op: Operation) -> Decision {
    if op == Operation::Create {
        return authorize_create(actor);
    }
    if op.is_read() {
        Decision::from_bool(facts.publicly_visible || actor.owns(facts.owner_id))
    } else {
        Decision::from_bool(actor.owns(facts.owner_id))
    }
}

pub fn authorize_portfolio(actor: &Actor, facts: &PortfolioFacts, op: Operation) -> Decision {
    if op == Operation::Create {
        return authorize_create(actor);
    }
    if op.is_read() {
        Decision::from_bool(
            facts.status == PortfolioStatus::Published || actor.owns(facts.owner_id),
        )
    } else {
        Decision::from_bool(actor.owns(facts.owner_id))
    }
}

/// Enforce [`authorize_child`], mapping a denial to the appropriate error.
pub fn require_child(
    actor: &Actor,
    facts: &ChildFacts,
    op: Operation,
    entity: &'static str,
    id: DbId,
) -> Result<(), CoreError> {
    if authorize_child(actor, facts, op) == Decision::Allow {
        return Ok(());
    }
    let readable = authorize_child(actor, facts, Operation::Retrieve) == Decision::Allow;
    Err(denial(actor, op, readable, entity, id))
}

/// Enforce [`authorize_portfolio`], mapping a denial to the appropriate error.
///
/// Staff can list every portfolio, so a staff actor denied a read gets a 403
/// rather than a 404.
pub fn require_portfolio(
    actor: &Actor,
    facts: &PortfolioFacts,
    op: Operation,
    id: DbId,
) -> Result<(), CoreError> {
    if authorize_portfolio(actor, facts, op) == Decision::Allow {
        return Ok(());
    }
    let readable = actor.is_staff()
        || authorize_portfolio(actor, facts, Operation::Retrieve) == Decision::Allow;
    Err(denial(actor, op, readable, "Portfolio", id))
}

fn denial(
    actor: &Actor,
    op: Operation,
    readable: bool,
    entity: &'static str,
    id: DbId,
) -> CoreError {
    if !op.is_read() && !actor.is_authenticated() {
        return CoreError::Unauthorized("Authentication required".into());
    }
    if readable {
        CoreError::not_owner(entity)
    } else {
        CoreError::NotFound { entity, id }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const OWNER: DbId = 1;
    const OTHER: DbId = 2;

    fn child(publicly_visible: bool) -> ChildFacts {
        ChildFacts {
            owner_id: OWNER,
            publicly_visible,
        }
    }

    fn portfolio(status: PortfolioStatus) -> PortfolioFacts {
        PortfolioFacts {
            owner_id: OWNER,
            status,
        }
    }

    #[test]
    fn public_child_is_readable_by_anyone() {
        for actor in [Actor::Anonymous, Actor::user(OTHER), Actor::user(OWNER)] {
            assert_eq!(
                authorize_child(&actor, &child(true), Operation::Retrieve),
                Decision::Allow
            );
        }
    }

    #[test]
    fn private_child_is_owner_only() {
        assert_eq!(
            authorize_child(&Actor::user(OWNER), &child(false), Operation::Retrieve),
            Decision::Allow
        );
        assert_eq!(
            authorize_child(&Actor::user(OTHER), &child(false), Operation::Retrieve),
            Decision::Deny
        );
        assert_eq!(
            authorize_child(&Actor::Anonymous, &child(false), Operation::List),
            Decision::Deny
        );
    }

    #[test]
    fn writes_require_ownership_even_for_staff() {
        for op in [Operation::Update, Operation::Delete] {
            assert_eq!(
                authorize_child(&Actor::staff(OTHER), &child(true), op),
                Decision::Deny
            );
            assert_eq!(
                authorize_child(&Actor::user(OWNER), &child(false), op),
                Decision::Allow
            );
        }
    }

    #[test]
    fn create_requires_authentication() {
        assert_eq!(authorize_create(&Actor::Anonymous), Decision::Deny);
        assert_eq!(authorize_create(&Actor::user(OTHER)), Decision::Allow);
    }

    #[test]
    fn published_portfolio_is_readable_by_anyone() {
        assert_eq!(
            authorize_portfolio(
                &Actor::Anonymous,
                &portfolio(PortfolioStatus::Published),
                Operation::Retrieve
            ),
            Decision::Allow
        );
    }

    #[test]
    fn draft_portfolio_is_owner_only() {
        let facts = portfolio(PortfolioStatus::Draft);
        assert_eq!(
            authorize_portfolio(&Actor::user(OWNER), &facts, Operation::Retrieve),
            Decision::Allow
        );
        assert_eq!(
            authorize_portfolio(&Actor::user(OTHER), &facts, Operation::Retrieve),
            Decision::Deny
        );
    }

    #[test]
    fn hidden_child_reports_not_found() {
        let err = require_child(
            &Actor::user(OTHER),
            &child(false),
            Operation::Update,
            "Contact",
            9,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Contact", id: 9 });
    }

    #[test]
    fn visible_but_foreign_child_is_forbidden() {
        let err = require_child(
            &Actor::user(OTHER),
            &child(true),
            Operation::Delete,
            "Projet",
            3,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Forbidden(_));
    }

    #[test]
    fn anonymous_write_is_unauthorized() {
        let err = require_portfolio(
            &Actor::Anonymous,
            &portfolio(PortfolioStatus::Published),
            Operation::Update,
            5,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Unauthorized(_));
    }

    #[test]
    fn staff_denied_draft_read_is_forbidden_not_hidden() {
        let err = require_portfolio(
            &Actor::staff(OTHER),
            &portfolio(PortfolioStatus::Draft),
            Operation::Retrieve,
            5,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Forbidden(_));

        let err = require_portfolio(
            &Actor::user(OTHER),
            &portfolio(PortfolioStatus::Draft),
            Operation::Retrieve,
            5,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::NotFound { .. });
    }
}
