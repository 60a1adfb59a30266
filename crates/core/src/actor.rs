//! The identity on whose behalf a request runs.
//!
//! Every guard, visibility and lifecycle function takes an explicit [`Actor`]
//! instead of reading ambient request state.

use crate::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User { id: DbId, is_staff: bool },
}

impl Actor {
    /// A regular authenticated user.
    pub fn user(id: DbId) -> Self {
        Actor::User {
            id,
            is_staff: false,
        }
    }

    /// An authenticated staff (or admin) user.
    pub fn staff(id: DbId) -> Self {
        Actor::User { id, is_staff: true }
    }

    pub fn id(&self) -> Option<DbId> {
        match self {
            Actor::Anonymous => None,
            Actor::User { id, .. } => Some(*id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User { .. })
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Actor::User { is_staff: true, .. })
    }

    /// True when the actor is authenticated and is `owner_id`.
    pub fn owns(&self, owner_id: DbId) -> bool {
        self.id() == Some(owner_id)
    }
}
