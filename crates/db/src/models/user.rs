//! User entity model and DTOs.

use folio_core::roles::role_for;
use folio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_admin: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn role(&self) -> &'static str {
        role_for(self.is_admin, self.is_staff)
    }

    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

pub(crate) fn full_name(first: &str, last: &str) -> String {
    format!("{first} {last}").trim().to_string()
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    /// Resolved role name (`"admin"`, `"staff"` or `"user"`).
    pub role: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            role: user.role().to_string(),
            is_active: user.is_active,
            is_staff: user.is_staff,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// Public owner information embedded in portfolio responses.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl OwnerSummary {
    pub fn new(id: DbId, first_name: String, last_name: String) -> Self {
        let full_name = full_name(&first_name, &last_name);
        Self {
            id,
            first_name,
            last_name,
            full_name,
        }
    }
}

/// DTO for creating a new user. The email must already be normalised.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Self-service profile update. The email is not editable here.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Staff-only account flag update.
#[derive(Debug, Default, Deserialize)]
pub struct AdminUpdateUser {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}
