//! Well-known role name constants.
//!
//! Roles are derived from the `is_admin` / `is_staff` flags on the `users`
//! table and embedded in access-token claims.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_USER: &str = "user";

/// Resolve the role name for a user's flags. `is_admin` wins over `is_staff`.
pub fn role_for(is_admin: bool, is_staff: bool) -> &'static str {
    if is_admin {
        ROLE_ADMIN
    } else if is_staff {
        ROLE_STAFF
    } else {
        ROLE_USER
    }
}

/// Admins and staff share the same elevated read access.
pub fn is_staff_role(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_STAFF
}
