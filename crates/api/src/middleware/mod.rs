//! Request extractors for authentication and authorization.
//!
//! - [`auth::AuthUser`] -- requires a valid Bearer token.
//! - [`auth::OptionalActor`] -- anonymous when no token is sent.
//! - [`rbac::RequireStaff`] -- requires the `staff` or `admin` role.

pub mod auth;
pub mod rbac;
