//! Domain model structs and DTOs.
//!
//! Each entity submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - A filter struct for list queries

pub mod competence;
pub mod contact;
pub mod portfolio;
pub mod projet;
pub mod session;
pub mod stats;
pub mod user;
