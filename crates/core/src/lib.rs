//! Domain rules for the portfolio platform, free of I/O.

pub mod access;
pub mod actor;
pub mod catalog;
pub mod error;
pub mod lifecycle;
pub mod pagination;
pub mod roles;
pub mod slug;
pub mod stats;
pub mod types;
pub mod validation;
pub mod visibility;
