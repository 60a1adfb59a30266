//! Enumerated vocabularies for contacts and competences.
//!
//! Values are stored as plain text columns; the database CHECK constraints
//! mirror these lists.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Contact types
// ---------------------------------------------------------------------------

pub const CONTACT_EMAIL: &str = "email";
pub const CONTACT_PHONE: &str = "phone";
pub const CONTACT_LINKEDIN: &str = "linkedin";
pub const CONTACT_GITHUB: &str = "github";
pub const CONTACT_TWITTER: &str = "twitter";
pub const CONTACT_OTHER: &str = "other";

pub const VALID_CONTACT_TYPES: &[&str] = &[
    CONTACT_EMAIL,
    CONTACT_PHONE,
    CONTACT_LINKEDIN,
    CONTACT_GITHUB,
    CONTACT_TWITTER,
    CONTACT_OTHER,
];

/// A user may own at most this many contacts.
pub const MAX_CONTACTS_PER_USER: i64 = 10;

// ---------------------------------------------------------------------------
// Competence levels and categories
// ---------------------------------------------------------------------------

pub const LEVEL_BEGINNER: &str = "beginner";
pub const LEVEL_INTERMEDIATE: &str = "intermediate";
pub const LEVEL_ADVANCED: &str = "advanced";
pub const LEVEL_EXPERT: &str = "expert";

pub const VALID_LEVELS: &[&str] = &[
    LEVEL_BEGINNER,
    LEVEL_INTERMEDIATE,
    LEVEL_ADVANCED,
    LEVEL_EXPERT,
];

pub const CATEGORY_FRONTEND: &str = "frontend";
pub const CATEGORY_BACKEND: &str = "backend";
pub const CATEGORY_MOBILE: &str = "mobile";
pub const CATEGORY_DEVOPS: &str = "devops";
pub const CATEGORY_DATABASE: &str = "database";
pub const CATEGORY_DESIGN: &str = "design";
pub const CATEGORY_OTHER: &str = "other";

pub const VALID_CATEGORIES: &[&str] = &[
    CATEGORY_FRONTEND,
    CATEGORY_BACKEND,
    CATEGORY_MOBILE,
    CATEGORY_DEVOPS,
    CATEGORY_DATABASE,
    CATEGORY_DESIGN,
    CATEGORY_OTHER,
];

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = CATEGORY_OTHER;

// ---------------------------------------------------------------------------
// Portfolio presentation defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_THEME_COLOR: &str = "#2563eb";
pub const DEFAULT_LAYOUT_TYPE: &str = "classic";

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

fn validate_choice(kind: &str, value: &str, valid: &[&str]) -> Result<(), CoreError> {
    if valid.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {kind} '{value}'. Must be one of: {}",
            valid.join(", ")
        )))
    }
}

pub fn validate_contact_type(value: &str) -> Result<(), CoreError> {
    validate_choice("contact type", value, VALID_CONTACT_TYPES)
}

pub fn validate_level(value: &str) -> Result<(), CoreError> {
    validate_choice("level", value, VALID_LEVELS)
}

pub fn validate_category(value: &str) -> Result<(), CoreError> {
    validate_choice("category", value, VALID_CATEGORIES)
}

/// Reject a new contact once the owner already holds the maximum.
pub fn validate_contact_capacity(current: i64) -> Result<(), CoreError> {
    if current >= MAX_CONTACTS_PER_USER {
        Err(CoreError::Validation(format!(
            "Contact limit of {MAX_CONTACTS_PER_USER} reached"
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn known_values_pass() {
        assert!(validate_contact_type("github").is_ok());
        assert!(validate_level("expert").is_ok());
        assert!(validate_category(DEFAULT_CATEGORY).is_ok());
    }

    #[test]
    fn unknown_values_fail() {
        assert_matches!(validate_contact_type("fax"), Err(CoreError::Validation(_)));
        assert_matches!(validate_level("guru"), Err(CoreError::Validation(_)));
        assert_matches!(validate_category("Backend"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn contact_capacity_stops_at_ten() {
        assert!(validate_contact_capacity(9).is_ok());
        assert_matches!(
            validate_contact_capacity(10),
            Err(CoreError::Validation(msg)) if msg.contains("10")
        );
    }
}
