//! Field-level input validation shared by the create/update handlers.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidateEmail, ValidateUrl};

use crate::error::CoreError;

pub const MAX_NAME_LENGTH: usize = 150;
pub const MAX_CONTACT_VALUE_LENGTH: usize = 255;
pub const MAX_COMPETENCE_NAME_LENGTH: usize = 100;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_LANGUAGE_LENGTH: usize = 100;
pub const MAX_LAYOUT_TYPE_LENGTH: usize = 50;
pub const MAX_META_DESCRIPTION_LENGTH: usize = 300;
pub const MAX_META_KEYWORDS_LENGTH: usize = 200;
pub const MAX_URL_LENGTH: usize = 500;

static THEME_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid theme colour regex"));

/// Reject blank values.
pub fn validate_required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Reject values longer than `max` characters.
pub fn validate_max_length(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Required and bounded, the common case for names and titles.
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    validate_required(field, value)?;
    validate_max_length(field, value, max)
}

pub fn validate_theme_color(value: &str) -> Result<(), CoreError> {
    if THEME_COLOR_RE.is_match(value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid theme color '{value}'. Expected #RRGGBB"
        )))
    }
}

pub fn validate_email(value: &str) -> Result<(), CoreError> {
    if value.validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid email address '{value}'")))
    }
}

/// Lower-case and trim an email before storage or lookup.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn validate_non_negative(field: &str, value: i32) -> Result<(), CoreError> {
    if value < 0 {
        return Err(CoreError::Validation(format!("{field} must be zero or greater")));
    }
    Ok(())
}

/// Optional links must be http(s) URLs when present.
pub fn validate_optional_url(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    let Some(url) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    validate_max_length(field, url, MAX_URL_LENGTH)?;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(CoreError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    if !url.validate_url() {
        return Err(CoreError::Validation(format!("{field} is not a valid URL")));
    }
    Ok(())
}

/// Ids referenced in a membership list must be distinct and positive.
pub fn validate_id_list(field: &str, ids: &[i64]) -> Result<(), CoreError> {
    if let Some(bad) = ids.iter().find(|id| **id <= 0) {
        return Err(CoreError::Validation(format!("{field} contains invalid id {bad}")));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(CoreError::Validation(format!("{field} lists id {dup} more than once")));
    }
    Ok(())
}
