//! Page-number pagination shared by every list endpoint.

use crate::error::CoreError;

/// Page size applied when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 12;

/// Hard cap on a client-requested page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Validate raw query values.
    ///
    /// A page below 1 is a client error. A non-positive page size falls back
    /// to the default and anything above [`MAX_PAGE_SIZE`] is clamped.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Result<Self, CoreError> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(CoreError::Validation(format!(
                "Invalid page '{page}'. Pages start at 1"
            )));
        }
        let page_size = match page_size {
            Some(n) if n >= 1 => n.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        Ok(Self { page, page_size })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn has_next(&self, total: i64) -> bool {
        self.page.saturating_mul(self.page_size) < total
    }

    /// A previous link exists for any page after the first, even one past
    /// the end of the result set.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}
