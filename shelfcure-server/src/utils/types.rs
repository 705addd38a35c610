//! Shared Types
//!
//! Common request types used across the API

use serde::Deserialize;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    /// Page number, 1-based
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Calculate offset for SQL queries
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }

    /// Get limit for SQL queries
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size.clamp(1, MAX_PAGE_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let p = PaginationParams {
            page: 3,
            page_size: 25,
        };
        assert_eq!(p.offset(), 50);
        assert_eq!(p.limit(), 25);
    }

    #[test]
    fn test_clamps_bad_input() {
        let p = PaginationParams {
            page: 0,
            page_size: 5000,
        };
        assert_eq!(p.page(), 1);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), i64::from(MAX_PAGE_SIZE));
    }
}
