//! Common types for the shared crate

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// One page of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, page_size: u32) -> Self {
        let total_pages = if page_size > 0 {
            ((total.max(0) as f64) / (page_size as f64)).ceil() as u32
        } else {
            1
        };
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

/// Per-item failure of a bulk operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkFailure {
    /// Identifies the item (staff id, employee id, ...)
    pub key: String,
    pub error: String,
}

/// Outcome of a bulk operation; items are processed independently
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResult<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BulkFailure>,
}

impl<T> Default for BulkResult<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BulkResult<T> {
    pub fn push_ok(&mut self, item: T) {
        self.succeeded.push(item);
    }

    pub fn push_err(&mut self, key: impl ToString, error: impl ToString) {
        self.failed.push(BulkFailure {
            key: key.to_string(),
            error: error.to_string(),
        });
    }
}
