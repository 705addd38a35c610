//! Utility module: error re-exports, logging, time, validation and shared types

pub mod logger;
pub mod time;
pub mod types;
pub mod validation;

// Re-export error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use types::PaginationParams;

/// Round to two decimals (hours, percentages, aggregated money)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
