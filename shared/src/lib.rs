//! Shared types for ShelfCure
//!
//! Error codes, the API response envelope, domain models and payloads,
//! and small utilities used by the server and its clients.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use types::{BulkFailure, BulkResult, Paginated};
