//! Data models
//!
//! Shared between shelfcure-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, all timestamps Unix millis.

pub mod attendance;
pub mod dashboard;
pub mod salary;
pub mod salary_config;
pub mod staff;
pub mod store;
pub mod subscription;
pub mod user;

// Re-exports
pub use attendance::*;
pub use dashboard::*;
pub use salary::*;
pub use salary_config::*;
pub use staff::*;
pub use store::*;
pub use subscription::*;
pub use user::*;
