//! ShelfCure server: multi-tenant pharmacy back office
//!
//! # Module layout
//!
//! ```text
//! shelfcure-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT, password hashing, role guards, rate limits
//! ├── db/            # SQLite pool and repositories
//! ├── services/      # business rules spanning repositories
//! ├── payroll/       # payslip calculation and lifecycle
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, logging, time, validation
//! ```

// Security logging macro: structured event on the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($fields:tt)*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($fields)*
        );
    };
}

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod payroll;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
