//! Authentication and authorization
//!
//! - [`JwtService`] issues and validates access tokens
//! - [`CurrentUser`] is the authenticated caller
//! - [`require_auth`] authenticates every `/api` request
//! - [`require_role`] guards routes by role
//! - [`RateLimiter`] throttles login and registration per IP

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod rate_limit;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_role};
pub use rate_limit::RateLimiter;
