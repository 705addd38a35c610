//! User provisioning routes
//!
//! Owners create logins for managers, staff and cashiers of their stores
//! and can disable them again.

mod handler;

use axum::{Router, middleware, routing::post, routing::put};

use crate::auth::{permissions, require_role};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{user_id}/status", put(handler::set_status))
        .layer(middleware::from_fn(require_role(permissions::OWNER_OR_ADMIN)))
}
