//! Superadmin routes

mod handler;

use axum::{Router, middleware, routing::get, routing::put};

use crate::auth::{permissions, require_role};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/subscriptions", get(handler::list_subscriptions))
        .route("/subscriptions/{owner_id}/status", put(handler::set_status))
        .layer(middleware::from_fn(require_role(permissions::SUPERADMIN)))
}
