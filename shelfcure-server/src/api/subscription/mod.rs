//! Subscription routes (store owners)

mod handler;

use axum::{Router, middleware, routing::get, routing::put};

use crate::auth::{permissions, require_role};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/subscription", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get_mine))
        .route("/plan", put(handler::change_plan))
        .layer(middleware::from_fn(require_role(permissions::OWNER)))
}
