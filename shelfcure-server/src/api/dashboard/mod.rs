//! Dashboard routes

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{permissions, require_role};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let owner_routes = Router::new()
        .route("/api/dashboard", get(handler::owner_overview))
        .layer(middleware::from_fn(require_role(permissions::OWNER)));

    owner_routes.route("/api/stores/{store_id}/dashboard", get(handler::store_dashboard))
}
