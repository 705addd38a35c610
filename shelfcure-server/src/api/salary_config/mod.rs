//! Salary configuration routes

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{permissions, require_role};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/stores/{store_id}/staff/{staff_id}/salary-config",
        get(handler::get_config)
            .put(handler::put_config)
            .layer(middleware::from_fn(require_role(permissions::STORE_ADMINS))),
    )
}
