//! Store management routes

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{permissions, require_role};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores", routes())
}

fn routes() -> Router<ServerState> {
    // Everyone signed in may list and read the stores they can see
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{store_id}", get(handler::get_by_id));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_role(permissions::OWNER)));

    let manage_routes = Router::new()
        .route("/{store_id}", put(handler::update))
        .layer(middleware::from_fn(require_role(permissions::STORE_ADMINS)));

    let owner_routes = Router::new()
        .route("/{store_id}", delete(handler::delete))
        .route("/{store_id}/manager", put(handler::assign_manager))
        .layer(middleware::from_fn(require_role(permissions::OWNER_OR_ADMIN)));

    read_routes
        .merge(create_routes)
        .merge(manage_routes)
        .merge(owner_routes)
}
