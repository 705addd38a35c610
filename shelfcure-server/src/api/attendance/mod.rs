//! Attendance API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{permissions, require_role};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores/{store_id}/attendance", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::mark))
        .route("/bulk", post(handler::bulk_mark))
        .route("/summary", get(handler::summary))
        .route("/daily", get(handler::daily))
        .route(
            "/{attendance_id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn(require_role(permissions::STORE_ADMINS)))
}
