//! Payroll API Module
//!
//! Managers draft payslips; approval, payment and cancellation are reserved
//! for owners.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{permissions, require_role};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores/{store_id}/payroll", routes())
}

fn routes() -> Router<ServerState> {
    let draft_routes = Router::new()
        .route("/", get(handler::list).post(handler::generate))
        .route("/bulk", post(handler::bulk_generate))
        .route("/summary", get(handler::summary))
        .route(
            "/{salary_id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn(require_role(permissions::STORE_ADMINS)));

    let signoff_routes = Router::new()
        .route("/{salary_id}/approve", post(handler::approve))
        .route("/{salary_id}/pay", post(handler::mark_paid))
        .route("/{salary_id}/cancel", post(handler::cancel))
        .layer(middleware::from_fn(require_role(permissions::OWNER_OR_ADMIN)));

    draft_routes.merge(signoff_routes)
}
