//! Authentication Routes

mod handler;

use axum::{Router, middleware, routing::get, routing::post, routing::put};

use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::core::ServerState;

/// Build authentication router
/// - /api/auth/register, /api/auth/login: public, rate limited per IP
/// - /api/auth/me, /api/auth/password: any authenticated user
pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route(
            "/api/auth/register",
            post(handler::register).layer(middleware::from_fn_with_state(
                state.clone(),
                register_rate_limit,
            )),
        )
        .route(
            "/api/auth/login",
            post(handler::login).layer(middleware::from_fn_with_state(
                state.clone(),
                login_rate_limit,
            )),
        )
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/password", put(handler::change_password))
}
