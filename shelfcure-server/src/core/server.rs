//! HTTP server
//!
//! [`build_app`] assembles the router with middleware; integration tests
//! drive it directly with `oneshot`.

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::require_auth;
use crate::core::{Config, Result, ServerState};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// All routes, before authentication is applied
///
/// `state` is only used by route layers that need it (rate limits).
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(api::health::router())
        .merge(api::auth::router(state))
        .merge(api::users::router())
        .merge(api::subscription::router())
        .merge(api::stores::router())
        .merge(api::staff::router())
        .merge(api::attendance::router())
        .merge(api::salary_config::router())
        .merge(api::payroll::router())
        .merge(api::dashboard::router())
        .merge(api::admin::router())
}

/// Router with authentication, state and HTTP middleware applied
pub fn build_app(state: ServerState) -> Router {
    let cors = cors_layer(&state.config);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router(&state)
        // require_auth skips public routes itself
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };
        state.start_background_tasks();

        let app = build_app(state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, environment = %self.config.environment, "ShelfCure server listening");

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
