//! Per-IP fixed-window rate limiting for the public auth routes

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::ServerState;
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

/// Budget of one rate-limited route
#[derive(Debug, Clone, Copy)]
pub struct RouteLimit {
    pub route: &'static str,
    pub max_requests: u32,
    pub window: Duration,
}

pub const LOGIN_LIMIT: RouteLimit = RouteLimit {
    route: "login",
    max_requests: 5,
    window: Duration::from_secs(60),
};

pub const REGISTER_LIMIT: RouteLimit = RouteLimit {
    route: "register",
    max_requests: 3,
    window: Duration::from_secs(60),
};

/// Entries idle longer than this are dropped by [`RateLimiter::cleanup`]
const STALE_AFTER: Duration = Duration::from_secs(300);

struct Window {
    count: u32,
    started: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route -> client IP -> current window
    windows: Arc<Mutex<HashMap<&'static str, HashMap<String, Window>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request; `Err` carries the seconds until the window resets
    pub async fn check(&self, limit: RouteLimit, ip: &str) -> Result<(), u64> {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        let window = windows
            .entry(limit.route)
            .or_default()
            .entry(ip.to_owned())
            .or_insert(Window {
                count: 0,
                started: now,
            });

        let elapsed = now.duration_since(window.started);
        if elapsed >= limit.window {
            window.count = 0;
            window.started = now;
        }

        window.count += 1;
        if window.count > limit.max_requests {
            let remaining = limit.window.saturating_sub(now.duration_since(window.started));
            return Err(remaining.as_secs().max(1));
        }
        Ok(())
    }

    /// Drop stale windows and empty routes
    pub async fn cleanup(&self) {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        for per_ip in windows.values_mut() {
            per_ip.retain(|_, w| now.duration_since(w.started) < STALE_AFTER);
        }
        windows.retain(|_, per_ip| !per_ip.is_empty());
    }

    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.values().map(HashMap::len).sum()
    }
}

/// Client IP: the socket peer, or the first `X-Forwarded-For` hop when the
/// server sits behind a trusted proxy
fn client_ip(req: &Request, trust_proxy: bool) -> String {
    if trust_proxy
        && let Some(value) = req.headers().get("x-forwarded-for")
        && let Ok(value) = value.to_str()
        && let Some(first) = value.split(',').map(str::trim).find(|ip| !ip.is_empty())
    {
        return first.to_owned();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn enforce(
    state: &ServerState,
    limit: RouteLimit,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&req, state.config.trust_proxy);
    if let Err(retry_after) = state.rate_limiter.check(limit, &ip).await {
        security_log!("WARN", "rate_limited", route = limit.route, ip = %ip);
        return Err(AppError::with_message(
            ErrorCode::TooManyRequests,
            "Too many requests, try again later",
        )
        .with_detail("retry_after_secs", retry_after));
    }
    Ok(next.run(req).await)
}

/// Login: 5 requests per minute per IP
pub async fn login_rate_limit(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, LOGIN_LIMIT, req, next).await
}

/// Registration: 3 requests per minute per IP
pub async fn register_rate_limit(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, REGISTER_LIMIT, req, next).await
}
