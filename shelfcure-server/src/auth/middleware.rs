//! Authentication middleware
//!
//! [`require_auth`] runs on the whole router; [`require_role`] is layered on
//! route groups.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::models::UserRole;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

/// API routes reachable without a token
const PUBLIC_API_ROUTES: &[&str] = &["/api/auth/login", "/api/auth/register"];

/// Require a valid bearer token on `/api` routes
///
/// Inserts [`CurrentUser`] into the request extensions.
///
/// Skipped for:
/// - `OPTIONS` (CORS preflight)
/// - paths outside `/api/` (health check, unknown paths fall through to 404)
/// - `/api/auth/login` and `/api/auth/register`
///
/// | Failure | Status |
/// |---------|--------|
/// | missing header | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | any other token problem | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") || PUBLIC_API_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = %req.uri());
            return Err(AppError::not_authenticated());
        }
    };

    match state.get_jwt_service().validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed token claims: {e}")))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = %e,
                uri = %req.uri()
            );
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Role guard
///
/// ```ignore
/// Router::new()
///     .route("/", post(handler::create))
///     .layer(middleware::from_fn(require_role(permissions::OWNER)));
/// ```
///
/// Responds 403 `RoleRequired` when the caller's role is not listed.
pub fn require_role(
    roles: &'static [UserRole],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_authenticated)?;

            if !user.has_role(roles) {
                security_log!(
                    "WARN",
                    "role_denied",
                    user_id = user.id,
                    role = user.role.as_str(),
                    uri = %req.uri()
                );
                let allowed: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
                return Err(AppError::with_message(
                    ErrorCode::RoleRequired,
                    format!("Requires role: {}", allowed.join(" | ")),
                ));
            }

            Ok(next.run(req).await)
        })
    }
}
