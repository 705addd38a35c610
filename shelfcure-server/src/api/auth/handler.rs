//! Authentication Handlers
//!
//! Registration creates a store owner with a trial subscription; login
//! verifies the argon2 hash and issues a JWT.

use axum::{Json, extract::State};
use http::StatusCode;
use shared::models::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, User, UserRole};

use crate::api::{ApiResponse, AppResult, created};
use crate::auth::CurrentUser;
use crate::auth::password::{hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::{RepoError, user as user_repo};
use crate::security_log;
use crate::services::subscription as subscription_service;
use crate::utils::validation::{validate_password, validate_payload};
use crate::utils::{AppError, ErrorCode};

fn issue(state: &ServerState, user: User) -> AppResult<AuthResponse> {
    let token = state
        .get_jwt_service()
        .generate_token(&user)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
    Ok(AuthResponse { token, user })
}

/// Register a store owner
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, ApiResponse<AuthResponse>)> {
    validate_payload(&req)?;
    validate_password(&req.password)?;

    let hash = hash_password(&req.password)?;
    let user = user_repo::create(
        &state.pool,
        req.name.trim(),
        &req.email,
        &hash,
        req.phone.as_deref(),
        UserRole::StoreOwner,
        None,
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(_) => {
            AppError::new(ErrorCode::EmailAlreadyRegistered).with_detail("field", "email")
        }
        other => other.into(),
    })?;

    subscription_service::ensure_for_owner(&state.pool, user.id, state.config.trial_days).await?;
    tracing::info!(user_id = user.id, "Store owner registered");

    Ok(created(issue(&state, user)?))
}

/// Login handler
///
/// Unknown email and wrong password give the same error.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    validate_payload(&req)?;

    let user = user_repo::find_by_email(&state.pool, &req.email)
        .await
        .map_err(AppError::from)?;

    let user = match user {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        Some(u) => {
            security_log!("WARN", "login_failed", user_id = u.id, reason = "invalid_password");
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!("WARN", "login_failed", email = %req.email, reason = "user_not_found");
            return Err(AppError::invalid_credentials());
        }
    };

    if !user.is_active {
        security_log!("WARN", "login_disabled", user_id = user.id);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    user_repo::touch_last_login(&state.pool, user.id)
        .await
        .map_err(AppError::from)?;
    tracing::info!(user_id = user.id, role = user.role.as_str(), "User logged in");

    Ok(ApiResponse::success(issue(&state, user)?))
}

/// Current user profile
pub async fn me(State(state): State<ServerState>, current: CurrentUser) -> AppResult<ApiResponse<User>> {
    let user = user_repo::find_by_id(&state.pool, current.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(AppError::not_authenticated)?;
    Ok(ApiResponse::success(user))
}

pub async fn change_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = user_repo::find_by_id(&state.pool, current.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(AppError::not_authenticated)?;

    if !verify_password(&req.current_password, &user.password_hash) {
        security_log!("WARN", "password_change_failed", user_id = user.id);
        return Err(AppError::invalid_credentials().with_detail("field", "current_password"));
    }
    validate_password(&req.new_password)?;

    let hash = hash_password(&req.new_password)?;
    user_repo::update_password(&state.pool, user.id, &hash)
        .await
        .map_err(AppError::from)?;
    tracing::info!(user_id = user.id, "Password changed");

    Ok(ApiResponse::ok())
}
