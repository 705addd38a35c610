//! User provisioning handlers

use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;
use shared::models::{User, UserCreate, UserStatusUpdate};

use crate::api::{ApiResponse, AppResult, created};
use crate::auth::password::hash_password;
use crate::auth::{CurrentUser, permissions};
use crate::core::ServerState;
use crate::db::repository::{RepoError, user as user_repo};
use crate::security_log;
use crate::services::access;
use crate::utils::validation::{validate_password, validate_payload};
use crate::utils::{AppError, ErrorCode};

/// Create a store-scoped login
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, ApiResponse<User>)> {
    validate_payload(&payload)?;
    validate_password(&payload.password)?;

    if !permissions::PROVISIONABLE.contains(&payload.role) {
        return Err(AppError::validation(format!(
            "Role {} cannot be provisioned",
            payload.role
        ))
        .with_detail("field", "role"));
    }
    // The caller must own (or administer) the target store
    let store = access::verify_store_access(&state.pool, &current, payload.store_id).await?;

    let hash = hash_password(&payload.password)?;
    let user = user_repo::create(
        &state.pool,
        payload.name.trim(),
        &payload.email,
        &hash,
        payload.phone.as_deref(),
        payload.role,
        Some(store.id),
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(_) => {
            AppError::new(ErrorCode::EmailAlreadyRegistered).with_detail("field", "email")
        }
        other => other.into(),
    })?;

    tracing::info!(
        user_id = user.id,
        store_id = store.id,
        role = user.role.as_str(),
        created_by = current.id,
        "Store login provisioned"
    );
    Ok(created(user))
}

/// Enable or disable a login
///
/// Owners reach only the store logins of their own stores; anything else is
/// reported as not found. Superadmin may toggle any account but its own.
pub async fn set_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(user_id): Path<i64>,
    Json(payload): Json<UserStatusUpdate>,
) -> AppResult<ApiResponse<User>> {
    if user_id == current.id {
        return Err(AppError::permission_denied(
            "Cannot change the status of your own account",
        ));
    }

    let target = user_repo::find_by_id(&state.pool, user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("User"))?;

    if !current.is_superadmin() {
        let store_id = target
            .store_id
            .filter(|_| permissions::PROVISIONABLE.contains(&target.role))
            .ok_or_else(|| AppError::not_found("User"))?;
        access::verify_store_access(&state.pool, &current, store_id)
            .await
            .map_err(|_| AppError::not_found("User"))?;
    }

    user_repo::set_active(&state.pool, target.id, payload.is_active)
        .await
        .map_err(AppError::from)?;
    security_log!(
        "INFO",
        "user_status_changed",
        user_id = target.id,
        is_active = payload.is_active,
        changed_by = current.id
    );

    let user = user_repo::find_by_id(&state.pool, target.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::success(user))
}
