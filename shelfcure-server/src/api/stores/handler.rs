//! Store API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use shared::models::{AssignManager, Store, StoreCreate, StoreUpdate};
use shared::types::Paginated;

use crate::api::{ApiResponse, AppResult, PaginationParams, created, store_for};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, store as store_repo};
use crate::services::stores;
use crate::utils::validation::validate_payload;
use crate::utils::{AppError, ErrorCode};

/// Stores visible to the caller
///
/// Owners page through their own stores, superadmin through all of them;
/// store-scoped roles get their assigned store.
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(page): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<Store>>> {
    let (items, total) = if current.is_superadmin() {
        store_repo::list_all(&state.pool, page.offset(), page.limit()).await
    } else if current.is_owner() {
        store_repo::list_by_owner(&state.pool, current.id, page.offset(), page.limit()).await
    } else {
        match current.store_id {
            Some(id) => store_repo::find_by_id(&state.pool, id).await.map(|s| {
                let items: Vec<Store> = s.into_iter().collect();
                let total = items.len() as i64;
                (items, total)
            }),
            None => Ok((Vec::new(), 0)),
        }
    }
    .map_err(AppError::from)?;

    Ok(ApiResponse::success(Paginated::new(
        items,
        total,
        page.page(),
        page.limit() as u32,
    )))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
) -> AppResult<ApiResponse<Store>> {
    let store = store_for(&state, &current, store_id, None).await?;
    Ok(ApiResponse::success(store))
}

/// Create a store; consumes one slot of the owner's plan
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<StoreCreate>,
) -> AppResult<(StatusCode, ApiResponse<Store>)> {
    validate_payload(&payload)?;
    let store = stores::create_store(
        &state.pool,
        &state.subscriptions,
        &current,
        state.config.trial_days,
        &payload,
    )
    .await?;
    Ok(created(store))
}

pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Json(payload): Json<StoreUpdate>,
) -> AppResult<ApiResponse<Store>> {
    validate_payload(&payload)?;
    let store = store_for(&state, &current, store_id, None).await?;

    let updated = store_repo::update(&state.pool, store.id, payload)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::with_message(
                ErrorCode::LicenseNumberExists,
                "license_number already exists",
            )
            .with_detail("field", "license_number"),
            other => other.into(),
        })?;
    tracing::info!(store_id = updated.id, "Store updated");
    Ok(ApiResponse::success(updated))
}

/// Delete a store and free its subscription slot
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    let store = store_for(&state, &current, store_id, None).await?;
    stores::delete_store(&state.pool, &state.subscriptions, &store).await?;
    Ok(ApiResponse::ok())
}

pub async fn assign_manager(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Json(payload): Json<AssignManager>,
) -> AppResult<ApiResponse<Store>> {
    let store = store_for(&state, &current, store_id, None).await?;
    let store = stores::assign_manager(&state.pool, &store, payload.user_id).await?;
    Ok(ApiResponse::success(store))
}
