//! Staff API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use shared::models::{Feature, Staff, StaffCreate, StaffQuery, StaffStats, StaffUpdate};
use shared::types::Paginated;

use crate::api::{ApiResponse, AppResult, PaginationParams, created, store_for};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::staff as staff_repo;
use crate::services::staff as staff_service;
use crate::utils::AppError;
use crate::utils::validation::validate_payload;

const FEATURE: Option<Feature> = Some(Feature::StaffManagement);

pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Query(query): Query<StaffQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<Staff>>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let (items, total) =
        staff_repo::list(&state.pool, store.id, &query, page.offset(), page.limit())
            .await
            .map_err(AppError::from)?;
    Ok(ApiResponse::success(Paginated::new(
        items,
        total,
        page.page(),
        page.limit() as u32,
    )))
}

/// Add a staff member; the employee id is assigned here
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Json(payload): Json<StaffCreate>,
) -> AppResult<(StatusCode, ApiResponse<Staff>)> {
    validate_payload(&payload)?;
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let staff = staff_service::create_staff(&state.pool, store.id, &payload, current.id).await?;
    Ok(created(staff))
}

pub async fn stats(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
) -> AppResult<ApiResponse<StaffStats>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let stats = staff_repo::stats(&state.pool, store.id)
        .await
        .map_err(AppError::from)?;
    Ok(ApiResponse::success(stats))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, staff_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<Staff>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let staff = staff_service::load_staff(&state.pool, store.id, staff_id).await?;
    Ok(ApiResponse::success(staff))
}

pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, staff_id)): Path<(i64, i64)>,
    Json(payload): Json<StaffUpdate>,
) -> AppResult<ApiResponse<Staff>> {
    validate_payload(&payload)?;
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let staff = staff_service::update_staff(&state.pool, store.id, staff_id, payload).await?;
    Ok(ApiResponse::success(staff))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, staff_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<()>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    staff_service::delete_staff(&state.pool, store.id, staff_id).await?;
    Ok(ApiResponse::ok())
}
