//! Attendance API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use shared::models::{
    AttendanceMark, AttendanceQuery, AttendanceSummary, AttendanceSummaryQuery, AttendanceUpdate,
    AttendanceWithStaff, BulkAttendance, DailyOverview, DailyQuery, Feature, StaffAttendance,
};
use shared::types::{BulkResult, Paginated};

use crate::api::{ApiResponse, AppResult, PaginationParams, created, store_for};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::attendance as attendance_repo;
use crate::services::attendance;
use crate::utils::AppError;
use crate::utils::validation::validate_payload;

const FEATURE: Option<Feature> = Some(Feature::Attendance);

/// Records joined with staff identity; `date` wins over `from`/`to`
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Query(query): Query<AttendanceQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<AttendanceWithStaff>>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let filter = attendance::resolve_filter(query)?;
    let (items, total) =
        attendance_repo::list(&state.pool, store.id, &filter, page.offset(), page.limit())
            .await
            .map_err(AppError::from)?;
    Ok(ApiResponse::success(Paginated::new(
        items,
        total,
        page.page(),
        page.limit() as u32,
    )))
}

pub async fn mark(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Json(payload): Json<AttendanceMark>,
) -> AppResult<(StatusCode, ApiResponse<StaffAttendance>)> {
    validate_payload(&payload)?;
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let record = attendance::mark(&state.pool, &store, payload, current.id).await?;
    tracing::info!(
        store_id = store.id,
        staff_id = record.staff_id,
        date = %record.date,
        "Attendance marked"
    );
    Ok(created(record))
}

/// One date, many staff; per-entry failures are reported, not raised
pub async fn bulk_mark(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Json(payload): Json<BulkAttendance>,
) -> AppResult<ApiResponse<BulkResult<StaffAttendance>>> {
    validate_payload(&payload)?;
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let result = attendance::bulk_mark(&state.pool, &store, payload, current.id).await?;
    Ok(ApiResponse::success(result))
}

pub async fn summary(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Query(query): Query<AttendanceSummaryQuery>,
) -> AppResult<ApiResponse<AttendanceSummary>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let summary = attendance::summary(&state.pool, &store, query).await?;
    Ok(ApiResponse::success(summary))
}

pub async fn daily(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Query(query): Query<DailyQuery>,
) -> AppResult<ApiResponse<DailyOverview>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let overview = attendance::daily_overview(&state.pool, &store, query.date).await?;
    Ok(ApiResponse::success(overview))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, attendance_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<StaffAttendance>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let record = attendance::load(&state.pool, store.id, attendance_id).await?;
    Ok(ApiResponse::success(record))
}

pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, attendance_id)): Path<(i64, i64)>,
    Json(payload): Json<AttendanceUpdate>,
) -> AppResult<ApiResponse<StaffAttendance>> {
    validate_payload(&payload)?;
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let record =
        attendance::update(&state.pool, &store, attendance_id, payload, current.id).await?;
    Ok(ApiResponse::success(record))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, attendance_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<()>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    attendance::delete(&state.pool, store.id, attendance_id).await?;
    tracing::info!(store_id = store.id, attendance_id, "Attendance deleted");
    Ok(ApiResponse::ok())
}
