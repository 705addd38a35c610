//! Payroll API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use shared::models::{
    BulkSalaryGenerate, Feature, MarkPaid, PayrollSummary, PeriodQuery, SalaryAdjustment,
    SalaryGenerate, SalaryQuery, StaffSalary,
};
use shared::types::{BulkResult, Paginated};

use crate::api::{ApiResponse, AppResult, PaginationParams, created, store_for};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::salary as salary_repo;
use crate::payroll;
use crate::utils::AppError;
use crate::utils::validation::validate_payload;

const FEATURE: Option<Feature> = Some(Feature::Payroll);

pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Query(query): Query<SalaryQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<StaffSalary>>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let (items, total) =
        salary_repo::list(&state.pool, store.id, &query, page.offset(), page.limit())
            .await
            .map_err(AppError::from)?;
    Ok(ApiResponse::success(Paginated::new(
        items,
        total,
        page.page(),
        page.limit() as u32,
    )))
}

/// Generate (or regenerate) the draft payslip of one staff member
pub async fn generate(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Json(payload): Json<SalaryGenerate>,
) -> AppResult<(StatusCode, ApiResponse<StaffSalary>)> {
    validate_payload(&payload)?;
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let salary = payroll::generate(&state.pool, &store, payload, current.id).await?;
    Ok(created(salary))
}

pub async fn bulk_generate(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Json(payload): Json<BulkSalaryGenerate>,
) -> AppResult<ApiResponse<BulkResult<StaffSalary>>> {
    validate_payload(&payload)?;
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let result = payroll::bulk_generate(&state.pool, &store, payload, current.id).await?;
    Ok(ApiResponse::success(result))
}

pub async fn summary(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<ApiResponse<PayrollSummary>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let summary = payroll::summary(&state.pool, &store, period.month, period.year).await?;
    Ok(ApiResponse::success(summary))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, salary_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<StaffSalary>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let salary = payroll::load(&state.pool, store.id, salary_id).await?;
    Ok(ApiResponse::success(salary))
}

/// Adjust a draft payslip
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, salary_id)): Path<(i64, i64)>,
    Json(payload): Json<SalaryAdjustment>,
) -> AppResult<ApiResponse<StaffSalary>> {
    validate_payload(&payload)?;
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let salary =
        payroll::update_adjustments(&state.pool, store.id, salary_id, payload, current.id).await?;
    Ok(ApiResponse::success(salary))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, salary_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<()>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    payroll::delete(&state.pool, store.id, salary_id).await?;
    Ok(ApiResponse::ok())
}

pub async fn approve(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, salary_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<StaffSalary>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let salary = payroll::approve(&state.pool, store.id, salary_id).await?;
    Ok(ApiResponse::success(salary))
}

pub async fn mark_paid(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, salary_id)): Path<(i64, i64)>,
    Json(payload): Json<MarkPaid>,
) -> AppResult<ApiResponse<StaffSalary>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let salary = payroll::mark_paid(&state.pool, &store, salary_id, payload).await?;
    Ok(ApiResponse::success(salary))
}

pub async fn cancel(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, salary_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<StaffSalary>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let salary = payroll::cancel(&state.pool, store.id, salary_id).await?;
    Ok(ApiResponse::success(salary))
}
