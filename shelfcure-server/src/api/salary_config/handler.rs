//! Salary configuration handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Feature, SalaryConfigInput, StaffSalaryConfig};

use crate::api::{ApiResponse, AppResult, store_for};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::salary_config as config_repo;
use crate::services::staff::load_staff;
use crate::utils::time::{format_date, parse_date, store_tz, today};
use crate::utils::validation::validate_payload;
use crate::utils::{AppError, ErrorCode};

const FEATURE: Option<Feature> = Some(Feature::Payroll);

pub async fn get_config(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, staff_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<StaffSalaryConfig>> {
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let staff = load_staff(&state.pool, store.id, staff_id).await?;
    let config = config_repo::find_by_staff(&state.pool, store.id, staff.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::SalaryConfigNotFound))?;
    Ok(ApiResponse::success(config))
}

/// Create or replace the pay structure of a staff member
pub async fn put_config(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path((store_id, staff_id)): Path<(i64, i64)>,
    Json(payload): Json<SalaryConfigInput>,
) -> AppResult<ApiResponse<StaffSalaryConfig>> {
    validate_payload(&payload)?;
    let store = store_for(&state, &current, store_id, FEATURE).await?;
    let staff = load_staff(&state.pool, store.id, staff_id).await?;

    let effective_from = match payload.effective_from.as_deref() {
        Some(date) => parse_date(date).map_err(|e| e.with_detail("field", "effective_from"))?,
        None => today(store_tz(&store.settings.timezone)),
    };

    let config = config_repo::upsert(
        &state.pool,
        store.id,
        staff.id,
        &payload,
        &format_date(effective_from),
    )
    .await
    .map_err(AppError::from)?;
    tracing::info!(
        store_id = store.id,
        staff_id = staff.id,
        base_salary = config.base_salary,
        "Salary config saved"
    );
    Ok(ApiResponse::success(config))
}
