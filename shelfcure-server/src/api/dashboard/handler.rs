//! Dashboard handlers

use axum::extract::{Path, State};
use shared::models::{OwnerOverview, StoreDashboard};

use crate::api::{ApiResponse, AppResult, store_for};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::dashboard;

pub async fn owner_overview(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<ApiResponse<OwnerOverview>> {
    let overview = dashboard::owner_overview(&state.pool, current.id).await?;
    Ok(ApiResponse::success(overview))
}

/// Any role with access to the store may see its dashboard
pub async fn store_dashboard(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(store_id): Path<i64>,
) -> AppResult<ApiResponse<StoreDashboard>> {
    let store = store_for(&state, &current, store_id, None).await?;
    let dashboard = dashboard::store_dashboard(&state.pool, store).await?;
    Ok(ApiResponse::success(dashboard))
}
