//! Superadmin handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Subscription, SubscriptionStatusUpdate};
use shared::types::Paginated;

use crate::api::{ApiResponse, AppResult, PaginationParams};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::subscription as subscription_repo;
use crate::security_log;
use crate::services::subscription as subscription_service;
use crate::utils::AppError;

pub async fn list_subscriptions(
    State(state): State<ServerState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ApiResponse<Paginated<Subscription>>> {
    let (items, total) = subscription_repo::list_all(&state.pool, page.offset(), page.limit())
        .await
        .map_err(AppError::from)?;
    Ok(ApiResponse::success(Paginated::new(
        items,
        total,
        page.page(),
        page.limit() as u32,
    )))
}

/// Override the status of an owner's subscription
pub async fn set_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(owner_id): Path<i64>,
    Json(payload): Json<SubscriptionStatusUpdate>,
) -> AppResult<ApiResponse<Subscription>> {
    let sub = subscription_service::set_status(
        &state.subscriptions,
        &state.pool,
        owner_id,
        payload.status,
    )
    .await?;
    security_log!(
        "INFO",
        "subscription_status_override",
        admin_id = current.id,
        owner_id = owner_id,
        status = ?payload.status
    );
    Ok(ApiResponse::success(sub))
}
