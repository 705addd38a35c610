//! Subscription handlers

use axum::{Json, extract::State};
use shared::models::{PlanChange, Subscription};

use crate::api::{ApiResponse, AppResult};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::subscription as subscription_service;

/// The caller's subscription, starting a trial if none exists
pub async fn get_mine(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<ApiResponse<Subscription>> {
    let sub =
        subscription_service::ensure_for_owner(&state.pool, current.id, state.config.trial_days)
            .await?;
    Ok(ApiResponse::success(sub))
}

pub async fn change_plan(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<PlanChange>,
) -> AppResult<ApiResponse<Subscription>> {
    subscription_service::ensure_for_owner(&state.pool, current.id, state.config.trial_days)
        .await?;
    let sub = subscription_service::change_plan(
        &state.subscriptions,
        &state.pool,
        current.id,
        payload.plan,
        payload.billing_cycle,
    )
    .await?;
    Ok(ApiResponse::success_with_message("Plan changed", sub))
}
