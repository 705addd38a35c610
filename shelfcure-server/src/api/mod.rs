//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`auth`] - registration, login, current user
//! - [`users`] - owner-provisioned logins
//! - [`subscription`] - the owner's plan
//! - [`stores`] - store management
//! - [`staff`] - staff records per store
//! - [`attendance`] - daily attendance per store
//! - [`salary_config`] - pay structure per staff member
//! - [`payroll`] - payslips per store
//! - [`dashboard`] - aggregates
//! - [`admin`] - superadmin tools
//!
//! Store-scoped handlers resolve the store with [`store_for`], which applies
//! the access check and, when given, the plan feature gate.

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod payroll;
pub mod salary_config;
pub mod staff;
pub mod stores;
pub mod subscription;
pub mod users;

use http::StatusCode;
use serde::Serialize;
use shared::models::{Feature, Store};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::{access, subscription as subscription_service};

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult, PaginationParams};

/// 201 Created with the response envelope
pub fn created<T: Serialize>(data: T) -> (StatusCode, ApiResponse<T>) {
    (StatusCode::CREATED, ApiResponse::success(data))
}

/// Store visible to `user`, optionally requiring a plan feature of its owner
pub async fn store_for(
    state: &ServerState,
    user: &CurrentUser,
    store_id: i64,
    feature: Option<Feature>,
) -> AppResult<Store> {
    let store = access::verify_store_access(&state.pool, user, store_id).await?;
    if let Some(feature) = feature {
        subscription_service::ensure_store_feature(
            &state.subscriptions,
            &state.pool,
            user,
            store.owner_id,
            feature,
        )
        .await?;
    }
    Ok(store)
}
