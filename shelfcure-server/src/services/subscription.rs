//! Subscription rules: trial on registration, plan changes, feature gates
//!
//! Feature checks hit the database at most once per owner every five
//! minutes; plan and status changes invalidate the cached entry.

use shared::error::ErrorCode;
use shared::models::{BillingCycle, Feature, Subscription, SubscriptionPlan, SubscriptionStatus};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::auth::CurrentUser;
use crate::db::repository::{RepoError, subscription as subscription_repo};
use crate::utils::{AppError, AppResult};

const CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    subscription: Option<Subscription>,
    expires_at: Instant,
}

/// Owner id -> subscription, with a fixed TTL
#[derive(Clone, Default)]
pub struct SubscriptionCache {
    entries: Arc<RwLock<HashMap<i64, CacheEntry>>>,
}

impl SubscriptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached subscription of an owner, loading it on miss or expiry
    pub async fn get(&self, pool: &SqlitePool, owner_id: i64) -> AppResult<Option<Subscription>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&owner_id)
                && entry.expires_at > Instant::now()
            {
                return Ok(entry.subscription.clone());
            }
        }

        let subscription = subscription_repo::find_by_owner(pool, owner_id)
            .await
            .map_err(AppError::from)?;

        self.entries.write().await.insert(
            owner_id,
            CacheEntry {
                subscription: subscription.clone(),
                expires_at: Instant::now() + CACHE_TTL,
            },
        );
        Ok(subscription)
    }

    pub async fn invalidate(&self, owner_id: i64) {
        self.entries.write().await.remove(&owner_id);
    }

    pub async fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.write().await.retain(|_, e| e.expires_at > now);
    }
}

/// Subscription of an owner, starting a trial if none exists yet
pub async fn ensure_for_owner(
    pool: &SqlitePool,
    owner_id: i64,
    trial_days: i64,
) -> AppResult<Subscription> {
    if let Some(sub) = subscription_repo::find_by_owner(pool, owner_id)
        .await
        .map_err(AppError::from)?
    {
        return Ok(sub);
    }

    match subscription_repo::create_trial(pool, owner_id, trial_days).await {
        Ok(sub) => {
            tracing::info!(owner_id, trial_days, "Started trial subscription");
            Ok(sub)
        }
        // Lost a race with a concurrent request for the same owner
        Err(RepoError::Duplicate(_)) => subscription_repo::find_by_owner(pool, owner_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::SubscriptionNotFound)),
        Err(e) => Err(e.into()),
    }
}

/// Reject with 403 `FeatureNotAvailable` unless the owner's subscription is
/// usable and its plan includes `feature`
pub async fn ensure_feature(
    cache: &SubscriptionCache,
    pool: &SqlitePool,
    owner_id: i64,
    feature: Feature,
) -> AppResult<()> {
    let now = shared::util::now_millis();
    let sub = cache.get(pool, owner_id).await?;

    let reason = match &sub {
        None => Some("No subscription"),
        Some(sub) if !sub.is_usable(now) => Some("Subscription is not active"),
        Some(sub) if !sub.has_feature(feature) => Some("Not included in the current plan"),
        Some(_) => None,
    };

    if let Some(reason) = reason {
        tracing::debug!(owner_id, feature = %feature, reason, "Feature gate rejected");
        return Err(AppError::with_message(
            ErrorCode::FeatureNotAvailable,
            format!("Feature '{feature}' is not available: {reason}"),
        )
        .with_detail("feature", feature.as_str()));
    }
    Ok(())
}

/// Feature gate for a store-scoped request; superadmin is never gated
pub async fn ensure_store_feature(
    cache: &SubscriptionCache,
    pool: &SqlitePool,
    user: &CurrentUser,
    store_owner_id: i64,
    feature: Feature,
) -> AppResult<()> {
    if user.is_superadmin() {
        return Ok(());
    }
    ensure_feature(cache, pool, store_owner_id, feature).await
}

/// Switch an owner's plan
///
/// Blocked with 403 `SubscriptionInactive` once the subscription is cancelled
/// or expired, and with `PlanDowngradeBlocked` when more stores are in use
/// than the plan allows.
pub async fn change_plan(
    cache: &SubscriptionCache,
    pool: &SqlitePool,
    owner_id: i64,
    plan: SubscriptionPlan,
    cycle: BillingCycle,
) -> AppResult<Subscription> {
    let result = subscription_repo::change_plan(pool, owner_id, plan, cycle).await;
    cache.invalidate(owner_id).await;

    match result {
        Ok(sub) => {
            tracing::info!(owner_id, plan = ?plan, cycle = ?cycle, "Subscription plan changed");
            Ok(sub)
        }
        Err(RepoError::Conflict(msg)) => Err(AppError::with_message(
            ErrorCode::PlanDowngradeBlocked,
            format!("Cannot downgrade: {msg}"),
        )),
        Err(RepoError::Validation(msg)) => {
            tracing::warn!(owner_id, plan = ?plan, "Plan change on inactive subscription refused");
            Err(AppError::with_message(ErrorCode::SubscriptionInactive, msg))
        }
        Err(RepoError::NotFound(_)) => Err(AppError::new(ErrorCode::SubscriptionNotFound)),
        Err(e) => Err(e.into()),
    }
}

/// Superadmin status override
pub async fn set_status(
    cache: &SubscriptionCache,
    pool: &SqlitePool,
    owner_id: i64,
    status: SubscriptionStatus,
) -> AppResult<Subscription> {
    let result = subscription_repo::set_status(pool, owner_id, status).await;
    cache.invalidate(owner_id).await;

    match result {
        Ok(sub) => {
            tracing::info!(owner_id, status = ?status, "Subscription status changed");
            Ok(sub)
        }
        Err(RepoError::NotFound(_)) => Err(AppError::new(ErrorCode::SubscriptionNotFound)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;

    #[tokio::test]
    async fn test_ensure_for_owner_is_idempotent() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "sub1@example.com").await;
        let first = ensure_for_owner(&pool, owner.id, 30).await.unwrap();
        let second = ensure_for_owner(&pool, owner.id, 30).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.status, SubscriptionStatus::Trial);
    }

    #[tokio::test]
    async fn test_feature_gate_follows_plan_changes() {
        let pool = test_support::pool().await;
        let cache = SubscriptionCache::new();
        let owner = test_support::owner(&pool, "sub2@example.com").await;
        ensure_for_owner(&pool, owner.id, 30).await.unwrap();

        ensure_feature(&cache, &pool, owner.id, Feature::Attendance)
            .await
            .unwrap();
        let err = ensure_feature(&cache, &pool, owner.id, Feature::Payroll)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FeatureNotAvailable);
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);

        change_plan(&cache, &pool, owner.id, SubscriptionPlan::Basic, BillingCycle::Monthly)
            .await
            .unwrap();
        ensure_feature(&cache, &pool, owner.id, Feature::Payroll)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_subscription_gates_everything() {
        let pool = test_support::pool().await;
        let cache = SubscriptionCache::new();
        let owner = test_support::owner(&pool, "sub3@example.com").await;
        ensure_for_owner(&pool, owner.id, 30).await.unwrap();

        set_status(&cache, &pool, owner.id, SubscriptionStatus::Cancelled)
            .await
            .unwrap();
        let err = ensure_feature(&cache, &pool, owner.id, Feature::Attendance)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FeatureNotAvailable);
    }

    #[tokio::test]
    async fn test_downgrade_blocked_code() {
        let pool = test_support::pool().await;
        let cache = SubscriptionCache::new();
        let owner = test_support::owner(&pool, "sub4@example.com").await;
        ensure_for_owner(&pool, owner.id, 30).await.unwrap();
        change_plan(&cache, &pool, owner.id, SubscriptionPlan::Premium, BillingCycle::Monthly)
            .await
            .unwrap();
        for _ in 0..4 {
            assert!(subscription_repo::reserve_store_slot(&pool, owner.id).await.unwrap());
        }
        let err = change_plan(&cache, &pool, owner.id, SubscriptionPlan::Basic, BillingCycle::Monthly)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PlanDowngradeBlocked);
    }

    #[tokio::test]
    async fn test_plan_change_cannot_lift_cancellation() {
        let pool = test_support::pool().await;
        let cache = SubscriptionCache::new();
        let owner = test_support::owner(&pool, "sub5@example.com").await;
        ensure_for_owner(&pool, owner.id, 30).await.unwrap();
        set_status(&cache, &pool, owner.id, SubscriptionStatus::Cancelled)
            .await
            .unwrap();

        let err = change_plan(&cache, &pool, owner.id, SubscriptionPlan::Free, BillingCycle::Monthly)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SubscriptionInactive);
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);

        let err = ensure_feature(&cache, &pool, owner.id, Feature::Attendance)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FeatureNotAvailable);
    }

    #[tokio::test]
    async fn test_missing_subscription_code() {
        let pool = test_support::pool().await;
        let cache = SubscriptionCache::new();
        let err = set_status(&cache, &pool, 42, SubscriptionStatus::Active)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SubscriptionNotFound);
    }
}
