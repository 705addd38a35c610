//! Subscription Repository
//!
//! One row per store owner. `stores_used` is moved with guarded UPDATEs so
//! concurrent store creation cannot overshoot the plan limit.

use super::{RepoError, RepoResult, ensure_affected};
use shared::models::{BillingCycle, Subscription, SubscriptionPlan, SubscriptionStatus};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, owner_id, plan, status, billing_cycle, amount, store_limit, stores_used, features, start_date, end_date, next_billing_date, created_at, updated_at";

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

pub async fn find_by_owner(pool: &SqlitePool, owner_id: i64) -> RepoResult<Option<Subscription>> {
    let sql = format!("SELECT {COLUMNS} FROM subscriptions WHERE owner_id = ?");
    let sub = sqlx::query_as::<_, Subscription>(&sql)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
    Ok(sub)
}

/// Free-plan trial for a newly registered owner
pub async fn create_trial(
    pool: &SqlitePool,
    owner_id: i64,
    trial_days: i64,
) -> RepoResult<Subscription> {
    let plan = SubscriptionPlan::Free;
    let now = shared::util::now_millis();
    let end = now + trial_days * DAY_MILLIS;
    let features = features_json(plan)?;

    sqlx::query(
        "INSERT INTO subscriptions (id, owner_id, plan, status, billing_cycle, amount, store_limit, stores_used, features, start_date, end_date, next_billing_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, 0, ?7, ?8, ?9, ?9, ?8, ?8)",
    )
    .bind(shared::util::snowflake_id())
    .bind(owner_id)
    .bind(plan)
    .bind(SubscriptionStatus::Trial)
    .bind(BillingCycle::Monthly)
    .bind(plan.store_limit())
    .bind(features)
    .bind(now)
    .bind(end)
    .execute(pool)
    .await?;

    find_by_owner(pool, owner_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create subscription".into()))
}

/// Switch plan; a paid plan starts a new billing period
///
/// Moving to the free plan keeps the current status and end date, so it
/// never extends a trial. Refused with `Validation` when the subscription is
/// cancelled or expired, and with `Conflict` when the owner already uses
/// more stores than the new plan allows.
pub async fn change_plan(
    pool: &SqlitePool,
    owner_id: i64,
    plan: SubscriptionPlan,
    cycle: BillingCycle,
) -> RepoResult<Subscription> {
    let now = shared::util::now_millis();
    let features = features_json(plan)?;

    let rows = if plan == SubscriptionPlan::Free {
        sqlx::query(
            "UPDATE subscriptions SET plan = ?1, billing_cycle = ?2, amount = 0, store_limit = ?3, features = ?4, updated_at = ?5 WHERE owner_id = ?6 AND stores_used <= ?3 AND status IN ('trial', 'active')",
        )
        .bind(plan)
        .bind(cycle)
        .bind(plan.store_limit())
        .bind(features)
        .bind(now)
        .bind(owner_id)
        .execute(pool)
        .await?
        .rows_affected()
    } else {
        let end = now + cycle.days() * DAY_MILLIS;
        sqlx::query(
            "UPDATE subscriptions SET plan = ?1, status = ?2, billing_cycle = ?3, amount = ?4, store_limit = ?5, features = ?6, start_date = ?7, end_date = ?8, next_billing_date = ?8, updated_at = ?7 WHERE owner_id = ?9 AND stores_used <= ?5 AND status IN ('trial', 'active')",
        )
        .bind(plan)
        .bind(SubscriptionStatus::Active)
        .bind(cycle)
        .bind(plan.price(cycle))
        .bind(plan.store_limit())
        .bind(features)
        .bind(now)
        .bind(end)
        .bind(owner_id)
        .execute(pool)
        .await?
        .rows_affected()
    };

    if rows == 0 {
        return match find_by_owner(pool, owner_id).await? {
            Some(sub)
                if matches!(
                    sub.status,
                    SubscriptionStatus::Cancelled | SubscriptionStatus::Expired
                ) =>
            {
                Err(RepoError::Validation(format!(
                    "Subscription is {:?}",
                    sub.status
                )))
            }
            Some(sub) => Err(RepoError::Conflict(format!(
                "{} stores in use, plan {:?} allows {}",
                sub.stores_used,
                plan,
                plan.store_limit()
            ))),
            None => Err(RepoError::NotFound("Subscription".into())),
        };
    }

    find_by_owner(pool, owner_id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Subscription".into()))
}

pub async fn set_status(
    pool: &SqlitePool,
    owner_id: i64,
    status: SubscriptionStatus,
) -> RepoResult<Subscription> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE subscriptions SET status = ?1, updated_at = ?2 WHERE owner_id = ?3")
        .bind(status)
        .bind(now)
        .bind(owner_id)
        .execute(pool)
        .await?
        .rows_affected();
    ensure_affected(rows, "Subscription")?;

    find_by_owner(pool, owner_id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Subscription".into()))
}

/// Page of all subscriptions, newest first
pub async fn list_all(
    pool: &SqlitePool,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<Subscription>, i64)> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriptions")
        .fetch_one(pool)
        .await?;
    let sql = format!("SELECT {COLUMNS} FROM subscriptions ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
    let items = sqlx::query_as::<_, Subscription>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok((items, total))
}

/// Take one store slot if the subscription is usable and below its limit
///
/// Returns `false` when no slot was taken.
pub async fn reserve_store_slot(pool: &SqlitePool, owner_id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE subscriptions SET stores_used = stores_used + 1, updated_at = ?1 WHERE owner_id = ?2 AND stores_used < store_limit AND status IN ('trial', 'active') AND end_date > ?1",
    )
    .bind(now)
    .bind(owner_id)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(rows == 1)
}

/// Give back a store slot, never below zero
pub async fn release_store_slot(pool: &SqlitePool, owner_id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE subscriptions SET stores_used = MAX(stores_used - 1, 0), updated_at = ?1 WHERE owner_id = ?2",
    )
    .bind(now)
    .bind(owner_id)
    .execute(pool)
    .await?;
    Ok(())
}

fn features_json(plan: SubscriptionPlan) -> RepoResult<String> {
    serde_json::to_string(&plan.features()).map_err(|e| RepoError::Database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;
    use shared::models::Feature;

    #[tokio::test]
    async fn test_trial_defaults() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "trial@example.com").await;
        let sub = create_trial(&pool, owner.id, 30).await.unwrap();

        assert_eq!(sub.plan, SubscriptionPlan::Free);
        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert_eq!(sub.store_limit, 1);
        assert_eq!(sub.stores_used, 0);
        assert!(sub.has_feature(Feature::Attendance));
        assert!(!sub.has_feature(Feature::Payroll));
        assert_eq!(sub.end_date - sub.start_date, 30 * DAY_MILLIS);
    }

    #[tokio::test]
    async fn test_store_slots_respect_limit() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "slots@example.com").await;
        create_trial(&pool, owner.id, 30).await.unwrap();

        assert!(reserve_store_slot(&pool, owner.id).await.unwrap());
        assert!(!reserve_store_slot(&pool, owner.id).await.unwrap());

        release_store_slot(&pool, owner.id).await.unwrap();
        release_store_slot(&pool, owner.id).await.unwrap();
        let sub = find_by_owner(&pool, owner.id).await.unwrap().unwrap();
        assert_eq!(sub.stores_used, 0);
    }

    #[tokio::test]
    async fn test_inactive_subscription_gets_no_slot() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "cancel@example.com").await;
        create_trial(&pool, owner.id, 30).await.unwrap();
        set_status(&pool, owner.id, SubscriptionStatus::Cancelled)
            .await
            .unwrap();
        assert!(!reserve_store_slot(&pool, owner.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_change_plan_and_blocked_downgrade() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "plan@example.com").await;
        create_trial(&pool, owner.id, 30).await.unwrap();

        let sub = change_plan(&pool, owner.id, SubscriptionPlan::Basic, BillingCycle::Yearly)
            .await
            .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.store_limit, 3);
        assert_eq!(sub.amount, 9990.0);
        assert!(sub.has_feature(Feature::Payroll));

        for _ in 0..2 {
            assert!(reserve_store_slot(&pool, owner.id).await.unwrap());
        }
        let err = change_plan(&pool, owner.id, SubscriptionPlan::Free, BillingCycle::Monthly)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_free_plan_keeps_trial_period() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "renew@example.com").await;
        let trial = create_trial(&pool, owner.id, 30).await.unwrap();

        let sub = change_plan(&pool, owner.id, SubscriptionPlan::Free, BillingCycle::Yearly)
            .await
            .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert_eq!(sub.start_date, trial.start_date);
        assert_eq!(sub.end_date, trial.end_date);
        assert_eq!(sub.amount, 0.0);
    }

    #[tokio::test]
    async fn test_downgrade_to_free_does_not_extend_period() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "downgrade@example.com").await;
        create_trial(&pool, owner.id, 30).await.unwrap();
        let paid = change_plan(&pool, owner.id, SubscriptionPlan::Basic, BillingCycle::Monthly)
            .await
            .unwrap();

        let sub = change_plan(&pool, owner.id, SubscriptionPlan::Free, BillingCycle::Monthly)
            .await
            .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.end_date, paid.end_date);
        assert!(!sub.has_feature(Feature::Payroll));
    }

    #[tokio::test]
    async fn test_change_plan_refused_when_cancelled_or_expired() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "locked@example.com").await;
        create_trial(&pool, owner.id, 30).await.unwrap();

        for status in [SubscriptionStatus::Cancelled, SubscriptionStatus::Expired] {
            set_status(&pool, owner.id, status).await.unwrap();
            for plan in [SubscriptionPlan::Free, SubscriptionPlan::Basic] {
                let err = change_plan(&pool, owner.id, plan, BillingCycle::Monthly)
                    .await
                    .unwrap_err();
                assert!(matches!(err, RepoError::Validation(_)));
            }
            let sub = find_by_owner(&pool, owner.id).await.unwrap().unwrap();
            assert_eq!(sub.status, status);
            assert_eq!(sub.plan, SubscriptionPlan::Free);
        }
    }

    #[tokio::test]
    async fn test_list_all_counts() {
        let pool = test_support::pool().await;
        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            let owner = test_support::owner(&pool, email).await;
            create_trial(&pool, owner.id, 30).await.unwrap();
        }
        let (page, total) = list_all(&pool, 0, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
    }
}
