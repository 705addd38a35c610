//! Dashboard aggregates

use chrono::Datelike;
use shared::models::{OwnerOverview, Store, StoreDashboard};
use sqlx::SqlitePool;

use crate::db::repository::{
    salary as salary_repo, staff as staff_repo, store as store_repo,
    subscription as subscription_repo,
};
use crate::services::attendance;
use crate::utils::time::{store_tz, today};
use crate::utils::{AppError, AppResult};

/// Staff stats, today's attendance and this month's payroll of one store
pub async fn store_dashboard(pool: &SqlitePool, store: Store) -> AppResult<StoreDashboard> {
    let staff = staff_repo::stats(pool, store.id)
        .await
        .map_err(AppError::from)?;
    let attendance_today = attendance::daily_overview(pool, &store, None).await?;

    let now = today(store_tz(&store.settings.timezone));
    let payroll = salary_repo::summary(pool, store.id, now.month() as i64, now.year() as i64)
        .await
        .map_err(AppError::from)?;

    Ok(StoreDashboard {
        store,
        staff,
        attendance_today,
        payroll,
    })
}

pub async fn owner_overview(pool: &SqlitePool, owner_id: i64) -> AppResult<OwnerOverview> {
    let (store_count, active_stores) = store_repo::count_by_owner(pool, owner_id)
        .await
        .map_err(AppError::from)?;
    let (total_staff, active_staff) = staff_repo::count_by_owner(pool, owner_id)
        .await
        .map_err(AppError::from)?;
    let subscription = subscription_repo::find_by_owner(pool, owner_id)
        .await
        .map_err(AppError::from)?;

    Ok(OwnerOverview {
        store_count,
        active_stores,
        plan: subscription.as_ref().map(|s| s.plan),
        subscription_status: subscription.as_ref().map(|s| s.status),
        store_limit: subscription.as_ref().map_or(0, |s| s.store_limit),
        stores_used: subscription.as_ref().map_or(0, |s| s.stores_used),
        total_staff,
        active_staff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;

    #[tokio::test]
    async fn test_store_dashboard_counts_staff() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "dash1@example.com").await;
        let store = test_support::store(&pool, owner.id, "DB-1").await;
        test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        test_support::staff(&pool, store.id, "PHM002", "b@x.com").await;

        let dashboard = store_dashboard(&pool, store).await.unwrap();
        assert_eq!(dashboard.staff.total, 2);
        assert_eq!(dashboard.attendance_today.active_staff, 2);
        assert_eq!(dashboard.attendance_today.not_marked, 2);
        assert_eq!(dashboard.payroll.total, 0);
    }

    #[tokio::test]
    async fn test_owner_overview() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "dash2@example.com").await;
        subscription_repo::create_trial(&pool, owner.id, 30).await.unwrap();
        let store = test_support::store(&pool, owner.id, "DB-2").await;
        test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;

        let overview = owner_overview(&pool, owner.id).await.unwrap();
        assert_eq!(overview.store_count, 1);
        assert_eq!(overview.total_staff, 1);
        assert_eq!(overview.store_limit, 1);
        assert!(overview.plan.is_some());
    }
}
