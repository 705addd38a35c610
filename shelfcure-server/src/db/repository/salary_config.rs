//! Staff Salary Config Repository

use super::{RepoError, RepoResult};
use shared::models::{SalaryConfigInput, StaffSalaryConfig};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, store_id, staff_id, base_salary, hra_percent, da_percent, ta_percent, medical_allowance, special_allowance, pf_percent, esi_percent, professional_tax, tds_percent, overtime_rate_per_hour, overtime_multiplier, standard_working_days, standard_hours_per_day, effective_from, created_at, updated_at";

pub async fn find_by_staff(
    pool: &SqlitePool,
    store_id: i64,
    staff_id: i64,
) -> RepoResult<Option<StaffSalaryConfig>> {
    let sql = format!("SELECT {COLUMNS} FROM staff_salary_configs WHERE staff_id = ? AND store_id = ?");
    let config = sqlx::query_as::<_, StaffSalaryConfig>(&sql)
        .bind(staff_id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    Ok(config)
}

/// Create or replace the config of a staff member
pub async fn upsert(
    pool: &SqlitePool,
    store_id: i64,
    staff_id: i64,
    data: &SalaryConfigInput,
    effective_from: &str,
) -> RepoResult<StaffSalaryConfig> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO staff_salary_configs (id, store_id, staff_id, base_salary, hra_percent, da_percent, ta_percent, medical_allowance, special_allowance, pf_percent, esi_percent, professional_tax, tds_percent, overtime_rate_per_hour, overtime_multiplier, standard_working_days, standard_hours_per_day, effective_from, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?19) \
         ON CONFLICT(staff_id) DO UPDATE SET base_salary = excluded.base_salary, hra_percent = excluded.hra_percent, da_percent = excluded.da_percent, ta_percent = excluded.ta_percent, medical_allowance = excluded.medical_allowance, special_allowance = excluded.special_allowance, pf_percent = excluded.pf_percent, esi_percent = excluded.esi_percent, professional_tax = excluded.professional_tax, tds_percent = excluded.tds_percent, overtime_rate_per_hour = excluded.overtime_rate_per_hour, overtime_multiplier = excluded.overtime_multiplier, standard_working_days = excluded.standard_working_days, standard_hours_per_day = excluded.standard_hours_per_day, effective_from = excluded.effective_from, updated_at = excluded.updated_at",
    )
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(staff_id)
    .bind(data.base_salary)
    .bind(data.hra_percent)
    .bind(data.da_percent)
    .bind(data.ta_percent)
    .bind(data.medical_allowance)
    .bind(data.special_allowance)
    .bind(data.pf_percent)
    .bind(data.esi_percent)
    .bind(data.professional_tax)
    .bind(data.tds_percent)
    .bind(data.overtime_rate_per_hour)
    .bind(data.overtime_multiplier)
    .bind(data.standard_working_days)
    .bind(data.standard_hours_per_day)
    .bind(effective_from)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_staff(pool, store_id, staff_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to save salary config".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;

    fn input(base: f64, hra: f64) -> SalaryConfigInput {
        serde_json::from_value(serde_json::json!({ "base_salary": base, "hra_percent": hra }))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_replaces_single_row() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "sc1@example.com").await;
        let store = test_support::store(&pool, owner.id, "SC-1").await;
        let member = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;

        assert!(find_by_staff(&pool, store.id, member.id).await.unwrap().is_none());

        let first = upsert(&pool, store.id, member.id, &input(20000.0, 10.0), "2024-01-01")
            .await
            .unwrap();
        assert_eq!(first.standard_working_days, 26);
        assert_eq!(first.overtime_multiplier, 1.5);

        let second = upsert(&pool, store.id, member.id, &input(30000.0, 20.0), "2024-02-01")
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.base_salary, 30000.0);
        assert_eq!(second.hra_percent, 20.0);
        assert_eq!(second.effective_from, "2024-02-01");
    }

    #[tokio::test]
    async fn test_scoped_to_store() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "sc2@example.com").await;
        let store = test_support::store(&pool, owner.id, "SC-2").await;
        let other = test_support::store(&pool, owner.id, "SC-2B").await;
        let member = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;

        upsert(&pool, store.id, member.id, &input(20000.0, 0.0), "2024-01-01")
            .await
            .unwrap();
        assert!(find_by_staff(&pool, other.id, member.id).await.unwrap().is_none());
    }
}
