//! Staff Repository

use super::{RepoError, RepoResult, ensure_affected};
use shared::models::{Staff, StaffCreate, StaffQuery, StaffStats, StaffStatus, StaffUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, store_id, employee_id, name, email, phone, role, department, date_of_joining, salary, status, address, emergency_contact_name, emergency_contact_phone, created_by, created_at, updated_at";

/// Staff member of a store; another store's staff is reported as missing
pub async fn find_in_store(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Option<Staff>> {
    let sql = format!("SELECT {COLUMNS} FROM staff WHERE id = ? AND store_id = ?");
    let staff = sqlx::query_as::<_, Staff>(&sql)
        .bind(id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    Ok(staff)
}

/// Highest numeric suffix among employee ids with this prefix (0 if none)
pub async fn max_employee_suffix(pool: &SqlitePool, store_id: i64, prefix: &str) -> RepoResult<u32> {
    let ids: Vec<(String,)> =
        sqlx::query_as("SELECT employee_id FROM staff WHERE store_id = ? AND employee_id LIKE ?")
            .bind(store_id)
            .bind(format!("{prefix}%"))
            .fetch_all(pool)
            .await?;
    let max = ids
        .iter()
        .filter_map(|(id,)| id.strip_prefix(prefix)?.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    Ok(max)
}

pub async fn create(
    pool: &SqlitePool,
    store_id: i64,
    employee_id: &str,
    data: &StaffCreate,
    created_by: i64,
) -> RepoResult<Staff> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO staff (id, store_id, employee_id, name, email, phone, role, department, date_of_joining, salary, status, address, emergency_contact_name, emergency_contact_phone, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
    )
    .bind(id)
    .bind(store_id)
    .bind(employee_id)
    .bind(data.name.trim())
    .bind(data.email.trim().to_lowercase())
    .bind(data.phone.trim())
    .bind(data.role)
    .bind(&data.department)
    .bind(&data.date_of_joining)
    .bind(data.salary)
    .bind(StaffStatus::Active)
    .bind(&data.address)
    .bind(&data.emergency_contact_name)
    .bind(&data.emergency_contact_phone)
    .bind(created_by)
    .bind(now)
    .execute(pool)
    .await?;

    find_in_store(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create staff".into()))
}

pub async fn list(
    pool: &SqlitePool,
    store_id: i64,
    query: &StaffQuery,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<Staff>, i64)> {
    const FILTER: &str = "store_id = ?1 AND (?2 IS NULL OR role = ?2) AND (?3 IS NULL OR status = ?3) AND (?4 IS NULL OR name LIKE ?4 OR email LIKE ?4 OR phone LIKE ?4 OR employee_id LIKE ?4)";
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM staff WHERE {FILTER}"))
        .bind(store_id)
        .bind(query.role)
        .bind(query.status)
        .bind(&search)
        .fetch_one(pool)
        .await?;

    let sql = format!("SELECT {COLUMNS} FROM staff WHERE {FILTER} ORDER BY employee_id LIMIT ?5 OFFSET ?6");
    let items = sqlx::query_as::<_, Staff>(&sql)
        .bind(store_id)
        .bind(query.role)
        .bind(query.status)
        .bind(&search)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok((items, total))
}

/// Active staff of a store, ordered by employee id
pub async fn list_active(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<Staff>> {
    let sql = format!("SELECT {COLUMNS} FROM staff WHERE store_id = ? AND status = 'active' ORDER BY employee_id");
    let items = sqlx::query_as::<_, Staff>(&sql)
        .bind(store_id)
        .fetch_all(pool)
        .await?;
    Ok(items)
}

/// Apply a partial update; the employee id never changes
pub async fn update(pool: &SqlitePool, store_id: i64, id: i64, data: StaffUpdate) -> RepoResult<Staff> {
    let mut staff = find_in_store(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Staff".into()))?;

    if let Some(v) = data.name {
        staff.name = v.trim().to_string();
    }
    if let Some(v) = data.email {
        staff.email = v.trim().to_lowercase();
    }
    if let Some(v) = data.phone {
        staff.phone = v.trim().to_string();
    }
    if let Some(v) = data.role {
        staff.role = v;
    }
    if data.department.is_some() {
        staff.department = data.department;
    }
    if let Some(v) = data.date_of_joining {
        staff.date_of_joining = v;
    }
    if let Some(v) = data.salary {
        staff.salary = v;
    }
    if let Some(v) = data.status {
        staff.status = v;
    }
    if data.address.is_some() {
        staff.address = data.address;
    }
    if data.emergency_contact_name.is_some() {
        staff.emergency_contact_name = data.emergency_contact_name;
    }
    if data.emergency_contact_phone.is_some() {
        staff.emergency_contact_phone = data.emergency_contact_phone;
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE staff SET name = ?1, email = ?2, phone = ?3, role = ?4, department = ?5, date_of_joining = ?6, salary = ?7, status = ?8, address = ?9, emergency_contact_name = ?10, emergency_contact_phone = ?11, updated_at = ?12 WHERE id = ?13 AND store_id = ?14",
    )
    .bind(&staff.name)
    .bind(&staff.email)
    .bind(&staff.phone)
    .bind(staff.role)
    .bind(&staff.department)
    .bind(&staff.date_of_joining)
    .bind(staff.salary)
    .bind(staff.status)
    .bind(&staff.address)
    .bind(&staff.emergency_contact_name)
    .bind(&staff.emergency_contact_phone)
    .bind(now)
    .bind(id)
    .bind(store_id)
    .execute(pool)
    .await?;

    find_in_store(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Staff".into()))
}

pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM staff WHERE id = ? AND store_id = ?")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?
        .rows_affected();
    ensure_affected(rows, "Staff")
}

pub async fn stats(pool: &SqlitePool, store_id: i64) -> RepoResult<StaffStats> {
    let by_status: Vec<(StaffStatus, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM staff WHERE store_id = ? GROUP BY status")
            .bind(store_id)
            .fetch_all(pool)
            .await?;
    let by_role: Vec<(String, i64)> =
        sqlx::query_as("SELECT role, COUNT(*) FROM staff WHERE store_id = ? GROUP BY role")
            .bind(store_id)
            .fetch_all(pool)
            .await?;

    let mut stats = StaffStats::default();
    for (status, count) in by_status {
        stats.total += count;
        match status {
            StaffStatus::Active => stats.active = count,
            StaffStatus::Inactive => stats.inactive = count,
            StaffStatus::OnLeave => stats.on_leave = count,
            StaffStatus::Terminated => stats.terminated = count,
        }
    }
    stats.by_role = by_role.into_iter().collect();
    Ok(stats)
}

/// (total, active) staff across every store of an owner
pub async fn count_by_owner(pool: &SqlitePool, owner_id: i64) -> RepoResult<(i64, i64)> {
    let counts: (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN s.status = 'active' THEN 1 ELSE 0 END), 0) FROM staff s JOIN stores st ON st.id = s.store_id WHERE st.owner_id = ?",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;
    use shared::models::StaffRole;

    #[tokio::test]
    async fn test_max_suffix_per_prefix_and_store() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "st1@example.com").await;
        let store = test_support::store(&pool, owner.id, "ST-1").await;
        let other = test_support::store(&pool, owner.id, "ST-1B").await;

        assert_eq!(max_employee_suffix(&pool, store.id, "PHM").await.unwrap(), 0);
        test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        test_support::staff(&pool, store.id, "PHM007", "b@x.com").await;
        test_support::staff(&pool, store.id, "CSH009", "c@x.com").await;
        test_support::staff(&pool, other.id, "PHM020", "d@x.com").await;

        assert_eq!(max_employee_suffix(&pool, store.id, "PHM").await.unwrap(), 7);
        assert_eq!(max_employee_suffix(&pool, store.id, "CSH").await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_email_unique_per_store() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "st2@example.com").await;
        let store = test_support::store(&pool, owner.id, "ST-2").await;
        let other = test_support::store(&pool, owner.id, "ST-2B").await;

        test_support::staff(&pool, store.id, "PHM001", "same@x.com").await;
        let err = create(
            &pool,
            store.id,
            "PHM002",
            &test_support::staff_payload("SAME@x.com", StaffRole::Pharmacist),
            1,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(ref f) if f == "email"));

        // Another store may reuse the address
        test_support::staff(&pool, other.id, "PHM001", "same@x.com").await;
    }

    #[tokio::test]
    async fn test_list_filters_and_search() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "st3@example.com").await;
        let store = test_support::store(&pool, owner.id, "ST-3").await;
        let first = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        test_support::staff(&pool, store.id, "PHM002", "b@x.com").await;
        update(
            &pool,
            store.id,
            first.id,
            StaffUpdate {
                name: Some("Zoya Khan".into()),
                status: Some(StaffStatus::OnLeave),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let all = StaffQuery::default();
        let (items, total) = list(&pool, store.id, &all, 0, 20).await.unwrap();
        assert_eq!((items.len(), total), (2, 2));

        let on_leave = StaffQuery {
            status: Some(StaffStatus::OnLeave),
            ..Default::default()
        };
        let (items, _) = list(&pool, store.id, &on_leave, 0, 20).await.unwrap();
        assert_eq!(items[0].employee_id, "PHM001");

        let search = StaffQuery {
            search: Some("zoya".into()),
            ..Default::default()
        };
        let (_, total) = list(&pool, store.id, &search, 0, 20).await.unwrap();
        assert_eq!(total, 1);

        assert_eq!(list_active(&pool, store.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_employee_id_and_stats() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "st4@example.com").await;
        let store = test_support::store(&pool, owner.id, "ST-4").await;
        let member = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        test_support::staff(&pool, store.id, "PHM002", "b@x.com").await;

        let updated = update(
            &pool,
            store.id,
            member.id,
            StaffUpdate {
                role: Some(StaffRole::Cashier),
                status: Some(StaffStatus::Terminated),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.employee_id, "PHM001");
        assert_eq!(updated.role, StaffRole::Cashier);

        let stats = stats(&pool, store.id).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.terminated, 1);
        assert_eq!(stats.by_role.get("cashier"), Some(&1));
        assert_eq!(count_by_owner(&pool, owner.id).await.unwrap(), (2, 1));
    }

    #[tokio::test]
    async fn test_delete_scoped_to_store() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "st5@example.com").await;
        let store = test_support::store(&pool, owner.id, "ST-5").await;
        let other = test_support::store(&pool, owner.id, "ST-5B").await;
        let member = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;

        assert!(matches!(
            delete(&pool, other.id, member.id).await,
            Err(RepoError::NotFound(_))
        ));
        delete(&pool, store.id, member.id).await.unwrap();
        assert!(find_in_store(&pool, store.id, member.id).await.unwrap().is_none());
    }
}
