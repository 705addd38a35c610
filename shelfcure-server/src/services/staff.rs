//! Staff creation with per-store employee ids
//!
//! Ids are `PREFIX###` where the prefix follows the staff role. The next
//! number is the highest existing suffix plus one; the unique index decides
//! races and the loser retries with the following number.

use shared::error::ErrorCode;
use shared::models::{Staff, StaffCreate, StaffRole, StaffUpdate};
use sqlx::SqlitePool;

use crate::db::repository::{RepoError, staff as staff_repo, store as store_repo};
use crate::utils::time::parse_date;
use crate::utils::{AppError, AppResult};

/// Insert attempts before reporting the id space as exhausted
const MAX_ID_ATTEMPTS: u32 = 10;

pub fn format_employee_id(role: StaffRole, number: u32) -> String {
    format!("{}{:03}", role.employee_prefix(), number)
}

pub async fn create_staff(
    pool: &SqlitePool,
    store_id: i64,
    data: &StaffCreate,
    created_by: i64,
) -> AppResult<Staff> {
    parse_date(&data.date_of_joining).map_err(|e| e.with_detail("field", "date_of_joining"))?;

    let prefix = data.role.employee_prefix();
    let base = staff_repo::max_employee_suffix(pool, store_id, prefix)
        .await
        .map_err(AppError::from)?;

    for attempt in 1..=MAX_ID_ATTEMPTS {
        let employee_id = format_employee_id(data.role, base + attempt);
        match staff_repo::create(pool, store_id, &employee_id, data, created_by).await {
            Ok(staff) => {
                store_repo::adjust_staff_count(pool, store_id, 1)
                    .await
                    .map_err(AppError::from)?;
                tracing::info!(store_id, staff_id = staff.id, employee_id = %staff.employee_id, "Staff created");
                return Ok(staff);
            }
            Err(RepoError::Duplicate(field)) if field == "employee_id" => {
                tracing::debug!(store_id, employee_id = %employee_id, attempt, "Employee id taken, retrying");
            }
            Err(RepoError::Duplicate(field)) if field == "email" => {
                return Err(staff_email_exists());
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::warn!(store_id, prefix, "Employee id generation exhausted");
    Err(AppError::with_message(
        ErrorCode::EmployeeIdExhausted,
        format!("Could not allocate an employee id with prefix {prefix}"),
    ))
}

pub async fn update_staff(
    pool: &SqlitePool,
    store_id: i64,
    staff_id: i64,
    data: StaffUpdate,
) -> AppResult<Staff> {
    if let Some(date) = &data.date_of_joining {
        parse_date(date).map_err(|e| e.with_detail("field", "date_of_joining"))?;
    }
    match staff_repo::update(pool, store_id, staff_id, data).await {
        Ok(staff) => Ok(staff),
        Err(RepoError::NotFound(_)) => Err(AppError::new(ErrorCode::StaffNotFound)),
        Err(RepoError::Duplicate(field)) if field == "email" => Err(staff_email_exists()),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_staff(pool: &SqlitePool, store_id: i64, staff_id: i64) -> AppResult<()> {
    match staff_repo::delete(pool, store_id, staff_id).await {
        Ok(()) => {}
        Err(RepoError::NotFound(_)) => return Err(AppError::new(ErrorCode::StaffNotFound)),
        Err(e) => return Err(e.into()),
    }
    store_repo::adjust_staff_count(pool, store_id, -1)
        .await
        .map_err(AppError::from)?;
    tracing::info!(store_id, staff_id, "Staff deleted");
    Ok(())
}

/// Staff member of the store or 404 `StaffNotFound`
pub async fn load_staff(pool: &SqlitePool, store_id: i64, staff_id: i64) -> AppResult<Staff> {
    staff_repo::find_in_store(pool, store_id, staff_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::StaffNotFound))
}

fn staff_email_exists() -> AppError {
    AppError::with_message(ErrorCode::StaffEmailExists, "email already exists")
        .with_detail("field", "email")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;

    #[test]
    fn test_employee_id_format() {
        assert_eq!(format_employee_id(StaffRole::Pharmacist, 1), "PHM001");
        assert_eq!(format_employee_id(StaffRole::StoreManager, 42), "MGR042");
        assert_eq!(format_employee_id(StaffRole::Other, 1000), "EMP1000");
    }

    #[tokio::test]
    async fn test_sequential_ids_per_role() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "sf1@example.com").await;
        let store = test_support::store(&pool, owner.id, "SF-1").await;

        let a = create_staff(&pool, store.id, &test_support::staff_payload("a@x.com", StaffRole::Pharmacist), owner.id)
            .await
            .unwrap();
        let b = create_staff(&pool, store.id, &test_support::staff_payload("b@x.com", StaffRole::Pharmacist), owner.id)
            .await
            .unwrap();
        let c = create_staff(&pool, store.id, &test_support::staff_payload("c@x.com", StaffRole::Cashier), owner.id)
            .await
            .unwrap();
        assert_eq!(a.employee_id, "PHM001");
        assert_eq!(b.employee_id, "PHM002");
        assert_eq!(c.employee_id, "CSH001");

        let store = store_repo::find_by_id(&pool, store.id).await.unwrap().unwrap();
        assert_eq!(store.staff_count, 3);
    }

    #[tokio::test]
    async fn test_gap_continues_after_highest() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "sf2@example.com").await;
        let store = test_support::store(&pool, owner.id, "SF-2").await;
        test_support::staff(&pool, store.id, "PHM005", "old@x.com").await;

        let next = create_staff(&pool, store.id, &test_support::staff_payload("new@x.com", StaffRole::Pharmacist), owner.id)
            .await
            .unwrap();
        assert_eq!(next.employee_id, "PHM006");
    }

    #[tokio::test]
    async fn test_duplicate_email_and_delete_count() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "sf3@example.com").await;
        let store = test_support::store(&pool, owner.id, "SF-3").await;
        let payload = test_support::staff_payload("dup@x.com", StaffRole::Assistant);

        let staff = create_staff(&pool, store.id, &payload, owner.id).await.unwrap();
        let err = create_staff(&pool, store.id, &payload, owner.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StaffEmailExists);
        assert_eq!(err.message, "email already exists");

        delete_staff(&pool, store.id, staff.id).await.unwrap();
        let store_row = store_repo::find_by_id(&pool, store.id).await.unwrap().unwrap();
        assert_eq!(store_row.staff_count, 0);

        let err = delete_staff(&pool, store.id, staff.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StaffNotFound);
    }

    #[tokio::test]
    async fn test_rejects_bad_joining_date() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "sf4@example.com").await;
        let store = test_support::store(&pool, owner.id, "SF-4").await;
        let mut payload = test_support::staff_payload("d@x.com", StaffRole::Delivery);
        payload.date_of_joining = "01/02/2024".into();
        let err = create_staff(&pool, store.id, &payload, owner.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_employee_id_gives_up_after_bounded_retries() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "sf5@example.com").await;
        let store = test_support::store(&pool, owner.id, "SF-5").await;

        // Every candidate id is taken by a concurrent insert just before ours
        sqlx::query(
            "CREATE TRIGGER take_employee_id BEFORE INSERT ON staff WHEN NEW.name <> 'racer'
             BEGIN
                 INSERT INTO staff (id, store_id, employee_id, name, email, phone, role, date_of_joining, created_by, created_at, updated_at)
                 VALUES (NEW.id + 1, NEW.store_id, NEW.employee_id, 'racer', 'racer-' || NEW.employee_id, '0', NEW.role, NEW.date_of_joining, 0, 0, 0);
             END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let payload = test_support::staff_payload("e@x.com", StaffRole::Pharmacist);
        let err = create_staff(&pool, store.id, &payload, owner.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmployeeIdExhausted);
        assert_eq!(err.http_status(), http::StatusCode::CONFLICT);

        let store = store_repo::find_by_id(&pool, store.id).await.unwrap().unwrap();
        assert_eq!(store.staff_count, 0);
    }
}
