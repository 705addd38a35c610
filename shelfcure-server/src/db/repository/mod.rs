//! Repository Module
//!
//! Free async functions over a [`SqlitePool`](sqlx::SqlitePool), one module per table.

pub mod attendance;
pub mod salary;
pub mod salary_config;
pub mod staff;
pub mod store;
pub mod subscription;
pub mod user;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique index violation, carries the offending column
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// State does not allow the operation
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Record".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(unique_column(db_err.message()))
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                RepoError::Validation("Referenced record does not exist".into())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Column named by a SQLite unique violation
///
/// `UNIQUE constraint failed: staff.store_id, staff.employee_id` yields
/// `employee_id`; the last column is the one the caller supplied.
fn unique_column(message: &str) -> String {
    message
        .rsplit(", ")
        .next()
        .and_then(|col| col.rsplit('.').next())
        .map(|col| col.trim().to_string())
        .filter(|col| !col.is_empty() && !col.contains(' '))
        .unwrap_or_else(|| "record".to_string())
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(resource) => AppError::not_found(resource),
            RepoError::Duplicate(field) => AppError::duplicate(field),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Conflict(msg) => AppError::with_message(ErrorCode::InvalidRequest, msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Map rows-affected of an UPDATE/DELETE by id to NotFound
pub(crate) fn ensure_affected(rows: u64, resource: &str) -> RepoResult<()> {
    if rows == 0 {
        return Err(RepoError::NotFound(resource.to_string()));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by repository tests

    use crate::db::DbService;
    use shared::models::{
        Staff, StaffCreate, StaffRole, Store, StoreAddress, StoreCreate, User, UserRole,
    };
    use sqlx::SqlitePool;

    pub async fn pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    pub async fn owner(pool: &SqlitePool, email: &str) -> User {
        super::user::create(pool, "Owner", email, "hash", None, UserRole::StoreOwner, None)
            .await
            .unwrap()
    }

    pub fn store_payload(license: &str) -> StoreCreate {
        StoreCreate {
            name: "Main Street Pharmacy".into(),
            description: None,
            address: StoreAddress {
                street: Some("12 Main Street".into()),
                city: "Pune".into(),
                state: "Maharashtra".into(),
                pincode: "411001".into(),
                country: "India".into(),
            },
            phone: None,
            email: None,
            license_number: license.into(),
            gst_number: None,
            settings: None,
        }
    }

    pub async fn store(pool: &SqlitePool, owner_id: i64, license: &str) -> Store {
        let code = format!("SC-{license}");
        super::store::create(pool, owner_id, &code, &store_payload(license))
            .await
            .unwrap()
    }

    pub fn staff_payload(email: &str, role: StaffRole) -> StaffCreate {
        StaffCreate {
            name: "Ravi Kumar".into(),
            email: email.into(),
            phone: "9800000000".into(),
            role,
            department: None,
            date_of_joining: "2024-01-01".into(),
            salary: 26000.0,
            address: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
        }
    }

    pub async fn staff(pool: &SqlitePool, store_id: i64, employee_id: &str, email: &str) -> Staff {
        super::staff::create(
            pool,
            store_id,
            employee_id,
            &staff_payload(email, StaffRole::Pharmacist),
            1,
        )
        .await
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_column() {
        assert_eq!(
            unique_column("UNIQUE constraint failed: staff.store_id, staff.employee_id"),
            "employee_id"
        );
        assert_eq!(unique_column("UNIQUE constraint failed: users.email"), "email");
        assert_eq!(unique_column("something else entirely"), "record");
    }

    #[test]
    fn test_into_app_error() {
        let err: AppError = RepoError::Duplicate("license_number".into()).into();
        assert_eq!(err.code, ErrorCode::DuplicateKey);
        assert_eq!(err.message, "license_number already exists");
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);

        let err: AppError = RepoError::NotFound("Staff".into()).into();
        assert_eq!(err.http_status(), http::StatusCode::NOT_FOUND);
    }
}
