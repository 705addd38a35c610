//! User Repository

use super::{RepoError, RepoResult, ensure_affected};
use shared::models::{User, UserRole};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, email, password_hash, phone, role, store_id, is_active, last_login_at, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Lookup by email (case-insensitive, emails are stored lowercase)
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE email = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    phone: Option<&str>,
    role: UserRole,
    store_id: Option<i64>,
) -> RepoResult<User> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, phone, role, store_id, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
    )
    .bind(id)
    .bind(name.trim())
    .bind(email.trim().to_lowercase())
    .bind(password_hash)
    .bind(phone)
    .bind(role)
    .bind(store_id)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(password_hash)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    ensure_affected(rows, "User")
}

pub async fn touch_last_login(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE users SET last_login_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Assign a login to a store (managers, staff, cashiers)
pub async fn set_store(pool: &SqlitePool, id: i64, store_id: Option<i64>) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE users SET store_id = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(store_id)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    ensure_affected(rows, "User")
}

pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(is_active)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    ensure_affected(rows, "User")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;

    #[tokio::test]
    async fn test_create_and_find_by_email() {
        let pool = test_support::pool().await;
        let user = create(
            &pool,
            "Meera",
            "Meera@Example.com",
            "hash",
            Some("98000"),
            UserRole::StoreOwner,
            None,
        )
        .await
        .unwrap();
        assert_eq!(user.email, "meera@example.com");
        assert!(user.is_active);

        let found = find_by_email(&pool, "MEERA@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, UserRole::StoreOwner);
    }

    #[tokio::test]
    async fn test_duplicate_email_names_field() {
        let pool = test_support::pool().await;
        test_support::owner(&pool, "dup@example.com").await;
        let err = create(&pool, "Other", "dup@example.com", "h", None, UserRole::StoreOwner, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(ref f) if f == "email"));
    }

    #[tokio::test]
    async fn test_password_and_activity_updates() {
        let pool = test_support::pool().await;
        let user = test_support::owner(&pool, "upd@example.com").await;

        update_password(&pool, user.id, "new-hash").await.unwrap();
        touch_last_login(&pool, user.id).await.unwrap();
        set_active(&pool, user.id, false).await.unwrap();

        let user = find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new-hash");
        assert!(user.last_login_at.is_some());
        assert!(!user.is_active);

        assert!(matches!(
            update_password(&pool, 1, "x").await,
            Err(RepoError::NotFound(_))
        ));
    }
}
