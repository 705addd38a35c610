//! Store Repository

use super::{RepoError, RepoResult, ensure_affected};
use shared::models::{Store, StoreCreate, StoreUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, owner_id, name, code, description, street, city, state, pincode, country, phone, email, license_number, gst_number, currency, timezone, opening_time, closing_time, low_stock_threshold, manager_id, staff_count, is_active, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Store>> {
    let sql = format!("SELECT {COLUMNS} FROM stores WHERE id = ?");
    let store = sqlx::query_as::<_, Store>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(store)
}

pub async fn list_by_owner(
    pool: &SqlitePool,
    owner_id: i64,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<Store>, i64)> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stores WHERE owner_id = ?")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
    let sql = format!(
        "SELECT {COLUMNS} FROM stores WHERE owner_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
    );
    let items = sqlx::query_as::<_, Store>(&sql)
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok((items, total))
}

pub async fn list_all(pool: &SqlitePool, offset: i64, limit: i64) -> RepoResult<(Vec<Store>, i64)> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stores")
        .fetch_one(pool)
        .await?;
    let sql = format!("SELECT {COLUMNS} FROM stores ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
    let items = sqlx::query_as::<_, Store>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok((items, total))
}

/// (total, active) store counts of an owner
pub async fn count_by_owner(pool: &SqlitePool, owner_id: i64) -> RepoResult<(i64, i64)> {
    let counts: (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(is_active), 0) FROM stores WHERE owner_id = ?",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;
    Ok(counts)
}

pub async fn create(
    pool: &SqlitePool,
    owner_id: i64,
    code: &str,
    data: &StoreCreate,
) -> RepoResult<Store> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let settings = data.settings.clone().unwrap_or_default();

    sqlx::query(
        "INSERT INTO stores (id, owner_id, name, code, description, street, city, state, pincode, country, phone, email, license_number, gst_number, currency, timezone, opening_time, closing_time, low_stock_threshold, staff_count, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, 0, 1, ?20, ?20)",
    )
    .bind(id)
    .bind(owner_id)
    .bind(data.name.trim())
    .bind(code)
    .bind(&data.description)
    .bind(&data.address.street)
    .bind(&data.address.city)
    .bind(&data.address.state)
    .bind(&data.address.pincode)
    .bind(&data.address.country)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(data.license_number.trim())
    .bind(&data.gst_number)
    .bind(&settings.currency)
    .bind(&settings.timezone)
    .bind(&settings.opening_time)
    .bind(&settings.closing_time)
    .bind(settings.low_stock_threshold)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create store".into()))
}

/// Apply a partial update; absent fields keep their value
pub async fn update(pool: &SqlitePool, id: i64, data: StoreUpdate) -> RepoResult<Store> {
    let mut store = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Store".into()))?;

    if let Some(name) = data.name {
        store.name = name.trim().to_string();
    }
    if data.description.is_some() {
        store.description = data.description;
    }
    if let Some(address) = data.address {
        store.address = address;
    }
    if data.phone.is_some() {
        store.phone = data.phone;
    }
    if data.email.is_some() {
        store.email = data.email;
    }
    if let Some(license) = data.license_number {
        store.license_number = license.trim().to_string();
    }
    if data.gst_number.is_some() {
        store.gst_number = data.gst_number;
    }
    if let Some(settings) = data.settings {
        store.settings = settings;
    }
    if let Some(active) = data.is_active {
        store.is_active = active;
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE stores SET name = ?1, description = ?2, street = ?3, city = ?4, state = ?5, pincode = ?6, country = ?7, phone = ?8, email = ?9, license_number = ?10, gst_number = ?11, currency = ?12, timezone = ?13, opening_time = ?14, closing_time = ?15, low_stock_threshold = ?16, is_active = ?17, updated_at = ?18 WHERE id = ?19",
    )
    .bind(&store.name)
    .bind(&store.description)
    .bind(&store.address.street)
    .bind(&store.address.city)
    .bind(&store.address.state)
    .bind(&store.address.pincode)
    .bind(&store.address.country)
    .bind(&store.phone)
    .bind(&store.email)
    .bind(&store.license_number)
    .bind(&store.gst_number)
    .bind(&store.settings.currency)
    .bind(&store.settings.timezone)
    .bind(&store.settings.opening_time)
    .bind(&store.settings.closing_time)
    .bind(store.settings.low_stock_threshold)
    .bind(store.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Store".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    // Logins assigned to the store lose their assignment
    sqlx::query("UPDATE users SET store_id = NULL WHERE store_id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    let rows = sqlx::query("DELETE FROM stores WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    ensure_affected(rows, "Store")
}

pub async fn set_manager(pool: &SqlitePool, id: i64, manager_id: Option<i64>) -> RepoResult<Store> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE stores SET manager_id = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(manager_id)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    ensure_affected(rows, "Store")?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Store".into()))
}

/// Move the staff counter, never below zero
pub async fn adjust_staff_count(pool: &SqlitePool, id: i64, delta: i64) -> RepoResult<()> {
    sqlx::query("UPDATE stores SET staff_count = MAX(staff_count + ?1, 0) WHERE id = ?2")
        .bind(delta)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
