//! Store access check
//!
//! A store the caller may not see is reported exactly like a missing one.

use shared::models::Store;
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::db::repository::store as store_repo;
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// Whether `user` may act on `store`
///
/// Superadmin always; owners on their own stores; managers, staff and
/// cashiers on their assigned store.
pub fn can_access(user: &CurrentUser, store: &Store) -> bool {
    if user.is_superadmin() {
        return true;
    }
    if user.is_owner() {
        return store.owner_id == user.id;
    }
    user.role.is_store_scoped() && user.store_id == Some(store.id)
}

/// Load a store and check access, 404 `StoreAccessDenied` otherwise
pub async fn verify_store_access(
    pool: &SqlitePool,
    user: &CurrentUser,
    store_id: i64,
) -> AppResult<Store> {
    let store = store_repo::find_by_id(pool, store_id)
        .await
        .map_err(AppError::from)?;

    match store {
        Some(store) if can_access(user, &store) => Ok(store),
        Some(_) => {
            security_log!(
                "WARN",
                "store_access_denied",
                user_id = user.id,
                role = user.role.as_str(),
                store_id = store_id
            );
            Err(AppError::store_access_denied())
        }
        None => Err(AppError::store_access_denied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{StoreAddress, StoreSettings, UserRole};

    fn store(id: i64, owner_id: i64) -> Store {
        Store {
            id,
            owner_id,
            name: "Pharmacy".into(),
            code: "SC000001".into(),
            description: None,
            address: StoreAddress::default(),
            phone: None,
            email: None,
            license_number: "L1".into(),
            gst_number: None,
            settings: StoreSettings::default(),
            manager_id: None,
            staff_count: 0,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn user(id: i64, role: UserRole, store_id: Option<i64>) -> CurrentUser {
        CurrentUser {
            id,
            email: "u@example.com".into(),
            name: "U".into(),
            role,
            store_id,
        }
    }

    #[test]
    fn test_access_rules() {
        let s = store(10, 1);
        assert!(can_access(&user(99, UserRole::Superadmin, None), &s));
        assert!(can_access(&user(1, UserRole::StoreOwner, None), &s));
        assert!(!can_access(&user(2, UserRole::StoreOwner, None), &s));
        assert!(can_access(&user(3, UserRole::StoreManager, Some(10)), &s));
        assert!(!can_access(&user(3, UserRole::StoreManager, Some(11)), &s));
        assert!(can_access(&user(4, UserRole::Cashier, Some(10)), &s));
        assert!(!can_access(&user(5, UserRole::Staff, None), &s));
    }

    #[tokio::test]
    async fn test_missing_and_foreign_store_look_the_same() {
        use crate::db::repository::test_support;

        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "acc@example.com").await;
        let s = test_support::store(&pool, owner.id, "ACC-1").await;

        let stranger = user(owner.id + 1, UserRole::StoreOwner, None);
        let denied = verify_store_access(&pool, &stranger, s.id).await.unwrap_err();
        let missing = verify_store_access(&pool, &stranger, 12345).await.unwrap_err();
        assert_eq!(denied.code, missing.code);
        assert_eq!(denied.http_status(), http::StatusCode::NOT_FOUND);

        let me = user(owner.id, UserRole::StoreOwner, None);
        assert_eq!(verify_store_access(&pool, &me, s.id).await.unwrap().id, s.id);
    }
}
