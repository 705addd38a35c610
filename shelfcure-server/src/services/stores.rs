//! Store lifecycle bound to the owner's subscription
//!
//! Creating a store takes a subscription slot before inserting; a failed
//! insert hands the slot back.

use rand::Rng;
use shared::error::ErrorCode;
use shared::models::{Store, StoreCreate, Subscription, UserRole};
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::db::repository::{
    RepoError, store as store_repo, subscription as subscription_repo, user as user_repo,
};
use crate::services::subscription::{SubscriptionCache, ensure_for_owner};
use crate::utils::{AppError, AppResult};

/// Store code attempts before giving up
const CODE_ATTEMPTS: usize = 5;

/// `SC` followed by six uppercase hex digits
pub fn generate_store_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..0x100_0000);
    format!("SC{n:06X}")
}

/// Create a store for `owner`, consuming one subscription slot
pub async fn create_store(
    pool: &SqlitePool,
    cache: &SubscriptionCache,
    owner: &CurrentUser,
    trial_days: i64,
    data: &StoreCreate,
) -> AppResult<Store> {
    let subscription = ensure_for_owner(pool, owner.id, trial_days).await?;

    if !subscription_repo::reserve_store_slot(pool, owner.id)
        .await
        .map_err(AppError::from)?
    {
        return Err(slot_refusal(&subscription));
    }
    cache.invalidate(owner.id).await;

    match insert_with_unique_code(pool, owner.id, data).await {
        Ok(store) => {
            tracing::info!(store_id = store.id, owner_id = owner.id, code = %store.code, "Store created");
            Ok(store)
        }
        Err(e) => {
            if let Err(release) = subscription_repo::release_store_slot(pool, owner.id).await {
                tracing::error!(owner_id = owner.id, error = %release, "Failed to release store slot");
            }
            Err(e)
        }
    }
}

/// Why no slot could be taken
fn slot_refusal(sub: &Subscription) -> AppError {
    let now = shared::util::now_millis();
    if !sub.is_usable(now) {
        let code = if sub.end_date <= now {
            ErrorCode::SubscriptionExpired
        } else {
            ErrorCode::SubscriptionInactive
        };
        return AppError::new(code);
    }
    AppError::with_message(
        ErrorCode::StoreLimitReached,
        format!(
            "Store limit reached: {} of {} stores in use",
            sub.stores_used, sub.store_limit
        ),
    )
    .with_detail("store_limit", sub.store_limit)
}

async fn insert_with_unique_code(
    pool: &SqlitePool,
    owner_id: i64,
    data: &StoreCreate,
) -> AppResult<Store> {
    for _ in 0..CODE_ATTEMPTS {
        let code = generate_store_code();
        match store_repo::create(pool, owner_id, &code, data).await {
            Ok(store) => return Ok(store),
            Err(RepoError::Duplicate(field)) if field == "code" => {
                tracing::debug!(code = %code, "Store code collision, retrying");
            }
            Err(RepoError::Duplicate(field)) if field == "license_number" => {
                return Err(AppError::with_message(
                    ErrorCode::LicenseNumberExists,
                    "license_number already exists",
                )
                .with_detail("field", "license_number"));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::conflict("Could not allocate a unique store code"))
}

/// Delete a store and hand its slot back to the owner
pub async fn delete_store(pool: &SqlitePool, cache: &SubscriptionCache, store: &Store) -> AppResult<()> {
    store_repo::delete(pool, store.id)
        .await
        .map_err(AppError::from)?;
    subscription_repo::release_store_slot(pool, store.owner_id)
        .await
        .map_err(AppError::from)?;
    cache.invalidate(store.owner_id).await;
    tracing::info!(store_id = store.id, owner_id = store.owner_id, "Store deleted");
    Ok(())
}

/// Make `user_id` the manager of `store`
///
/// The user must hold the store_manager role and be unassigned or already
/// assigned to this store.
pub async fn assign_manager(pool: &SqlitePool, store: &Store, user_id: i64) -> AppResult<Store> {
    let user = user_repo::find_by_id(pool, user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("User"))?;

    if user.role != UserRole::StoreManager {
        return Err(AppError::validation("User is not a store manager")
            .with_detail("field", "user_id"));
    }
    if let Some(assigned) = user.store_id
        && assigned != store.id
    {
        return Err(AppError::validation("User is assigned to another store")
            .with_detail("field", "user_id"));
    }

    user_repo::set_store(pool, user.id, Some(store.id))
        .await
        .map_err(AppError::from)?;
    let store = store_repo::set_manager(pool, store.id, Some(user.id))
        .await
        .map_err(AppError::from)?;
    tracing::info!(store_id = store.id, manager_id = user.id, "Store manager assigned");
    Ok(store)
}
