//! Store Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Postal address of a store
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StoreAddress {
    #[validate(length(max = 500))]
    pub street: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(min = 1, max = 20))]
    pub pincode: String,
    #[serde(default = "default_country")]
    #[validate(length(max = 100))]
    pub country: String,
}

fn default_country() -> String {
    "India".to_string()
}

/// Per-store operating settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StoreSettings {
    #[validate(length(min = 1, max = 10))]
    pub currency: String,
    #[validate(length(min = 1, max = 64))]
    pub timezone: String,
    /// HH:MM
    pub opening_time: String,
    /// HH:MM
    pub closing_time: String,
    #[validate(range(min = 0))]
    pub low_stock_threshold: i64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            opening_time: "09:00".to_string(),
            closing_time: "21:00".to_string(),
            low_stock_threshold: 10,
        }
    }
}

/// Store entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Store {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    /// `SC` + 6 hex chars, unique
    pub code: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub address: StoreAddress,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub license_number: String,
    pub gst_number: Option<String>,
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub settings: StoreSettings,
    pub manager_id: Option<i64>,
    pub staff_count: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create store payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(nested)]
    pub address: StoreAddress,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub license_number: String,
    #[validate(length(max = 100))]
    pub gst_number: Option<String>,
    #[validate(nested)]
    pub settings: Option<StoreSettings>,
}

/// Update store payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct StoreUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(nested)]
    pub address: Option<StoreAddress>,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub license_number: Option<String>,
    #[validate(length(max = 100))]
    pub gst_number: Option<String>,
    #[validate(nested)]
    pub settings: Option<StoreSettings>,
    pub is_active: Option<bool>,
}

/// Assign a manager login to a store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignManager {
    pub user_id: i64,
}
