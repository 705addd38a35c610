//! Staff Model
//!
//! Employee records scoped to a store. Distinct from [`super::User`]: a staff
//! member does not need a login.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum StaffRole {
    StoreManager,
    Pharmacist,
    Assistant,
    Cashier,
    Delivery,
    Cleaner,
    Other,
}

impl StaffRole {
    /// Employee id prefix
    pub fn employee_prefix(&self) -> &'static str {
        match self {
            Self::StoreManager => "MGR",
            Self::Pharmacist => "PHM",
            Self::Assistant => "AST",
            Self::Cashier => "CSH",
            Self::Delivery => "DEL",
            Self::Cleaner => "CLN",
            Self::Other => "EMP",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StoreManager => "store_manager",
            Self::Pharmacist => "pharmacist",
            Self::Assistant => "assistant",
            Self::Cashier => "cashier",
            Self::Delivery => "delivery",
            Self::Cleaner => "cleaner",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum StaffStatus {
    #[default]
    Active,
    Inactive,
    OnLeave,
    Terminated,
}

/// Staff entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: i64,
    pub store_id: i64,
    /// e.g. `PHM001`, unique per store
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: StaffRole,
    pub department: Option<String>,
    /// YYYY-MM-DD
    pub date_of_joining: String,
    /// Monthly base salary
    pub salary: f64,
    pub status: StaffStatus,
    pub address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create staff payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StaffCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub phone: String,
    pub role: StaffRole,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    pub date_of_joining: String,
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub salary: f64,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 200))]
    pub emergency_contact_name: Option<String>,
    #[validate(length(max = 100))]
    pub emergency_contact_phone: Option<String>,
}

/// Update staff payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct StaffUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub phone: Option<String>,
    pub role: Option<StaffRole>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    pub date_of_joining: Option<String>,
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub salary: Option<f64>,
    pub status: Option<StaffStatus>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 200))]
    pub emergency_contact_name: Option<String>,
    #[validate(length(max = 100))]
    pub emergency_contact_phone: Option<String>,
}

/// Staff list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffQuery {
    pub role: Option<StaffRole>,
    pub status: Option<StaffStatus>,
    /// Matches name, email, phone or employee id
    pub search: Option<String>,
}

/// Staff counts for a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub on_leave: i64,
    pub terminated: i64,
    pub by_role: HashMap<String, i64>,
}
