//! User Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Authentication role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum UserRole {
    Superadmin,
    StoreOwner,
    StoreManager,
    Staff,
    Cashier,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::StoreOwner => "store_owner",
            Self::StoreManager => "store_manager",
            Self::Staff => "staff",
            Self::Cashier => "cashier",
        }
    }

    /// Roles bound to a single assigned store
    pub fn is_store_scoped(&self) -> bool {
        matches!(self, Self::StoreManager | Self::Staff | Self::Cashier)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Self::Superadmin),
            "store_owner" => Ok(Self::StoreOwner),
            "store_manager" => Ok(Self::StoreManager),
            "staff" => Ok(Self::Staff),
            "cashier" => Ok(Self::Cashier),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// User entity (login principal)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Stored lowercase
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: UserRole,
    /// Assigned store for manager/staff/cashier
    pub store_id: Option<i64>,
    pub is_active: bool,
    pub last_login_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Store owner self-registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Owner-provisioned login for a manager, staff member or cashier
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
    pub role: UserRole,
    pub store_id: i64,
}

/// Enable or disable a login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatusUpdate {
    pub is_active: bool,
}

/// Login / register response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}
