//! Role groups used by route guards
//!
//! Superadmin is part of every group that manages a store; store scoping is
//! enforced separately by the store access check.

use shared::models::UserRole;

/// Platform operators
pub const SUPERADMIN: &[UserRole] = &[UserRole::Superadmin];

/// Store owners only (subscription, owner dashboard)
pub const OWNER: &[UserRole] = &[UserRole::StoreOwner];

/// Owners and platform operators (manager assignment, payroll sign-off, user provisioning)
pub const OWNER_OR_ADMIN: &[UserRole] = &[UserRole::Superadmin, UserRole::StoreOwner];

/// Roles that run a store day to day (staff, attendance, payroll drafts)
pub const STORE_ADMINS: &[UserRole] = &[
    UserRole::Superadmin,
    UserRole::StoreOwner,
    UserRole::StoreManager,
];

/// Roles an owner may provision logins for
pub const PROVISIONABLE: &[UserRole] = &[
    UserRole::StoreManager,
    UserRole::Staff,
    UserRole::Cashier,
];
