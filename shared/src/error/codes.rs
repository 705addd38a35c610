//! Unified error codes for ShelfCure
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Subscription errors
//! - 4xxx: Store errors
//! - 5xxx: Staff errors
//! - 6xxx: Attendance errors
//! - 7xxx: Payroll errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can switch
/// on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Unique index rejected a write
    DuplicateKey = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,
    /// Password too short
    PasswordTooShort = 1006,
    /// Email already registered
    EmailAlreadyRegistered = 1007,
    /// Too many requests from one client
    TooManyRequests = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Store does not belong to the caller
    StoreAccessDenied = 2003,

    // ==================== 3xxx: Subscription ====================
    /// No subscription for owner
    SubscriptionNotFound = 3001,
    /// Subscription cancelled or suspended
    SubscriptionInactive = 3002,
    /// Subscription past its end date
    SubscriptionExpired = 3003,
    /// Plan store limit reached
    StoreLimitReached = 3004,
    /// Feature not available in current plan
    FeatureNotAvailable = 3005,
    /// Downgrade would leave more stores than the plan allows
    PlanDowngradeBlocked = 3006,

    // ==================== 4xxx: Store ====================
    /// License number already registered
    LicenseNumberExists = 4002,

    // ==================== 5xxx: Staff ====================
    /// Staff not found
    StaffNotFound = 5001,
    /// Could not allocate a free employee id
    EmployeeIdExhausted = 5002,
    /// Staff member is terminated
    StaffTerminated = 5003,
    /// Staff email already used in this store
    StaffEmailExists = 5004,

    // ==================== 6xxx: Attendance ====================
    /// Attendance record not found
    AttendanceNotFound = 6001,
    /// Attendance already marked for that date
    AttendanceAlreadyMarked = 6002,
    /// Attendance date precedes joining date
    AttendanceBeforeJoining = 6003,
    /// Attendance date is in the future
    AttendanceInFuture = 6004,
    /// Check-out is not after check-in
    InvalidCheckTimes = 6005,

    // ==================== 7xxx: Payroll ====================
    /// Payslip not found
    SalaryNotFound = 7001,
    /// Payslip already generated for the period
    SalaryAlreadyGenerated = 7002,
    /// Payslip is no longer a draft
    SalaryNotEditable = 7003,
    /// Status transition not allowed
    InvalidSalaryTransition = 7004,
    /// Month/year out of range
    InvalidPayPeriod = 7005,
    /// Salary config not found
    SalaryConfigNotFound = 7006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::DuplicateKey => "Duplicate value",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::PasswordTooShort => "Password is too short",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::StoreAccessDenied => "Store not found or access denied",

            // Subscription
            ErrorCode::SubscriptionNotFound => "No subscription found",
            ErrorCode::SubscriptionInactive => "Subscription is not active",
            ErrorCode::SubscriptionExpired => "Subscription has expired",
            ErrorCode::StoreLimitReached => "Store limit reached for current plan",
            ErrorCode::FeatureNotAvailable => "Feature not available in current subscription plan",
            ErrorCode::PlanDowngradeBlocked => "Plan allows fewer stores than are in use",

            // Store
            ErrorCode::LicenseNumberExists => "License number already registered",

            // Staff
            ErrorCode::StaffNotFound => "Staff not found",
            ErrorCode::EmployeeIdExhausted => "Could not allocate employee id",
            ErrorCode::StaffTerminated => "Staff member is terminated",
            ErrorCode::StaffEmailExists => "Staff email already exists in this store",

            // Attendance
            ErrorCode::AttendanceNotFound => "Attendance record not found",
            ErrorCode::AttendanceAlreadyMarked => "Attendance already marked for this date",
            ErrorCode::AttendanceBeforeJoining => "Attendance date is before joining date",
            ErrorCode::AttendanceInFuture => "Attendance date is in the future",
            ErrorCode::InvalidCheckTimes => "Check-out time must be after check-in time",

            // Payroll
            ErrorCode::SalaryNotFound => "Salary record not found",
            ErrorCode::SalaryAlreadyGenerated => "Salary already generated for this period",
            ErrorCode::SalaryNotEditable => "Salary record can no longer be edited",
            ErrorCode::InvalidSalaryTransition => "Salary status change not allowed",
            ErrorCode::InvalidPayPeriod => "Invalid pay period",
            ErrorCode::SalaryConfigNotFound => "Salary configuration not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a u16 does not name a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::DuplicateKey),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),
            1006 => Ok(ErrorCode::PasswordTooShort),
            1007 => Ok(ErrorCode::EmailAlreadyRegistered),
            1008 => Ok(ErrorCode::TooManyRequests),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::StoreAccessDenied),

            // Subscription
            3001 => Ok(ErrorCode::SubscriptionNotFound),
            3002 => Ok(ErrorCode::SubscriptionInactive),
            3003 => Ok(ErrorCode::SubscriptionExpired),
            3004 => Ok(ErrorCode::StoreLimitReached),
            3005 => Ok(ErrorCode::FeatureNotAvailable),
            3006 => Ok(ErrorCode::PlanDowngradeBlocked),

            // Store
            4002 => Ok(ErrorCode::LicenseNumberExists),

            // Staff
            5001 => Ok(ErrorCode::StaffNotFound),
            5002 => Ok(ErrorCode::EmployeeIdExhausted),
            5003 => Ok(ErrorCode::StaffTerminated),
            5004 => Ok(ErrorCode::StaffEmailExists),

            // Attendance
            6001 => Ok(ErrorCode::AttendanceNotFound),
            6002 => Ok(ErrorCode::AttendanceAlreadyMarked),
            6003 => Ok(ErrorCode::AttendanceBeforeJoining),
            6004 => Ok(ErrorCode::AttendanceInFuture),
            6005 => Ok(ErrorCode::InvalidCheckTimes),

            // Payroll
            7001 => Ok(ErrorCode::SalaryNotFound),
            7002 => Ok(ErrorCode::SalaryAlreadyGenerated),
            7003 => Ok(ErrorCode::SalaryNotEditable),
            7004 => Ok(ErrorCode::InvalidSalaryTransition),
            7005 => Ok(ErrorCode::InvalidPayPeriod),
            7006 => Ok(ErrorCode::SalaryConfigNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
