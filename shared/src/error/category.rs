//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Subscription errors
/// - 4xxx: Store errors
/// - 5xxx: Staff errors
/// - 6xxx: Attendance errors
/// - 7xxx: Payroll errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Subscription errors (3xxx)
    Subscription,
    /// Store errors (4xxx)
    Store,
    /// Staff errors (5xxx)
    Staff,
    /// Attendance errors (6xxx)
    Attendance,
    /// Payroll errors (7xxx)
    Payroll,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Subscription,
            4000..5000 => Self::Store,
            5000..6000 => Self::Staff,
            6000..7000 => Self::Attendance,
            7000..8000 => Self::Payroll,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Subscription => "subscription",
            Self::Store => "store",
            Self::Staff => "staff",
            Self::Attendance => "attendance",
            Self::Payroll => "payroll",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
