//! Dashboard aggregates

use super::{DailyOverview, PayrollSummary, StaffStats, Store, SubscriptionPlan, SubscriptionStatus};
use serde::{Deserialize, Serialize};

/// Per-store dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDashboard {
    pub store: Store,
    pub staff: StaffStats,
    pub attendance_today: DailyOverview,
    pub payroll: PayrollSummary,
}

/// Owner-level overview across all stores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerOverview {
    pub store_count: i64,
    pub active_stores: i64,
    pub plan: Option<SubscriptionPlan>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub store_limit: i64,
    pub stores_used: i64,
    pub total_staff: i64,
    pub active_staff: i64,
}
