//! Subscription Model
//!
//! One subscription per store owner. The plan fixes the store limit and the
//! feature set; the status and end date decide whether it is usable.

use serde::{Deserialize, Serialize};

/// Billing plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SubscriptionPlan {
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl SubscriptionPlan {
    pub fn store_limit(&self) -> i64 {
        match self {
            Self::Free => 1,
            Self::Basic => 3,
            Self::Premium => 10,
            Self::Enterprise => 100,
        }
    }

    pub fn features(&self) -> Vec<Feature> {
        use Feature::*;
        match self {
            Self::Free => vec![StaffManagement, Attendance],
            Self::Basic => vec![StaffManagement, Attendance, Payroll, Inventory, MultiStore],
            Self::Premium | Self::Enterprise => vec![
                StaffManagement,
                Attendance,
                Payroll,
                Inventory,
                MultiStore,
                Analytics,
            ],
        }
    }

    /// Price per billing cycle
    pub fn price(&self, cycle: BillingCycle) -> f64 {
        let monthly = match self {
            Self::Free => 0.0,
            Self::Basic => 999.0,
            Self::Premium => 2499.0,
            Self::Enterprise => 4999.0,
        };
        match cycle {
            BillingCycle::Monthly => monthly,
            // two months free on yearly billing
            BillingCycle::Yearly => monthly * 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn days(&self) -> i64 {
        match self {
            Self::Monthly => 30,
            Self::Yearly => 365,
        }
    }
}

/// Feature flag gated by plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    StaffManagement,
    Attendance,
    Payroll,
    Analytics,
    MultiStore,
    Inventory,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StaffManagement => "staff_management",
            Self::Attendance => "attendance",
            Self::Payroll => "payroll",
            Self::Analytics => "analytics",
            Self::MultiStore => "multi_store",
            Self::Inventory => "inventory",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Subscription {
    pub id: i64,
    pub owner_id: i64,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub billing_cycle: BillingCycle,
    pub amount: f64,
    pub store_limit: i64,
    pub stores_used: i64,
    /// JSON array of feature names
    #[cfg_attr(feature = "db", sqlx(json))]
    pub features: Vec<Feature>,
    pub start_date: i64,
    pub end_date: i64,
    pub next_billing_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Subscription {
    /// Trial or active, and not past its end date
    pub fn is_usable(&self, now: i64) -> bool {
        matches!(
            self.status,
            SubscriptionStatus::Trial | SubscriptionStatus::Active
        ) && self.end_date > now
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }
}

/// Plan change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanChange {
    pub plan: SubscriptionPlan,
    #[serde(default)]
    pub billing_cycle: BillingCycle,
}

/// Superadmin status override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionStatusUpdate {
    pub status: SubscriptionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: SubscriptionStatus, end_date: i64) -> Subscription {
        Subscription {
            id: 1,
            owner_id: 2,
            plan: SubscriptionPlan::Free,
            status,
            billing_cycle: BillingCycle::Monthly,
            amount: 0.0,
            store_limit: 1,
            stores_used: 0,
            features: SubscriptionPlan::Free.features(),
            start_date: 0,
            end_date,
            next_billing_date: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_plan_limits() {
        assert_eq!(SubscriptionPlan::Free.store_limit(), 1);
        assert_eq!(SubscriptionPlan::Basic.store_limit(), 3);
        assert_eq!(SubscriptionPlan::Premium.store_limit(), 10);
        assert_eq!(SubscriptionPlan::Enterprise.store_limit(), 100);
    }

    #[test]
    fn test_free_plan_lacks_payroll() {
        assert!(!SubscriptionPlan::Free.features().contains(&Feature::Payroll));
        assert!(SubscriptionPlan::Basic.features().contains(&Feature::Payroll));
        assert!(SubscriptionPlan::Premium.features().contains(&Feature::Analytics));
    }

    #[test]
    fn test_usable() {
        assert!(sample(SubscriptionStatus::Trial, 100).is_usable(50));
        assert!(!sample(SubscriptionStatus::Trial, 100).is_usable(100));
        assert!(!sample(SubscriptionStatus::Cancelled, 100).is_usable(50));
        assert!(!sample(SubscriptionStatus::Expired, 100).is_usable(50));
    }

    #[test]
    fn test_feature_serde() {
        let json = serde_json::to_string(&vec![Feature::StaffManagement, Feature::MultiStore])
            .unwrap();
        assert_eq!(json, r#"["staff_management","multi_store"]"#);
    }
}
