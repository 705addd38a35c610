//! Staff Salary Configuration Model

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_WORKING_DAYS: i64 = 26;
pub const DEFAULT_HOURS_PER_DAY: f64 = 8.0;
pub const DEFAULT_OVERTIME_MULTIPLIER: f64 = 1.5;

/// Upper bound on any single money amount (salary, allowance, adjustment)
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

/// Pay structure of one staff member (one row per staff)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StaffSalaryConfig {
    pub id: i64,
    pub store_id: i64,
    pub staff_id: i64,
    pub base_salary: f64,
    pub hra_percent: f64,
    pub da_percent: f64,
    pub ta_percent: f64,
    pub medical_allowance: f64,
    pub special_allowance: f64,
    pub pf_percent: f64,
    pub esi_percent: f64,
    pub professional_tax: f64,
    pub tds_percent: f64,
    /// Fixed overtime rate; zero derives it from base salary
    pub overtime_rate_per_hour: f64,
    pub overtime_multiplier: f64,
    pub standard_working_days: i64,
    pub standard_hours_per_day: f64,
    /// YYYY-MM-DD
    pub effective_from: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl StaffSalaryConfig {
    /// Config used when a staff member has none: base salary only
    pub fn fallback(store_id: i64, staff_id: i64, base_salary: f64, effective_from: String) -> Self {
        Self {
            id: 0,
            store_id,
            staff_id,
            base_salary,
            hra_percent: 0.0,
            da_percent: 0.0,
            ta_percent: 0.0,
            medical_allowance: 0.0,
            special_allowance: 0.0,
            pf_percent: 0.0,
            esi_percent: 0.0,
            professional_tax: 0.0,
            tds_percent: 0.0,
            overtime_rate_per_hour: 0.0,
            overtime_multiplier: DEFAULT_OVERTIME_MULTIPLIER,
            standard_working_days: DEFAULT_WORKING_DAYS,
            standard_hours_per_day: DEFAULT_HOURS_PER_DAY,
            effective_from,
            created_at: 0,
            updated_at: 0,
        }
    }
}

fn default_multiplier() -> f64 {
    DEFAULT_OVERTIME_MULTIPLIER
}

fn default_working_days() -> i64 {
    DEFAULT_WORKING_DAYS
}

fn default_hours_per_day() -> f64 {
    DEFAULT_HOURS_PER_DAY
}

/// Create-or-replace salary config payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SalaryConfigInput {
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub base_salary: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub hra_percent: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub da_percent: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub ta_percent: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub medical_allowance: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub special_allowance: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub pf_percent: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub esi_percent: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub professional_tax: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub tds_percent: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub overtime_rate_per_hour: f64,
    #[serde(default = "default_multiplier")]
    #[validate(range(min = 1.0, max = 5.0))]
    pub overtime_multiplier: f64,
    #[serde(default = "default_working_days")]
    #[validate(range(min = 1, max = 31))]
    pub standard_working_days: i64,
    #[serde(default = "default_hours_per_day")]
    #[validate(range(min = 1.0, max = 24.0))]
    pub standard_hours_per_day: f64,
    /// Defaults to today
    pub effective_from: Option<String>,
}
