//! Staff Salary (payslip) Model

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SalaryStatus {
    Draft,
    Approved,
    Paid,
    Cancelled,
}

impl SalaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Allowed lifecycle moves: draft → approved → paid, draft/approved → cancelled
    pub fn can_transition_to(&self, next: SalaryStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Approved)
                | (Self::Approved, Self::Paid)
                | (Self::Draft, Self::Cancelled)
                | (Self::Approved, Self::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Upi,
    Cheque,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Allowances {
    pub hra: f64,
    pub da: f64,
    pub ta: f64,
    pub medical: f64,
    pub special: f64,
    pub overtime: f64,
    pub bonus: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Deductions {
    pub pf: f64,
    pub esi: f64,
    pub professional_tax: f64,
    pub tds: f64,
    pub loss_of_pay: f64,
    pub advance: f64,
    pub other: f64,
}

/// Payslip, one per staff per month
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StaffSalary {
    pub id: i64,
    pub store_id: i64,
    pub staff_id: i64,
    pub month: i64,
    pub year: i64,
    pub base_salary: f64,
    pub working_days: i64,
    pub days_worked: f64,
    pub present_days: i64,
    pub absent_days: f64,
    pub late_days: i64,
    pub half_days: i64,
    pub leave_days: i64,
    pub holiday_days: i64,
    pub overtime_hours: f64,
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub allowances: Allowances,
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub deductions: Deductions,
    pub total_allowances: f64,
    pub total_deductions: f64,
    pub gross_salary: f64,
    pub net_salary: f64,
    pub status: SalaryStatus,
    /// YYYY-MM-DD
    pub payment_date: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub generated_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Generate one payslip
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SalaryGenerate {
    pub staff_id: i64,
    #[validate(range(min = 1, max = 12))]
    pub month: i64,
    #[validate(range(min = 2000, max = 2100))]
    pub year: i64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub bonus: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub advance: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub other_deduction: f64,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    /// Recompute an existing draft, or replace a cancelled payslip, for the same period
    #[serde(default)]
    pub regenerate: bool,
}

/// Generate payslips for every active staff member
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkSalaryGenerate {
    #[validate(range(min = 1, max = 12))]
    pub month: i64,
    #[validate(range(min = 2000, max = 2100))]
    pub year: i64,
    #[serde(default)]
    pub regenerate: bool,
}

/// Draft-only adjustments
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SalaryAdjustment {
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub bonus: Option<f64>,
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub advance: Option<f64>,
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub other_deduction: Option<f64>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkPaid {
    pub payment_method: PaymentMethod,
    /// Defaults to today
    pub payment_date: Option<String>,
}

/// Payslip list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalaryQuery {
    pub month: Option<i64>,
    pub year: Option<i64>,
    pub status: Option<SalaryStatus>,
    pub staff_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeriodQuery {
    pub month: i64,
    pub year: i64,
}

/// Payroll totals for one store and period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollSummary {
    pub month: i64,
    pub year: i64,
    pub total: i64,
    pub draft: i64,
    pub approved: i64,
    pub paid: i64,
    pub cancelled: i64,
    pub total_gross: f64,
    pub total_deductions: f64,
    pub total_net: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_transitions() {
        assert!(SalaryStatus::Draft.can_transition_to(SalaryStatus::Approved));
        assert!(SalaryStatus::Approved.can_transition_to(SalaryStatus::Paid));
        assert!(SalaryStatus::Approved.can_transition_to(SalaryStatus::Cancelled));
        assert!(!SalaryStatus::Draft.can_transition_to(SalaryStatus::Paid));
        assert!(!SalaryStatus::Paid.can_transition_to(SalaryStatus::Cancelled));
        assert!(!SalaryStatus::Cancelled.can_transition_to(SalaryStatus::Draft));
    }
}
