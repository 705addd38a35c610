//! Payslip arithmetic using rust_decimal
//!
//! Every component is rounded to 2 decimal places (half away from zero)
//! before it is summed, so `net == gross - total_deductions` holds to the
//! cent for stored payslips.

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Allowances, DEFAULT_HOURS_PER_DAY, DEFAULT_WORKING_DAYS, Deductions, MAX_AMOUNT, MonthlyTally,
    StaffSalary, StaffSalaryConfig,
};
use thiserror::Error;

const DECIMAL_PLACES: u32 = 2;

/// 31 days of 24 hours
const MAX_OVERTIME_HOURS: f64 = 744.0;

const MAX_PERCENT: f64 = 100.0;

/// Overtime at the highest rate for every hour of a month stays below this
const MAX_COMPONENT: f64 = 1e15;

/// Input the arithmetic refuses to work with
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("{field} must be between 0 and {max}")]
    OutOfRange { field: &'static str, max: f64 },
}

impl From<CalcError> for AppError {
    fn from(err: CalcError) -> Self {
        let CalcError::OutOfRange { field, .. } = &err;
        AppError::with_message(ErrorCode::ValueOutOfRange, err.to_string()).with_detail("field", *field)
    }
}

/// Manual additions and deductions entered on a payslip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjustments {
    pub bonus: f64,
    pub advance: f64,
    pub other_deduction: f64,
}

/// Computed figures of one payslip
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryBreakdown {
    pub base_salary: f64,
    pub working_days: i64,
    pub days_worked: f64,
    pub absent_days: f64,
    pub overtime_hours: f64,
    pub allowances: Allowances,
    pub deductions: Deductions,
    pub total_allowances: f64,
    pub total_deductions: f64,
    pub gross_salary: f64,
    pub net_salary: f64,
}

/// `value` as a Decimal, refused outside `0..=max` (NaN included)
fn bounded(value: f64, max: f64, field: &'static str) -> Result<Decimal, CalcError> {
    if !(0.0..=max).contains(&value) {
        return Err(CalcError::OutOfRange { field, max });
    }
    Decimal::from_f64(value).ok_or(CalcError::OutOfRange { field, max })
}

#[inline]
fn amount(value: f64, field: &'static str) -> Result<Decimal, CalcError> {
    bounded(value, MAX_AMOUNT, field)
}

#[inline]
fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[inline]
fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_default()
}

#[inline]
fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    round(amount * percent / Decimal::ONE_HUNDRED)
}

/// Compute a payslip from the pay structure and the month's attendance
///
/// Money inputs are capped at [`MAX_AMOUNT`] and percentages at 100, which
/// keeps every intermediate value far inside Decimal's range.
pub fn calculate(
    config: &StaffSalaryConfig,
    tally: &MonthlyTally,
    adjustments: &Adjustments,
) -> Result<SalaryBreakdown, CalcError> {
    let working_days = if (1..=31).contains(&config.standard_working_days) {
        config.standard_working_days
    } else {
        DEFAULT_WORKING_DAYS
    };
    let hours_per_day = if config.standard_hours_per_day > 0.0 {
        config.standard_hours_per_day
    } else {
        DEFAULT_HOURS_PER_DAY
    };
    let days = Decimal::from(working_days);
    let base = round(amount(config.base_salary.max(0.0), "base_salary")?);

    let counts = &tally.counts;
    let counted = Decimal::from(counts.present + counts.late + counts.on_leave + counts.holiday)
        + Decimal::from(counts.half_day) * Decimal::new(5, 1);
    let days_worked = counted.min(days);
    let absent_days = (days - days_worked).max(Decimal::ZERO);

    let earned_base = round(base * days_worked / days);
    let loss_of_pay = base - earned_base;

    // Overtime
    let overtime_hours = bounded(
        tally.overtime_hours.max(0.0),
        MAX_OVERTIME_HOURS,
        "overtime_hours",
    )?;
    let rate = if config.overtime_rate_per_hour > 0.0 {
        amount(config.overtime_rate_per_hour, "overtime_rate_per_hour")?
    } else {
        let hours = bounded(hours_per_day, 24.0, "standard_hours_per_day")?;
        let multiplier = bounded(config.overtime_multiplier, 5.0, "overtime_multiplier")?;
        base / (days * hours) * multiplier
    };

    let percent = |value: f64, field| bounded(value, MAX_PERCENT, field);

    let allowances = Allowances {
        hra: to_f64(percent_of(base, percent(config.hra_percent, "hra_percent")?)),
        da: to_f64(percent_of(base, percent(config.da_percent, "da_percent")?)),
        ta: to_f64(percent_of(base, percent(config.ta_percent, "ta_percent")?)),
        medical: to_f64(amount(config.medical_allowance, "medical_allowance")?),
        special: to_f64(amount(config.special_allowance, "special_allowance")?),
        overtime: to_f64(overtime_hours * rate),
        bonus: to_f64(amount(adjustments.bonus, "bonus")?),
    };

    let professional_tax = if days_worked.is_zero() {
        Decimal::ZERO
    } else {
        amount(config.professional_tax, "professional_tax")?
    };
    let deductions = Deductions {
        pf: to_f64(percent_of(earned_base, percent(config.pf_percent, "pf_percent")?)),
        esi: to_f64(percent_of(earned_base, percent(config.esi_percent, "esi_percent")?)),
        professional_tax: to_f64(professional_tax),
        tds: to_f64(percent_of(earned_base, percent(config.tds_percent, "tds_percent")?)),
        loss_of_pay: to_f64(loss_of_pay),
        advance: to_f64(amount(adjustments.advance, "advance")?),
        other: to_f64(amount(adjustments.other_deduction, "other_deduction")?),
    };

    let base_salary = to_f64(base);
    let (total_allowances, total_deductions, gross_salary, net_salary) =
        totals(base_salary, &allowances, &deductions)?;

    Ok(SalaryBreakdown {
        base_salary,
        working_days,
        days_worked: to_f64(days_worked),
        absent_days: to_f64(absent_days),
        overtime_hours: to_f64(overtime_hours),
        allowances,
        deductions,
        total_allowances,
        total_deductions,
        gross_salary,
        net_salary,
    })
}

#[inline]
fn component(value: f64) -> Result<Decimal, CalcError> {
    bounded(value, MAX_COMPONENT, "payslip component")
}

/// (total_allowances, total_deductions, gross, net)
fn totals(
    base: f64,
    allowances: &Allowances,
    deductions: &Deductions,
) -> Result<(f64, f64, f64, f64), CalcError> {
    let sum = |values: [f64; 7]| -> Result<Decimal, CalcError> {
        values
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, v| Ok(acc + component(v)?))
    };

    let total_allowances = sum([
        allowances.hra,
        allowances.da,
        allowances.ta,
        allowances.medical,
        allowances.special,
        allowances.overtime,
        allowances.bonus,
    ])?;
    let total_deductions = sum([
        deductions.pf,
        deductions.esi,
        deductions.professional_tax,
        deductions.tds,
        deductions.loss_of_pay,
        deductions.advance,
        deductions.other,
    ])?;

    let gross = component(base)? + total_allowances;
    let net = (gross - total_deductions).max(Decimal::ZERO);
    Ok((
        to_f64(total_allowances),
        to_f64(total_deductions),
        to_f64(gross),
        to_f64(net),
    ))
}

/// Re-derive the totals of a payslip from its components
pub fn recompute_totals(salary: &mut StaffSalary) -> Result<(), CalcError> {
    let (total_allowances, total_deductions, gross, net) =
        totals(salary.base_salary, &salary.allowances, &salary.deductions)?;
    salary.total_allowances = total_allowances;
    salary.total_deductions = total_deductions;
    salary.gross_salary = gross;
    salary.net_salary = net;
    Ok(())
}
