//! Payroll: payslip generation and lifecycle
//!
//! A payslip is generated as a draft from the month's attendance and the
//! staff member's salary config, adjusted while still a draft, then moved
//! through approved → paid (or cancelled). Lifecycle writes are guarded on
//! the current status so concurrent moves cannot both succeed.

pub mod calculator;

pub use calculator::{Adjustments, CalcError, SalaryBreakdown, calculate, recompute_totals};

use shared::error::ErrorCode;
use shared::models::{
    BulkSalaryGenerate, MarkPaid, PayrollSummary, SalaryAdjustment, SalaryGenerate, SalaryStatus,
    Staff, StaffSalary, StaffSalaryConfig, Store,
};
use shared::types::BulkResult;
use sqlx::SqlitePool;

use crate::db::repository::{
    RepoError, salary as salary_repo, salary_config as config_repo, staff as staff_repo,
};
use crate::services::{attendance, staff::load_staff};
use crate::utils::time::{format_date, is_future_month, month_bounds, parse_date, store_tz, today};
use crate::utils::{AppError, AppResult};

pub const MIN_PAY_YEAR: i64 = 2000;
pub const MAX_PAY_YEAR: i64 = 2100;

/// Month 1-12, year 2000-2100 and not after the store's current month
pub fn validate_period(store: &Store, month: i64, year: i64) -> AppResult<(u32, i32)> {
    if !(1..=12).contains(&month) {
        return Err(AppError::with_message(
            ErrorCode::InvalidPayPeriod,
            format!("Invalid month {month}"),
        )
        .with_detail("field", "month"));
    }
    if !(MIN_PAY_YEAR..=MAX_PAY_YEAR).contains(&year) {
        return Err(AppError::with_message(
            ErrorCode::InvalidPayPeriod,
            format!("Year must be between {MIN_PAY_YEAR} and {MAX_PAY_YEAR}"),
        )
        .with_detail("field", "year"));
    }
    let (month, year) = (month as u32, year as i32);
    if is_future_month(year, month, store_tz(&store.settings.timezone)) {
        return Err(AppError::with_message(
            ErrorCode::InvalidPayPeriod,
            format!("Cannot generate payroll for future period {year}-{month:02}"),
        ));
    }
    Ok((month, year))
}

fn not_found() -> AppError {
    AppError::new(ErrorCode::SalaryNotFound)
}

fn already_generated(staff: &Staff, month: i64, year: i64) -> AppError {
    AppError::with_message(
        ErrorCode::SalaryAlreadyGenerated,
        format!(
            "Salary for {} already generated for {year}-{month:02}",
            staff.employee_id
        ),
    )
    .with_detail("staff_id", staff.id)
}

fn not_editable(status: SalaryStatus) -> AppError {
    AppError::with_message(
        ErrorCode::SalaryNotEditable,
        format!("Payslip is {} and can no longer be changed", status.as_str()),
    )
}

pub async fn load(pool: &SqlitePool, store_id: i64, id: i64) -> AppResult<StaffSalary> {
    salary_repo::find_in_store(pool, store_id, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(not_found)
}

/// Build a draft payslip from computed figures
fn draft_payslip(
    store_id: i64,
    staff_id: i64,
    (month, year): (i64, i64),
    tally: &shared::models::MonthlyTally,
    breakdown: SalaryBreakdown,
    notes: Option<String>,
    generated_by: i64,
) -> StaffSalary {
    let now = shared::util::now_millis();
    StaffSalary {
        id: shared::util::snowflake_id(),
        store_id,
        staff_id,
        month,
        year,
        base_salary: breakdown.base_salary,
        working_days: breakdown.working_days,
        days_worked: breakdown.days_worked,
        present_days: tally.counts.present,
        absent_days: breakdown.absent_days,
        late_days: tally.counts.late,
        half_days: tally.counts.half_day,
        leave_days: tally.counts.on_leave,
        holiday_days: tally.counts.holiday,
        overtime_hours: breakdown.overtime_hours,
        allowances: breakdown.allowances,
        deductions: breakdown.deductions,
        total_allowances: breakdown.total_allowances,
        total_deductions: breakdown.total_deductions,
        gross_salary: breakdown.gross_salary,
        net_salary: breakdown.net_salary,
        status: SalaryStatus::Draft,
        payment_date: None,
        payment_method: None,
        notes,
        generated_by,
        created_at: now,
        updated_at: now,
    }
}

/// Compute and store the payslip of one staff member
///
/// With `regenerate`, a draft is recomputed in place and a cancelled payslip
/// is replaced by a new draft. `adjustments` of `None` keeps the adjustments
/// of a draft being regenerated.
async fn generate_for_staff(
    pool: &SqlitePool,
    store: &Store,
    staff: &Staff,
    (month, year): (u32, i32),
    adjustments: Option<(Adjustments, Option<String>)>,
    regenerate: bool,
    generated_by: i64,
) -> AppResult<StaffSalary> {
    let period = (month as i64, year as i64);
    let existing = salary_repo::find_by_period(pool, staff.id, period.0, period.1)
        .await
        .map_err(AppError::from)?;
    let replacing = match existing {
        Some(e)
            if regenerate
                && matches!(e.status, SalaryStatus::Draft | SalaryStatus::Cancelled) =>
        {
            Some(e)
        }
        Some(_) => return Err(already_generated(staff, period.0, period.1)),
        None => None,
    };

    let (first, _) = month_bounds(year, month)?;
    let tally = attendance::monthly_tally(pool, staff.id, month, year).await?;
    let config = config_repo::find_by_staff(pool, store.id, staff.id)
        .await
        .map_err(AppError::from)?
        .unwrap_or_else(|| {
            StaffSalaryConfig::fallback(store.id, staff.id, staff.salary, format_date(first))
        });

    let (adjustments, notes) = match (adjustments, &replacing) {
        (Some(given), _) => given,
        (None, Some(draft)) if draft.status == SalaryStatus::Draft => (
            Adjustments {
                bonus: draft.allowances.bonus,
                advance: draft.deductions.advance,
                other_deduction: draft.deductions.other,
            },
            draft.notes.clone(),
        ),
        (None, _) => (Adjustments::default(), None),
    };

    let breakdown = calculate(&config, &tally, &adjustments)?;
    let mut payslip = draft_payslip(
        store.id,
        staff.id,
        period,
        &tally,
        breakdown,
        notes,
        generated_by,
    );

    let saved = match replacing {
        Some(cancelled) if cancelled.status == SalaryStatus::Cancelled => {
            salary_repo::replace_cancelled(pool, cancelled.id, &payslip)
                .await
                .map_err(|e| match e {
                    RepoError::Conflict(_) | RepoError::Duplicate(_) => {
                        already_generated(staff, period.0, period.1)
                    }
                    other => other.into(),
                })?
        }
        Some(draft) => {
            payslip.id = draft.id;
            payslip.created_at = draft.created_at;
            salary_repo::save_draft(pool, &payslip)
                .await
                .map_err(|e| match e {
                    RepoError::Conflict(_) => already_generated(staff, period.0, period.1),
                    other => other.into(),
                })?
        }
        None => salary_repo::create(pool, &payslip)
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => already_generated(staff, period.0, period.1),
                other => other.into(),
            })?,
    };

    tracing::info!(
        store_id = store.id,
        staff_id = staff.id,
        salary_id = saved.id,
        period = %format!("{year}-{month:02}"),
        net = saved.net_salary,
        "Payslip generated"
    );
    Ok(saved)
}

pub async fn generate(
    pool: &SqlitePool,
    store: &Store,
    data: SalaryGenerate,
    generated_by: i64,
) -> AppResult<StaffSalary> {
    let period = validate_period(store, data.month, data.year)?;
    let staff = load_staff(pool, store.id, data.staff_id).await?;
    let adjustments = Adjustments {
        bonus: data.bonus,
        advance: data.advance,
        other_deduction: data.other_deduction,
    };
    generate_for_staff(
        pool,
        store,
        &staff,
        period,
        Some((adjustments, data.notes)),
        data.regenerate,
        generated_by,
    )
    .await
}

/// Payslips for every active staff member; failures do not roll back others
pub async fn bulk_generate(
    pool: &SqlitePool,
    store: &Store,
    data: BulkSalaryGenerate,
    generated_by: i64,
) -> AppResult<BulkResult<StaffSalary>> {
    let period = validate_period(store, data.month, data.year)?;
    let staff = staff_repo::list_active(pool, store.id)
        .await
        .map_err(AppError::from)?;

    let mut result = BulkResult::default();
    for member in &staff {
        match generate_for_staff(pool, store, member, period, None, data.regenerate, generated_by)
            .await
        {
            Ok(payslip) => result.push_ok(payslip),
            Err(e) => result.push_err(member.id, e.message),
        }
    }

    tracing::info!(
        store_id = store.id,
        succeeded = result.succeeded.len(),
        failed = result.failed.len(),
        "Bulk payroll generated"
    );
    Ok(result)
}

/// Change bonus, advance, other deduction or notes of a draft
pub async fn update_adjustments(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    data: SalaryAdjustment,
    updated_by: i64,
) -> AppResult<StaffSalary> {
    let mut salary = load(pool, store_id, id).await?;
    if salary.status != SalaryStatus::Draft {
        return Err(not_editable(salary.status));
    }

    if let Some(bonus) = data.bonus {
        salary.allowances.bonus = bonus;
    }
    if let Some(advance) = data.advance {
        salary.deductions.advance = advance;
    }
    if let Some(other) = data.other_deduction {
        salary.deductions.other = other;
    }
    if data.notes.is_some() {
        salary.notes = data.notes;
    }
    salary.generated_by = updated_by;
    recompute_totals(&mut salary)?;

    salary_repo::save_draft(pool, &salary)
        .await
        .map_err(|e| match e {
            RepoError::Conflict(_) => AppError::new(ErrorCode::SalaryNotEditable),
            other => other.into(),
        })
}

async fn transition(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    next: SalaryStatus,
    payment: Option<(shared::models::PaymentMethod, String)>,
) -> AppResult<StaffSalary> {
    let salary = load(pool, store_id, id).await?;
    let invalid = || {
        AppError::with_message(
            ErrorCode::InvalidSalaryTransition,
            format!(
                "Cannot move payslip from {} to {}",
                salary.status.as_str(),
                next.as_str()
            ),
        )
    };
    if !salary.status.can_transition_to(next) {
        return Err(invalid());
    }

    let updated = salary_repo::transition(pool, store_id, id, salary.status, next, payment)
        .await
        .map_err(|e| match e {
            RepoError::Conflict(_) => invalid(),
            other => other.into(),
        })?;
    tracing::info!(store_id, salary_id = id, status = next.as_str(), "Payslip status changed");
    Ok(updated)
}

pub async fn approve(pool: &SqlitePool, store_id: i64, id: i64) -> AppResult<StaffSalary> {
    transition(pool, store_id, id, SalaryStatus::Approved, None).await
}

/// Record payment of an approved payslip; the date defaults to today in the store's timezone
pub async fn mark_paid(pool: &SqlitePool, store: &Store, id: i64, data: MarkPaid) -> AppResult<StaffSalary> {
    let date = match data.payment_date {
        Some(d) => parse_date(&d).map_err(|e| e.with_detail("field", "payment_date"))?,
        None => today(store_tz(&store.settings.timezone)),
    };
    transition(
        pool,
        store.id,
        id,
        SalaryStatus::Paid,
        Some((data.payment_method, format_date(date))),
    )
    .await
}

pub async fn cancel(pool: &SqlitePool, store_id: i64, id: i64) -> AppResult<StaffSalary> {
    transition(pool, store_id, id, SalaryStatus::Cancelled, None).await
}

/// Delete a draft payslip
pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> AppResult<()> {
    let salary = load(pool, store_id, id).await?;
    if salary.status != SalaryStatus::Draft {
        return Err(not_editable(salary.status));
    }
    match salary_repo::delete_draft(pool, store_id, id).await {
        Ok(()) => Ok(()),
        Err(RepoError::NotFound(_)) => Err(AppError::new(ErrorCode::SalaryNotEditable)),
        Err(e) => Err(e.into()),
    }
}

pub async fn summary(pool: &SqlitePool, store: &Store, month: i64, year: i64) -> AppResult<PayrollSummary> {
    if !(1..=12).contains(&month) || !(MIN_PAY_YEAR..=MAX_PAY_YEAR).contains(&year) {
        return Err(AppError::with_message(
            ErrorCode::InvalidPayPeriod,
            format!("Invalid period {year}-{month:02}"),
        ));
    }
    salary_repo::summary(pool, store.id, month, year)
        .await
        .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;
    use shared::models::{AttendanceMark, AttendanceStatus, PaymentMethod, SalaryConfigInput};

    fn request(staff_id: i64) -> SalaryGenerate {
        SalaryGenerate {
            staff_id,
            month: 1,
            year: 2024,
            bonus: 0.0,
            advance: 0.0,
            other_deduction: 0.0,
            notes: None,
            regenerate: false,
        }
    }

    async fn mark_days(pool: &SqlitePool, store: &Store, staff_id: i64, days: u32) {
        for day in 1..=days {
            attendance::mark(
                pool,
                store,
                AttendanceMark {
                    staff_id,
                    date: format!("2024-01-{day:02}"),
                    status: AttendanceStatus::Present,
                    check_in: None,
                    check_out: None,
                    notes: None,
                },
                1,
            )
            .await
            .unwrap();
        }
    }

    #[test]
    fn test_validate_period() {
        let store = test_store();
        assert!(validate_period(&store, 1, 2024).is_ok());
        assert_eq!(
            validate_period(&store, 13, 2024).unwrap_err().code,
            ErrorCode::InvalidPayPeriod
        );
        assert!(validate_period(&store, 1, 1999).is_err());
        assert!(validate_period(&store, 1, 2100).is_err());
    }

    fn test_store() -> Store {
        Store {
            id: 1,
            owner_id: 1,
            name: "Test".into(),
            code: "SC000001".into(),
            description: None,
            address: Default::default(),
            phone: None,
            email: None,
            license_number: "L-1".into(),
            gst_number: None,
            settings: Default::default(),
            manager_id: None,
            staff_count: 0,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn test_generate_uses_attendance_and_fallback_config() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "pay1@example.com").await;
        let store = test_support::store(&pool, owner.id, "PY-1").await;
        let staff = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        mark_days(&pool, &store, staff.id, 13).await;

        let payslip = generate(&pool, &store, request(staff.id), owner.id).await.unwrap();
        assert_eq!(payslip.status, SalaryStatus::Draft);
        assert_eq!(payslip.present_days, 13);
        assert_eq!(payslip.days_worked, 13.0);
        assert_eq!(payslip.deductions.loss_of_pay, 13000.0);
        assert_eq!(payslip.net_salary, 13000.0);
        assert_eq!(
            payslip.net_salary,
            payslip.gross_salary - payslip.total_deductions
        );

        let err = generate(&pool, &store, request(staff.id), owner.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SalaryAlreadyGenerated);
    }

    #[tokio::test]
    async fn test_regenerate_replaces_draft_with_new_config() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "pay2@example.com").await;
        let store = test_support::store(&pool, owner.id, "PY-2").await;
        let staff = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        let first = generate(&pool, &store, request(staff.id), owner.id).await.unwrap();

        config_repo::upsert(
            &pool,
            store.id,
            staff.id,
            &SalaryConfigInput {
                base_salary: 30000.0,
                hra_percent: 0.0,
                da_percent: 0.0,
                ta_percent: 0.0,
                medical_allowance: 500.0,
                special_allowance: 0.0,
                pf_percent: 0.0,
                esi_percent: 0.0,
                professional_tax: 0.0,
                tds_percent: 0.0,
                overtime_rate_per_hour: 0.0,
                overtime_multiplier: 1.5,
                standard_working_days: 26,
                standard_hours_per_day: 8.0,
                effective_from: None,
            },
            "2024-01-01",
        )
        .await
        .unwrap();

        let again = generate(
            &pool,
            &store,
            SalaryGenerate {
                regenerate: true,
                ..request(staff.id)
            },
            owner.id,
        )
        .await
        .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.base_salary, 30000.0);
        assert_eq!(again.allowances.medical, 500.0);

        approve(&pool, store.id, first.id).await.unwrap();
        let err = generate(
            &pool,
            &store,
            SalaryGenerate {
                regenerate: true,
                ..request(staff.id)
            },
            owner.id,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::SalaryAlreadyGenerated);
    }

    #[tokio::test]
    async fn test_adjustments_only_on_drafts() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "pay3@example.com").await;
        let store = test_support::store(&pool, owner.id, "PY-3").await;
        let staff = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        mark_days(&pool, &store, staff.id, 26).await;
        let payslip = generate(&pool, &store, request(staff.id), owner.id).await.unwrap();
        assert_eq!(payslip.net_salary, 26000.0);

        let adjusted = update_adjustments(
            &pool,
            store.id,
            payslip.id,
            SalaryAdjustment {
                bonus: Some(1000.0),
                advance: Some(2500.0),
                ..Default::default()
            },
            owner.id,
        )
        .await
        .unwrap();
        assert_eq!(adjusted.gross_salary, 27000.0);
        assert_eq!(adjusted.total_deductions, 2500.0);
        assert_eq!(adjusted.net_salary, 24500.0);

        approve(&pool, store.id, payslip.id).await.unwrap();
        let err = update_adjustments(&pool, store.id, payslip.id, SalaryAdjustment::default(), owner.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SalaryNotEditable);
        let err = delete(&pool, store.id, payslip.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SalaryNotEditable);
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "pay4@example.com").await;
        let store = test_support::store(&pool, owner.id, "PY-4").await;
        let staff = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        let payslip = generate(&pool, &store, request(staff.id), owner.id).await.unwrap();

        let pay = || MarkPaid {
            payment_method: PaymentMethod::BankTransfer,
            payment_date: Some("2024-02-01".into()),
        };
        let err = mark_paid(&pool, &store, payslip.id, pay()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSalaryTransition);

        approve(&pool, store.id, payslip.id).await.unwrap();
        let paid = mark_paid(&pool, &store, payslip.id, pay()).await.unwrap();
        assert_eq!(paid.status, SalaryStatus::Paid);
        assert_eq!(paid.payment_date.as_deref(), Some("2024-02-01"));
        assert_eq!(paid.payment_method, Some(PaymentMethod::BankTransfer));

        let err = cancel(&pool, store.id, payslip.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSalaryTransition);
    }

    #[tokio::test]
    async fn test_regenerate_replaces_cancelled_payslip() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "pay6@example.com").await;
        let store = test_support::store(&pool, owner.id, "PY-6").await;
        let staff = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        let first = generate(&pool, &store, request(staff.id), owner.id).await.unwrap();
        cancel(&pool, store.id, first.id).await.unwrap();

        let err = generate(&pool, &store, request(staff.id), owner.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SalaryAlreadyGenerated);

        mark_days(&pool, &store, staff.id, 26).await;
        let fresh = generate(
            &pool,
            &store,
            SalaryGenerate {
                regenerate: true,
                ..request(staff.id)
            },
            owner.id,
        )
        .await
        .unwrap();
        assert_ne!(fresh.id, first.id);
        assert_eq!(fresh.status, SalaryStatus::Draft);
        assert_eq!(fresh.net_salary, 26000.0);

        let err = load(&pool, store.id, first.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SalaryNotFound);
    }

    #[tokio::test]
    async fn test_bulk_generate_and_summary() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "pay5@example.com").await;
        let store = test_support::store(&pool, owner.id, "PY-5").await;
        let a = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        let b = test_support::staff(&pool, store.id, "PHM002", "b@x.com").await;
        generate(&pool, &store, request(a.id), owner.id).await.unwrap();

        let result = bulk_generate(
            &pool,
            &store,
            BulkSalaryGenerate {
                month: 1,
                year: 2024,
                regenerate: false,
            },
            owner.id,
        )
        .await
        .unwrap();
        assert_eq!(result.succeeded.len(), 1);
        assert_eq!(result.succeeded[0].staff_id, b.id);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].key, a.id.to_string());

        let (list, _) = salary_repo::list(&pool, store.id, &Default::default(), 0, 10)
            .await
            .unwrap();
        cancel(&pool, store.id, list[0].id).await.unwrap();

        let summary = summary(&pool, &store, 1, 2024).await.unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.draft, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.total_net, 0.0);
    }
}
