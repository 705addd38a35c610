//! Staff Salary (payslip) Repository

use super::{RepoError, RepoResult, ensure_affected};
use shared::models::{PaymentMethod, PayrollSummary, SalaryQuery, SalaryStatus, StaffSalary};
use crate::utils::round2;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, store_id, staff_id, month, year, base_salary, working_days, days_worked, present_days, absent_days, late_days, half_days, leave_days, holiday_days, overtime_hours, hra, da, ta, medical, special, overtime, bonus, pf, esi, professional_tax, tds, loss_of_pay, advance, other, total_allowances, total_deductions, gross_salary, net_salary, status, payment_date, payment_method, notes, generated_by, created_at, updated_at";

pub async fn find_in_store(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Option<StaffSalary>> {
    let sql = format!("SELECT {COLUMNS} FROM staff_salaries WHERE id = ? AND store_id = ?");
    let row = sqlx::query_as::<_, StaffSalary>(&sql)
        .bind(id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_period(
    pool: &SqlitePool,
    staff_id: i64,
    month: i64,
    year: i64,
) -> RepoResult<Option<StaffSalary>> {
    let sql = format!("SELECT {COLUMNS} FROM staff_salaries WHERE staff_id = ? AND month = ? AND year = ?");
    let row = sqlx::query_as::<_, StaffSalary>(&sql)
        .bind(staff_id)
        .bind(month)
        .bind(year)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert a payslip; a second one for the same (staff, month, year) is `Duplicate`
pub async fn create(pool: &SqlitePool, salary: &StaffSalary) -> RepoResult<StaffSalary> {
    insert(pool, salary).await?;
    find_in_store(pool, salary.store_id, salary.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create payslip".into()))
}

/// Swap a cancelled payslip for a new one of the same period in one transaction
///
/// `Conflict` when `cancelled_id` is no longer a cancelled payslip.
pub async fn replace_cancelled(
    pool: &SqlitePool,
    cancelled_id: i64,
    salary: &StaffSalary,
) -> RepoResult<StaffSalary> {
    let mut tx = pool.begin().await?;
    let rows = sqlx::query(
        "DELETE FROM staff_salaries WHERE id = ? AND store_id = ? AND status = 'cancelled'",
    )
    .bind(cancelled_id)
    .bind(salary.store_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if rows == 0 {
        return Err(RepoError::Conflict("Payslip is no longer cancelled".into()));
    }
    insert(&mut *tx, salary).await?;
    tx.commit().await?;

    find_in_store(pool, salary.store_id, salary.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to replace payslip".into()))
}

async fn insert<'e, E>(executor: E, salary: &StaffSalary) -> RepoResult<()>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO staff_salaries (id, store_id, staff_id, month, year, base_salary, working_days, days_worked, present_days, absent_days, late_days, half_days, leave_days, holiday_days, overtime_hours, hra, da, ta, medical, special, overtime, bonus, pf, esi, professional_tax, tds, loss_of_pay, advance, other, total_allowances, total_deductions, gross_salary, net_salary, status, payment_date, payment_method, notes, generated_by, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32, ?33, ?34, ?35, ?36, ?37, ?38, ?39, ?40)",
    )
    .bind(salary.id)
    .bind(salary.store_id)
    .bind(salary.staff_id)
    .bind(salary.month)
    .bind(salary.year)
    .bind(salary.base_salary)
    .bind(salary.working_days)
    .bind(salary.days_worked)
    .bind(salary.present_days)
    .bind(salary.absent_days)
    .bind(salary.late_days)
    .bind(salary.half_days)
    .bind(salary.leave_days)
    .bind(salary.holiday_days)
    .bind(salary.overtime_hours)
    .bind(salary.allowances.hra)
    .bind(salary.allowances.da)
    .bind(salary.allowances.ta)
    .bind(salary.allowances.medical)
    .bind(salary.allowances.special)
    .bind(salary.allowances.overtime)
    .bind(salary.allowances.bonus)
    .bind(salary.deductions.pf)
    .bind(salary.deductions.esi)
    .bind(salary.deductions.professional_tax)
    .bind(salary.deductions.tds)
    .bind(salary.deductions.loss_of_pay)
    .bind(salary.deductions.advance)
    .bind(salary.deductions.other)
    .bind(salary.total_allowances)
    .bind(salary.total_deductions)
    .bind(salary.gross_salary)
    .bind(salary.net_salary)
    .bind(salary.status)
    .bind(&salary.payment_date)
    .bind(salary.payment_method)
    .bind(&salary.notes)
    .bind(salary.generated_by)
    .bind(salary.created_at)
    .bind(salary.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Overwrite the figures of a draft payslip
///
/// Only drafts are touched; anything else is `Conflict`.
pub async fn save_draft(pool: &SqlitePool, salary: &StaffSalary) -> RepoResult<StaffSalary> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE staff_salaries SET base_salary = ?1, working_days = ?2, days_worked = ?3, present_days = ?4, absent_days = ?5, late_days = ?6, half_days = ?7, leave_days = ?8, holiday_days = ?9, overtime_hours = ?10, hra = ?11, da = ?12, ta = ?13, medical = ?14, special = ?15, overtime = ?16, bonus = ?17, pf = ?18, esi = ?19, professional_tax = ?20, tds = ?21, loss_of_pay = ?22, advance = ?23, other = ?24, total_allowances = ?25, total_deductions = ?26, gross_salary = ?27, net_salary = ?28, notes = ?29, generated_by = ?30, updated_at = ?31 \
         WHERE id = ?32 AND store_id = ?33 AND status = 'draft'",
    )
    .bind(salary.base_salary)
    .bind(salary.working_days)
    .bind(salary.days_worked)
    .bind(salary.present_days)
    .bind(salary.absent_days)
    .bind(salary.late_days)
    .bind(salary.half_days)
    .bind(salary.leave_days)
    .bind(salary.holiday_days)
    .bind(salary.overtime_hours)
    .bind(salary.allowances.hra)
    .bind(salary.allowances.da)
    .bind(salary.allowances.ta)
    .bind(salary.allowances.medical)
    .bind(salary.allowances.special)
    .bind(salary.allowances.overtime)
    .bind(salary.allowances.bonus)
    .bind(salary.deductions.pf)
    .bind(salary.deductions.esi)
    .bind(salary.deductions.professional_tax)
    .bind(salary.deductions.tds)
    .bind(salary.deductions.loss_of_pay)
    .bind(salary.deductions.advance)
    .bind(salary.deductions.other)
    .bind(salary.total_allowances)
    .bind(salary.total_deductions)
    .bind(salary.gross_salary)
    .bind(salary.net_salary)
    .bind(&salary.notes)
    .bind(salary.generated_by)
    .bind(now)
    .bind(salary.id)
    .bind(salary.store_id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(RepoError::Conflict("Only draft payslips can be changed".into()));
    }
    find_in_store(pool, salary.store_id, salary.id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Salary".into()))
}

/// Move a payslip from `current` to `next`; fails with `Conflict` if it moved meanwhile
pub async fn transition(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    current: SalaryStatus,
    next: SalaryStatus,
    payment: Option<(PaymentMethod, String)>,
) -> RepoResult<StaffSalary> {
    let now = shared::util::now_millis();
    let (method, date) = payment.unzip();
    let rows = sqlx::query(
        "UPDATE staff_salaries SET status = ?1, payment_method = COALESCE(?2, payment_method), payment_date = COALESCE(?3, payment_date), updated_at = ?4 WHERE id = ?5 AND store_id = ?6 AND status = ?7",
    )
    .bind(next)
    .bind(method)
    .bind(date)
    .bind(now)
    .bind(id)
    .bind(store_id)
    .bind(current)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(RepoError::Conflict(format!(
            "Payslip is no longer {}",
            current.as_str()
        )));
    }
    find_in_store(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Salary".into()))
}

pub async fn delete_draft(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM staff_salaries WHERE id = ? AND store_id = ? AND status = 'draft'")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?
        .rows_affected();
    ensure_affected(rows, "Draft salary")
}

pub async fn list(
    pool: &SqlitePool,
    store_id: i64,
    query: &SalaryQuery,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<StaffSalary>, i64)> {
    const FILTER: &str = "store_id = ?1 AND (?2 IS NULL OR month = ?2) AND (?3 IS NULL OR year = ?3) AND (?4 IS NULL OR status = ?4) AND (?5 IS NULL OR staff_id = ?5)";

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM staff_salaries WHERE {FILTER}"))
        .bind(store_id)
        .bind(query.month)
        .bind(query.year)
        .bind(query.status)
        .bind(query.staff_id)
        .fetch_one(pool)
        .await?;

    let sql = format!(
        "SELECT {COLUMNS} FROM staff_salaries WHERE {FILTER} ORDER BY year DESC, month DESC, created_at DESC LIMIT ?6 OFFSET ?7"
    );
    let items = sqlx::query_as::<_, StaffSalary>(&sql)
        .bind(store_id)
        .bind(query.month)
        .bind(query.year)
        .bind(query.status)
        .bind(query.staff_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok((items, total))
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    total: i64,
    draft: i64,
    approved: i64,
    paid: i64,
    cancelled: i64,
    total_gross: f64,
    total_deductions: f64,
    total_net: f64,
}

/// Status counts and money totals for a period; cancelled payslips carry no money
pub async fn summary(pool: &SqlitePool, store_id: i64, month: i64, year: i64) -> RepoResult<PayrollSummary> {
    let row = sqlx::query_as::<_, SummaryRow>(
        "SELECT COUNT(*) AS total, \
         COALESCE(SUM(CASE WHEN status = 'draft' THEN 1 ELSE 0 END), 0) AS draft, \
         COALESCE(SUM(CASE WHEN status = 'approved' THEN 1 ELSE 0 END), 0) AS approved, \
         COALESCE(SUM(CASE WHEN status = 'paid' THEN 1 ELSE 0 END), 0) AS paid, \
         COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0) AS cancelled, \
         COALESCE(SUM(CASE WHEN status != 'cancelled' THEN gross_salary ELSE 0.0 END), 0.0) AS total_gross, \
         COALESCE(SUM(CASE WHEN status != 'cancelled' THEN total_deductions ELSE 0.0 END), 0.0) AS total_deductions, \
         COALESCE(SUM(CASE WHEN status != 'cancelled' THEN net_salary ELSE 0.0 END), 0.0) AS total_net \
         FROM staff_salaries WHERE store_id = ?1 AND month = ?2 AND year = ?3",
    )
    .bind(store_id)
    .bind(month)
    .bind(year)
    .fetch_one(pool)
    .await?;

    Ok(PayrollSummary {
        month,
        year,
        total: row.total,
        draft: row.draft,
        approved: row.approved,
        paid: row.paid,
        cancelled: row.cancelled,
        total_gross: round2(row.total_gross),
        total_deductions: round2(row.total_deductions),
        total_net: round2(row.total_net),
    })
}
