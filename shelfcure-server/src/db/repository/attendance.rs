//! Staff Attendance Repository

use super::{RepoError, RepoResult, ensure_affected};
use shared::models::{
    AttendanceStatus, AttendanceWithStaff, MonthlyTally, StaffAttendance, StaffAttendanceSummary,
    StatusCounts,
};
use crate::utils::round2;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, store_id, staff_id, date, status, check_in, check_out, working_hours, overtime_hours, notes, marked_by, created_at, updated_at";

const JOINED_COLUMNS: &str = "a.id, a.store_id, a.staff_id, a.date, a.status, a.check_in, a.check_out, a.working_hours, a.overtime_hours, a.notes, a.marked_by, a.created_at, a.updated_at, s.name AS staff_name, s.employee_id AS employee_id";

const COUNT_COLUMNS: &str = "COALESCE(SUM(CASE WHEN a.status = 'present' THEN 1 ELSE 0 END), 0) AS present, COALESCE(SUM(CASE WHEN a.status = 'absent' THEN 1 ELSE 0 END), 0) AS absent, COALESCE(SUM(CASE WHEN a.status = 'late' THEN 1 ELSE 0 END), 0) AS late, COALESCE(SUM(CASE WHEN a.status = 'half_day' THEN 1 ELSE 0 END), 0) AS half_day, COALESCE(SUM(CASE WHEN a.status = 'on_leave' THEN 1 ELSE 0 END), 0) AS on_leave, COALESCE(SUM(CASE WHEN a.status = 'holiday' THEN 1 ELSE 0 END), 0) AS holiday";

/// Values written on mark/update; hours are derived by the caller
#[derive(Debug, Clone)]
pub struct AttendanceWrite {
    pub status: AttendanceStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub working_hours: f64,
    pub overtime_hours: f64,
    pub notes: Option<String>,
}

/// Resolved list filters (dates inclusive)
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    pub staff_id: Option<i64>,
    pub status: Option<AttendanceStatus>,
}

pub async fn find_in_store(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
) -> RepoResult<Option<StaffAttendance>> {
    let sql = format!("SELECT {COLUMNS} FROM staff_attendance WHERE id = ? AND store_id = ?");
    let row = sqlx::query_as::<_, StaffAttendance>(&sql)
        .bind(id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_staff_date(
    pool: &SqlitePool,
    staff_id: i64,
    date: &str,
) -> RepoResult<Option<StaffAttendance>> {
    let sql = format!("SELECT {COLUMNS} FROM staff_attendance WHERE staff_id = ? AND date = ?");
    let row = sqlx::query_as::<_, StaffAttendance>(&sql)
        .bind(staff_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert a record; a second record for the same (staff, date) is `Duplicate`
pub async fn create(
    pool: &SqlitePool,
    store_id: i64,
    staff_id: i64,
    date: &str,
    data: &AttendanceWrite,
    marked_by: i64,
) -> RepoResult<StaffAttendance> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO staff_attendance (id, store_id, staff_id, date, status, check_in, check_out, working_hours, overtime_hours, notes, marked_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(store_id)
    .bind(staff_id)
    .bind(date)
    .bind(data.status)
    .bind(&data.check_in)
    .bind(&data.check_out)
    .bind(data.working_hours)
    .bind(data.overtime_hours)
    .bind(&data.notes)
    .bind(marked_by)
    .bind(now)
    .execute(pool)
    .await?;

    find_in_store(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to mark attendance".into()))
}

pub async fn update(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    data: &AttendanceWrite,
    marked_by: i64,
) -> RepoResult<StaffAttendance> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE staff_attendance SET status = ?1, check_in = ?2, check_out = ?3, working_hours = ?4, overtime_hours = ?5, notes = ?6, marked_by = ?7, updated_at = ?8 WHERE id = ?9 AND store_id = ?10",
    )
    .bind(data.status)
    .bind(&data.check_in)
    .bind(&data.check_out)
    .bind(data.working_hours)
    .bind(data.overtime_hours)
    .bind(&data.notes)
    .bind(marked_by)
    .bind(now)
    .bind(id)
    .bind(store_id)
    .execute(pool)
    .await?
    .rows_affected();
    ensure_affected(rows, "Attendance")?;

    find_in_store(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Attendance".into()))
}

pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM staff_attendance WHERE id = ? AND store_id = ?")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?
        .rows_affected();
    ensure_affected(rows, "Attendance")
}

/// Page of records joined with staff identity, newest date first
pub async fn list(
    pool: &SqlitePool,
    store_id: i64,
    filter: &AttendanceFilter,
    offset: i64,
    limit: i64,
) -> RepoResult<(Vec<AttendanceWithStaff>, i64)> {
    const FILTER: &str = "a.store_id = ?1 AND (?2 IS NULL OR a.date >= ?2) AND (?3 IS NULL OR a.date <= ?3) AND (?4 IS NULL OR a.staff_id = ?4) AND (?5 IS NULL OR a.status = ?5)";

    let (total,): (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM staff_attendance a WHERE {FILTER}"
    ))
    .bind(store_id)
    .bind(&filter.from)
    .bind(&filter.to)
    .bind(filter.staff_id)
    .bind(filter.status)
    .fetch_one(pool)
    .await?;

    let sql = format!(
        "SELECT {JOINED_COLUMNS} FROM staff_attendance a JOIN staff s ON s.id = a.staff_id WHERE {FILTER} ORDER BY a.date DESC, s.employee_id LIMIT ?6 OFFSET ?7"
    );
    let items = sqlx::query_as::<_, AttendanceWithStaff>(&sql)
        .bind(store_id)
        .bind(&filter.from)
        .bind(&filter.to)
        .bind(filter.staff_id)
        .bind(filter.status)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok((items, total))
}

#[derive(Debug, sqlx::FromRow)]
struct TotalsRow {
    #[sqlx(flatten)]
    counts: StatusCounts,
    working_hours: f64,
    overtime_hours: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct StaffTotalsRow {
    staff_id: i64,
    staff_name: String,
    employee_id: String,
    #[sqlx(flatten)]
    counts: StatusCounts,
    working_hours: f64,
    overtime_hours: f64,
}

/// Status counts and hour totals over an inclusive date range
pub async fn totals(
    pool: &SqlitePool,
    store_id: i64,
    from: &str,
    to: &str,
    staff_id: Option<i64>,
) -> RepoResult<(StatusCounts, f64, f64)> {
    let sql = format!(
        "SELECT {COUNT_COLUMNS}, COALESCE(SUM(a.working_hours), 0.0) AS working_hours, COALESCE(SUM(a.overtime_hours), 0.0) AS overtime_hours FROM staff_attendance a WHERE a.store_id = ?1 AND a.date >= ?2 AND a.date <= ?3 AND (?4 IS NULL OR a.staff_id = ?4)"
    );
    let row = sqlx::query_as::<_, TotalsRow>(&sql)
        .bind(store_id)
        .bind(from)
        .bind(to)
        .bind(staff_id)
        .fetch_one(pool)
        .await?;
    Ok((row.counts, row.working_hours, row.overtime_hours))
}

/// Per-staff breakdown over an inclusive date range
pub async fn totals_per_staff(
    pool: &SqlitePool,
    store_id: i64,
    from: &str,
    to: &str,
    staff_id: Option<i64>,
) -> RepoResult<Vec<StaffAttendanceSummary>> {
    let sql = format!(
        "SELECT a.staff_id, s.name AS staff_name, s.employee_id, {COUNT_COLUMNS}, COALESCE(SUM(a.working_hours), 0.0) AS working_hours, COALESCE(SUM(a.overtime_hours), 0.0) AS overtime_hours FROM staff_attendance a JOIN staff s ON s.id = a.staff_id WHERE a.store_id = ?1 AND a.date >= ?2 AND a.date <= ?3 AND (?4 IS NULL OR a.staff_id = ?4) GROUP BY a.staff_id, s.name, s.employee_id ORDER BY s.employee_id"
    );
    let rows = sqlx::query_as::<_, StaffTotalsRow>(&sql)
        .bind(store_id)
        .bind(from)
        .bind(to)
        .bind(staff_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| StaffAttendanceSummary {
            staff_id: row.staff_id,
            staff_name: row.staff_name,
            employee_id: row.employee_id,
            attendance_percentage: row.counts.attendance_percentage(),
            counts: row.counts,
            working_hours: round2(row.working_hours),
            overtime_hours: round2(row.overtime_hours),
        })
        .collect())
}

/// One staff member's counts and overtime for a pay period
pub async fn monthly_tally(
    pool: &SqlitePool,
    staff_id: i64,
    from: &str,
    to: &str,
) -> RepoResult<MonthlyTally> {
    let sql = format!(
        "SELECT {COUNT_COLUMNS}, COALESCE(SUM(a.working_hours), 0.0) AS working_hours, COALESCE(SUM(a.overtime_hours), 0.0) AS overtime_hours FROM staff_attendance a WHERE a.staff_id = ?1 AND a.date >= ?2 AND a.date <= ?3"
    );
    let row = sqlx::query_as::<_, TotalsRow>(&sql)
        .bind(staff_id)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await?;
    Ok(MonthlyTally {
        counts: row.counts,
        overtime_hours: round2(row.overtime_hours),
    })
}
