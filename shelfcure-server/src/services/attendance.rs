//! Attendance rules
//!
//! Dates are checked against the staff member's joining date and "today" in
//! the store's timezone. Working hours come from check-in/check-out; anything
//! beyond the staff member's standard day counts as overtime.

use chrono::NaiveDate;
use shared::error::ErrorCode;
use shared::models::{
    AttendanceMark, AttendanceQuery, AttendanceStatus, AttendanceSummary, AttendanceSummaryQuery,
    AttendanceUpdate, BulkAttendance, DEFAULT_HOURS_PER_DAY, DailyOverview, MonthlyTally, Staff,
    StaffAttendance, StaffStatus, Store,
};
use shared::types::BulkResult;
use sqlx::SqlitePool;

use crate::db::repository::attendance::{AttendanceFilter, AttendanceWrite};
use crate::db::repository::{
    RepoError, attendance as attendance_repo, salary_config as config_repo, staff as staff_repo,
};
use crate::services::staff::load_staff;
use crate::utils::time::{
    format_date, hours_between, month_bounds, parse_date, parse_time, store_tz, today,
};
use crate::utils::{AppError, AppResult, round2};

/// Standard working hours of a staff member per day
async fn standard_hours(pool: &SqlitePool, staff: &Staff) -> AppResult<f64> {
    let config = config_repo::find_by_staff(pool, staff.store_id, staff.id)
        .await
        .map_err(AppError::from)?;
    Ok(config
        .map(|c| c.standard_hours_per_day)
        .filter(|h| *h > 0.0)
        .unwrap_or(DEFAULT_HOURS_PER_DAY))
}

/// Derive the stored values of a record
///
/// Check times only apply to worked statuses; other statuses clear them.
pub fn derive_hours(
    status: AttendanceStatus,
    check_in: Option<String>,
    check_out: Option<String>,
    notes: Option<String>,
    standard_hours: f64,
) -> AppResult<AttendanceWrite> {
    if !status.is_worked() {
        return Ok(AttendanceWrite {
            status,
            check_in: None,
            check_out: None,
            working_hours: 0.0,
            overtime_hours: 0.0,
            notes,
        });
    }

    let parsed_in = check_in.as_deref().map(parse_time).transpose()?;
    let parsed_out = check_out.as_deref().map(parse_time).transpose()?;

    let working_hours = match (parsed_in, parsed_out) {
        (Some(t_in), Some(t_out)) => hours_between(t_in, t_out).ok_or_else(|| {
            AppError::with_message(
                ErrorCode::InvalidCheckTimes,
                "check_out must be after check_in",
            )
            .with_detail("field", "check_out")
        })?,
        (None, Some(_)) => {
            return Err(AppError::with_message(
                ErrorCode::InvalidCheckTimes,
                "check_out requires check_in",
            )
            .with_detail("field", "check_in"));
        }
        _ => 0.0,
    };

    Ok(AttendanceWrite {
        status,
        check_in,
        check_out,
        working_hours,
        overtime_hours: round2((working_hours - standard_hours).max(0.0)),
        notes,
    })
}

/// Date must be on/after joining and not after today in the store's timezone
fn check_date(store: &Store, staff: &Staff, date: NaiveDate) -> AppResult<()> {
    if let Ok(joined) = parse_date(&staff.date_of_joining)
        && date < joined
    {
        return Err(AppError::with_message(
            ErrorCode::AttendanceBeforeJoining,
            format!("{} is before the joining date {}", date, joined),
        )
        .with_detail("field", "date"));
    }
    let today = today(store_tz(&store.settings.timezone));
    if date > today {
        return Err(AppError::with_message(
            ErrorCode::AttendanceInFuture,
            format!("{} is in the future (today is {})", date, today),
        )
        .with_detail("field", "date"));
    }
    Ok(())
}

fn already_marked(date: &str) -> AppError {
    AppError::with_message(
        ErrorCode::AttendanceAlreadyMarked,
        format!("Attendance already marked for {date}"),
    )
    .with_detail("field", "date")
}

/// Staff member eligible for attendance on `date`
async fn eligible_staff(
    pool: &SqlitePool,
    store: &Store,
    staff_id: i64,
    date: NaiveDate,
) -> AppResult<Staff> {
    let staff = load_staff(pool, store.id, staff_id).await?;
    if staff.status == StaffStatus::Terminated {
        return Err(AppError::new(ErrorCode::StaffTerminated).with_detail("staff_id", staff_id));
    }
    check_date(store, &staff, date)?;
    Ok(staff)
}

pub async fn mark(
    pool: &SqlitePool,
    store: &Store,
    data: AttendanceMark,
    marked_by: i64,
) -> AppResult<StaffAttendance> {
    let date = parse_date(&data.date).map_err(|e| e.with_detail("field", "date"))?;
    let staff = eligible_staff(pool, store, data.staff_id, date).await?;
    let write = derive_hours(
        data.status,
        data.check_in,
        data.check_out,
        data.notes,
        standard_hours(pool, &staff).await?,
    )?;

    let date = format_date(date);
    match attendance_repo::create(pool, store.id, staff.id, &date, &write, marked_by).await {
        Ok(record) => Ok(record),
        Err(RepoError::Duplicate(_)) => Err(already_marked(&date)),
        Err(e) => Err(e.into()),
    }
}

pub async fn update(
    pool: &SqlitePool,
    store: &Store,
    id: i64,
    data: AttendanceUpdate,
    marked_by: i64,
) -> AppResult<StaffAttendance> {
    let existing = load(pool, store.id, id).await?;
    let staff = load_staff(pool, store.id, existing.staff_id).await?;

    let status = data.status.unwrap_or(existing.status);
    let write = derive_hours(
        status,
        data.check_in.unwrap_or(existing.check_in),
        data.check_out.unwrap_or(existing.check_out),
        data.notes.or(existing.notes),
        standard_hours(pool, &staff).await?,
    )?;

    attendance_repo::update(pool, store.id, id, &write, marked_by)
        .await
        .map_err(AppError::from)
}

pub async fn load(pool: &SqlitePool, store_id: i64, id: i64) -> AppResult<StaffAttendance> {
    attendance_repo::find_in_store(pool, store_id, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::AttendanceNotFound))
}

pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> AppResult<()> {
    match attendance_repo::delete(pool, store_id, id).await {
        Ok(()) => Ok(()),
        Err(RepoError::NotFound(_)) => Err(AppError::new(ErrorCode::AttendanceNotFound)),
        Err(e) => Err(e.into()),
    }
}

/// Mark many staff for one date; entries succeed or fail independently
pub async fn bulk_mark(
    pool: &SqlitePool,
    store: &Store,
    data: BulkAttendance,
    marked_by: i64,
) -> AppResult<BulkResult<StaffAttendance>> {
    let date = parse_date(&data.date).map_err(|e| e.with_detail("field", "date"))?;
    let date_str = format_date(date);
    let mut result = BulkResult::default();

    for entry in data.entries {
        let staff_id = entry.staff_id;
        let outcome = async {
            let staff = eligible_staff(pool, store, staff_id, date).await?;
            let write = derive_hours(
                entry.status,
                entry.check_in,
                entry.check_out,
                entry.notes,
                standard_hours(pool, &staff).await?,
            )?;

            let existing = attendance_repo::find_by_staff_date(pool, staff_id, &date_str)
                .await
                .map_err(AppError::from)?;
            match existing {
                Some(record) if data.overwrite => {
                    attendance_repo::update(pool, store.id, record.id, &write, marked_by)
                        .await
                        .map_err(AppError::from)
                }
                Some(_) => Err(already_marked(&date_str)),
                None => attendance_repo::create(pool, store.id, staff_id, &date_str, &write, marked_by)
                    .await
                    .map_err(|e| match e {
                        RepoError::Duplicate(_) => already_marked(&date_str),
                        other => other.into(),
                    }),
            }
        }
        .await;

        match outcome {
            Ok(record) => result.push_ok(record),
            Err(e) => result.push_err(staff_id, e.message),
        }
    }

    tracing::info!(
        store_id = store.id,
        date = %date_str,
        succeeded = result.succeeded.len(),
        failed = result.failed.len(),
        "Bulk attendance marked"
    );
    Ok(result)
}

/// Resolve list filters: a single `date` wins over `from`/`to`
pub fn resolve_filter(query: AttendanceQuery) -> AppResult<AttendanceFilter> {
    let normalize = |value: Option<String>, field: &'static str| -> AppResult<Option<String>> {
        value
            .map(|v| {
                parse_date(&v)
                    .map(format_date)
                    .map_err(|e| e.with_detail("field", field))
            })
            .transpose()
    };

    let (from, to) = match normalize(query.date, "date")? {
        Some(date) => (Some(date.clone()), Some(date)),
        None => (normalize(query.from, "from")?, normalize(query.to, "to")?),
    };
    if let (Some(f), Some(t)) = (&from, &to)
        && f > t
    {
        return Err(AppError::validation("from must not be after to").with_detail("field", "from"));
    }

    Ok(AttendanceFilter {
        from,
        to,
        staff_id: query.staff_id,
        status: query.status,
    })
}

pub async fn summary(
    pool: &SqlitePool,
    store: &Store,
    query: AttendanceSummaryQuery,
) -> AppResult<AttendanceSummary> {
    let from = format_date(parse_date(&query.from).map_err(|e| e.with_detail("field", "from"))?);
    let to = format_date(parse_date(&query.to).map_err(|e| e.with_detail("field", "to"))?);
    if from > to {
        return Err(AppError::validation("from must not be after to").with_detail("field", "from"));
    }

    let (counts, working_hours, overtime_hours) =
        attendance_repo::totals(pool, store.id, &from, &to, query.staff_id)
            .await
            .map_err(AppError::from)?;
    let per_staff = attendance_repo::totals_per_staff(pool, store.id, &from, &to, query.staff_id)
        .await
        .map_err(AppError::from)?;

    Ok(AttendanceSummary {
        from,
        to,
        attendance_percentage: counts.attendance_percentage(),
        counts,
        total_working_hours: round2(working_hours),
        total_overtime_hours: round2(overtime_hours),
        per_staff,
    })
}

/// Status counts for one day; defaults to today in the store's timezone
pub async fn daily_overview(
    pool: &SqlitePool,
    store: &Store,
    date: Option<String>,
) -> AppResult<DailyOverview> {
    let date = match date {
        Some(d) => parse_date(&d).map_err(|e| e.with_detail("field", "date"))?,
        None => today(store_tz(&store.settings.timezone)),
    };
    let date = format_date(date);

    let stats = staff_repo::stats(pool, store.id)
        .await
        .map_err(AppError::from)?;
    let (counts, _, _) = attendance_repo::totals(pool, store.id, &date, &date, None)
        .await
        .map_err(AppError::from)?;

    let marked = counts.marked();
    Ok(DailyOverview {
        date,
        active_staff: stats.active,
        marked,
        not_marked: (stats.active - marked).max(0),
        counts,
    })
}

/// Attendance of one staff member for a pay period
pub async fn monthly_tally(
    pool: &SqlitePool,
    staff_id: i64,
    month: u32,
    year: i32,
) -> AppResult<MonthlyTally> {
    let (first, last) = month_bounds(year, month)?;
    attendance_repo::monthly_tally(pool, staff_id, &format_date(first), &format_date(last))
        .await
        .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;

    fn mark_payload(staff_id: i64, date: &str, status: AttendanceStatus) -> AttendanceMark {
        AttendanceMark {
            staff_id,
            date: date.into(),
            status,
            check_in: None,
            check_out: None,
            notes: None,
        }
    }

    #[test]
    fn test_derive_hours_and_overtime() {
        let w = derive_hours(
            AttendanceStatus::Present,
            Some("09:00".into()),
            Some("19:30".into()),
            None,
            8.0,
        )
        .unwrap();
        assert_eq!(w.working_hours, 10.5);
        assert_eq!(w.overtime_hours, 2.5);

        let w = derive_hours(AttendanceStatus::HalfDay, Some("09:00".into()), Some("13:00".into()), None, 8.0)
            .unwrap();
        assert_eq!(w.working_hours, 4.0);
        assert_eq!(w.overtime_hours, 0.0);
    }

    #[test]
    fn test_derive_hours_rejects_reversed_times() {
        let err = derive_hours(
            AttendanceStatus::Late,
            Some("18:00".into()),
            Some("10:00".into()),
            None,
            8.0,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCheckTimes);
    }

    #[test]
    fn test_non_worked_status_clears_times() {
        let w = derive_hours(AttendanceStatus::Absent, Some("09:00".into()), Some("17:00".into()), None, 8.0)
            .unwrap();
        assert!(w.check_in.is_none());
        assert_eq!(w.working_hours, 0.0);
    }

    #[test]
    fn test_resolve_filter() {
        let filter = resolve_filter(AttendanceQuery {
            date: Some("2024-03-05".into()),
            from: Some("2024-01-01".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.from.as_deref(), Some("2024-03-05"));
        assert_eq!(filter.to.as_deref(), Some("2024-03-05"));

        assert!(resolve_filter(AttendanceQuery {
            from: Some("2024-03-05".into()),
            to: Some("2024-03-01".into()),
            ..Default::default()
        })
        .is_err());
    }

    #[tokio::test]
    async fn test_mark_date_rules() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "am1@example.com").await;
        let store = test_support::store(&pool, owner.id, "AM-1").await;
        let staff = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;

        let err = mark(&pool, &store, mark_payload(staff.id, "2023-12-31", AttendanceStatus::Present), owner.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AttendanceBeforeJoining);

        let err = mark(&pool, &store, mark_payload(staff.id, "2999-01-01", AttendanceStatus::Present), owner.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AttendanceInFuture);

        mark(&pool, &store, mark_payload(staff.id, "2024-01-02", AttendanceStatus::Present), owner.id)
            .await
            .unwrap();
        let err = mark(&pool, &store, mark_payload(staff.id, "2024-01-02", AttendanceStatus::Late), owner.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AttendanceAlreadyMarked);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_terminated_staff_cannot_be_marked() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "am2@example.com").await;
        let store = test_support::store(&pool, owner.id, "AM-2").await;
        let staff = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        staff_repo::update(
            &pool,
            store.id,
            staff.id,
            shared::models::StaffUpdate {
                status: Some(StaffStatus::Terminated),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = mark(&pool, &store, mark_payload(staff.id, "2024-02-01", AttendanceStatus::Present), owner.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StaffTerminated);
    }

    #[tokio::test]
    async fn test_update_recomputes_hours() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "am3@example.com").await;
        let store = test_support::store(&pool, owner.id, "AM-3").await;
        let staff = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;

        let mut payload = mark_payload(staff.id, "2024-02-01", AttendanceStatus::Present);
        payload.check_in = Some("09:00".into());
        payload.check_out = Some("17:00".into());
        let record = mark(&pool, &store, payload, owner.id).await.unwrap();
        assert_eq!(record.working_hours, 8.0);

        let updated = update(
            &pool,
            &store,
            record.id,
            AttendanceUpdate {
                check_out: Some(Some("20:00".into())),
                ..Default::default()
            },
            owner.id,
        )
        .await
        .unwrap();
        assert_eq!(updated.working_hours, 11.0);
        assert_eq!(updated.overtime_hours, 3.0);

        // Omitted times are kept, an explicit null clears
        let data: AttendanceUpdate = serde_json::from_str(r#"{"check_out": null}"#).unwrap();
        assert_eq!(data.check_in, None);
        let cleared = update(&pool, &store, record.id, data, owner.id).await.unwrap();
        assert_eq!(cleared.check_in.as_deref(), Some("09:00"));
        assert_eq!(cleared.check_out, None);
        assert_eq!(cleared.working_hours, 0.0);
    }

    #[tokio::test]
    async fn test_bulk_mark_collects_failures() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "am4@example.com").await;
        let store = test_support::store(&pool, owner.id, "AM-4").await;
        let a = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        let b = test_support::staff(&pool, store.id, "PHM002", "b@x.com").await;
        mark(&pool, &store, mark_payload(b.id, "2024-02-01", AttendanceStatus::Present), owner.id)
            .await
            .unwrap();

        let entry = |staff_id, status| shared::models::BulkAttendanceEntry {
            staff_id,
            status,
            check_in: None,
            check_out: None,
            notes: None,
        };
        let bulk = BulkAttendance {
            date: "2024-02-01".into(),
            overwrite: false,
            entries: vec![
                entry(a.id, AttendanceStatus::Present),
                entry(b.id, AttendanceStatus::Absent),
                entry(999, AttendanceStatus::Present),
            ],
        };
        let result = bulk_mark(&pool, &store, bulk.clone(), owner.id).await.unwrap();
        assert_eq!(result.succeeded.len(), 1);
        assert_eq!(result.failed.len(), 2);
        assert_eq!(result.failed[0].key, b.id.to_string());

        let overwrite = BulkAttendance {
            overwrite: true,
            ..bulk
        };
        let result = bulk_mark(&pool, &store, overwrite, owner.id).await.unwrap();
        assert_eq!(result.succeeded.len(), 2);
        let b_row = attendance_repo::find_by_staff_date(&pool, b.id, "2024-02-01")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(b_row.status, AttendanceStatus::Absent);
    }

    #[tokio::test]
    async fn test_daily_overview_and_summary() {
        let pool = test_support::pool().await;
        let owner = test_support::owner(&pool, "am5@example.com").await;
        let store = test_support::store(&pool, owner.id, "AM-5").await;
        let a = test_support::staff(&pool, store.id, "PHM001", "a@x.com").await;
        test_support::staff(&pool, store.id, "PHM002", "b@x.com").await;
        mark(&pool, &store, mark_payload(a.id, "2024-02-01", AttendanceStatus::Late), owner.id)
            .await
            .unwrap();

        let overview = daily_overview(&pool, &store, Some("2024-02-01".into()))
            .await
            .unwrap();
        assert_eq!(overview.active_staff, 2);
        assert_eq!(overview.marked, 1);
        assert_eq!(overview.not_marked, 1);
        assert_eq!(overview.counts.late, 1);

        let summary = summary(
            &pool,
            &store,
            AttendanceSummaryQuery {
                from: "2024-02-01".into(),
                to: "2024-02-29".into(),
                staff_id: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(summary.attendance_percentage, 100.0);
        assert_eq!(summary.per_staff.len(), 1);

        let tally = monthly_tally(&pool, a.id, 2, 2024).await.unwrap();
        assert_eq!(tally.counts.late, 1);
    }
}
