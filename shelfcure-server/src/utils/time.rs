//! Date and time helpers
//!
//! Calendar dates travel as `YYYY-MM-DD`, times of day as `HH:MM`.
//! "Today" is always evaluated in the store's timezone.

use chrono::{Datelike, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse a time of day (HH:MM)
pub fn parse_time(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time format: {}", time)))
}

/// Store timezone, falling back to UTC for unknown names
pub fn store_tz(name: &str) -> Tz {
    name.parse().unwrap_or_else(|_| {
        tracing::warn!(timezone = %name, "Unknown store timezone, using UTC");
        Tz::UTC
    })
}

/// Today's date in the given timezone
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// Format a date as YYYY-MM-DD
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// First and last day of a month
pub fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::validation(format!("Invalid period {year}-{month:02}")))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::validation(format!("Invalid period {year}-{month:02}")))?;
    let last = next.pred_opt().unwrap_or(first);
    Ok((first, last))
}

/// Whether (year, month) is after the current month
pub fn is_future_month(year: i32, month: u32, tz: Tz) -> bool {
    let today = today(tz);
    (year, month) > (today.year(), today.month())
}

/// Hours between check-in and check-out, 2 dp
///
/// Check-out must be strictly after check-in (no overnight shifts).
pub fn hours_between(check_in: NaiveTime, check_out: NaiveTime) -> Option<f64> {
    if check_out <= check_in {
        return None;
    }
    let minutes = (check_out - check_in).num_minutes() as f64;
    Some((minutes / 60.0 * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2024-02-29").is_ok());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_month_bounds() {
        let (first, last) = month_bounds(2024, 2).unwrap();
        assert_eq!(format_date(first), "2024-02-01");
        assert_eq!(format_date(last), "2024-02-29");

        let (_, last) = month_bounds(2023, 12).unwrap();
        assert_eq!(format_date(last), "2023-12-31");

        assert!(month_bounds(2024, 13).is_err());
    }

    #[test]
    fn test_hours_between() {
        let t = |s| parse_time(s).unwrap();
        assert_eq!(hours_between(t("09:00"), t("17:30")), Some(8.5));
        assert_eq!(hours_between(t("09:00"), t("09:20")), Some(0.33));
        assert_eq!(hours_between(t("17:00"), t("09:00")), None);
        assert_eq!(hours_between(t("09:00"), t("09:00")), None);
    }

    #[test]
    fn test_future_month() {
        let tz = store_tz("Asia/Kolkata");
        assert!(is_future_month(2100, 1, tz));
        assert!(!is_future_month(2020, 1, tz));
    }

    #[test]
    fn test_unknown_timezone_falls_back() {
        assert_eq!(store_tz("Mars/Olympus"), Tz::UTC);
    }
}
