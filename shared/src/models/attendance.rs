//! Staff Attendance Model

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
    OnLeave,
    Holiday,
}

impl AttendanceStatus {
    /// Whether check-in/out times are meaningful for this status
    pub fn is_worked(&self) -> bool {
        matches!(self, Self::Present | Self::Late | Self::HalfDay)
    }
}

/// One attendance row per staff per date
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StaffAttendance {
    pub id: i64,
    pub store_id: i64,
    pub staff_id: i64,
    /// YYYY-MM-DD
    pub date: String,
    pub status: AttendanceStatus,
    /// HH:MM
    pub check_in: Option<String>,
    /// HH:MM
    pub check_out: Option<String>,
    pub working_hours: f64,
    pub overtime_hours: f64,
    pub notes: Option<String>,
    pub marked_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Attendance row joined with staff identity (list views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AttendanceWithStaff {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub attendance: StaffAttendance,
    pub staff_name: String,
    pub employee_id: String,
}

/// Mark attendance payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttendanceMark {
    pub staff_id: i64,
    pub date: String,
    pub status: AttendanceStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Update attendance payload
///
/// A missing check time keeps the stored one; an explicit `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AttendanceUpdate {
    pub status: Option<AttendanceStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub check_in: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub check_out: Option<Option<String>>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Present field (even `null`) as `Some`, so absent and null stay distinct
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One entry of a bulk mark
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkAttendanceEntry {
    pub staff_id: i64,
    pub status: AttendanceStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Mark many staff for the same date
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkAttendance {
    pub date: String,
    /// Update existing rows instead of reporting them as failures
    #[serde(default)]
    pub overwrite: bool,
    #[validate(length(min = 1, max = 500), nested)]
    pub entries: Vec<BulkAttendanceEntry>,
}

/// Attendance list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceQuery {
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub staff_id: Option<i64>,
    pub status: Option<AttendanceStatus>,
}

/// Summary range
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceSummaryQuery {
    pub from: String,
    pub to: String,
    pub staff_id: Option<i64>,
}

/// Daily overview date (defaults to today)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
}

/// Counts per attendance status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StatusCounts {
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub half_day: i64,
    pub on_leave: i64,
    pub holiday: i64,
}

impl StatusCounts {
    pub fn marked(&self) -> i64 {
        self.present + self.absent + self.late + self.half_day + self.on_leave + self.holiday
    }

    /// `(present + late + 0.5 × half_day) / marked × 100`, 2 dp
    pub fn attendance_percentage(&self) -> f64 {
        let marked = self.marked();
        if marked == 0 {
            return 0.0;
        }
        let attended = self.present as f64 + self.late as f64 + 0.5 * self.half_day as f64;
        (attended / marked as f64 * 10000.0).round() / 100.0
    }
}

/// Per-staff line of an attendance summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffAttendanceSummary {
    pub staff_id: i64,
    pub staff_name: String,
    pub employee_id: String,
    pub counts: StatusCounts,
    pub working_hours: f64,
    pub overtime_hours: f64,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub from: String,
    pub to: String,
    pub counts: StatusCounts,
    pub total_working_hours: f64,
    pub total_overtime_hours: f64,
    pub attendance_percentage: f64,
    pub per_staff: Vec<StaffAttendanceSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyOverview {
    pub date: String,
    pub active_staff: i64,
    pub marked: i64,
    pub not_marked: i64,
    pub counts: StatusCounts,
}

/// One staff member's attendance for a pay period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTally {
    pub counts: StatusCounts,
    pub overtime_hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_percentage() {
        let counts = StatusCounts {
            present: 6,
            absent: 2,
            late: 1,
            half_day: 1,
            ..Default::default()
        };
        assert_eq!(counts.marked(), 10);
        assert_eq!(counts.attendance_percentage(), 75.0);
    }

    #[test]
    fn test_attendance_percentage_empty() {
        assert_eq!(StatusCounts::default().attendance_percentage(), 0.0);
    }

    #[test]
    fn test_status_serde() {
        let s: AttendanceStatus = serde_json::from_str("\"half_day\"").unwrap();
        assert_eq!(s, AttendanceStatus::HalfDay);
        assert!(s.is_worked());
        assert!(!AttendanceStatus::OnLeave.is_worked());
    }
}
