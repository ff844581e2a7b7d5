//! Attendance fact model.
//!
//! Attendance facts are supplied read-only by the attendance store, one per
//! work date and shift. Leave approvals are already reflected in the status.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The shift a fact was recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftLabel {
    /// Morning shift.
    Morning,
    /// Afternoon shift.
    Afternoon,
    /// A single shift covering the whole day.
    FullDay,
}

/// Attendance status code assigned upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Checked in on time.
    OnTime,
    /// Checked in late without approval.
    Late,
    /// Left early without approval.
    EarlyLeave,
    /// No check-in and no approved leave.
    Absent,
    /// Presence approved after the fact (e.g. forgotten punch).
    ApprovedPresent,
    /// Late arrival approved by a manager.
    ApprovedLate,
    /// Early departure approved by a manager.
    ApprovedEarlyLeave,
    /// Approved leave; not counted as worked.
    ApprovedAbsence,
    /// Awaiting a decision on a leave or correction request.
    Pending,
}

impl AttendanceStatus {
    /// Returns true if a shift with this status counts towards shift-based pay.
    ///
    /// ```
    /// use payroll_engine::models::AttendanceStatus;
    ///
    /// assert!(AttendanceStatus::ApprovedLate.counts_as_present());
    /// assert!(!AttendanceStatus::Late.counts_as_present());
    /// ```
    pub fn counts_as_present(self) -> bool {
        matches!(
            self,
            AttendanceStatus::OnTime
                | AttendanceStatus::ApprovedPresent
                | AttendanceStatus::ApprovedLate
                | AttendanceStatus::ApprovedEarlyLeave
        )
    }
}

/// One attendance record for one employee on one work date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceFact {
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The calendar date worked.
    pub work_date: NaiveDate,
    /// Check-in timestamp, if punched.
    #[serde(default)]
    pub check_in: Option<NaiveDateTime>,
    /// Check-out timestamp, if punched.
    #[serde(default)]
    pub check_out: Option<NaiveDateTime>,
    /// Shift the record belongs to, if any.
    #[serde(default)]
    pub shift: Option<ShiftLabel>,
    /// Status code after leave and correction approvals.
    pub status: AttendanceStatus,
    /// Precomputed worked hours.
    #[serde(default)]
    pub actual_work_hours: Option<Decimal>,
    /// Minutes late at check-in.
    #[serde(default)]
    pub late_minutes: u32,
    /// Minutes left before the end of the shift.
    #[serde(default)]
    pub early_leave_minutes: u32,
    /// Whether this record is an overtime session.
    #[serde(default)]
    pub is_overtime: bool,
}

impl AttendanceFact {
    /// Returns the hours worked for this record.
    ///
    /// Uses the precomputed value when present, otherwise the span between
    /// check-in and check-out. Records missing either punch contribute zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{AttendanceFact, AttendanceStatus};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    /// let fact = AttendanceFact {
    ///     employee_id: "emp_001".to_string(),
    ///     work_date: date,
    ///     check_in: date.and_hms_opt(18, 0, 0),
    ///     check_out: date.and_hms_opt(20, 30, 0),
    ///     shift: None,
    ///     status: AttendanceStatus::OnTime,
    ///     actual_work_hours: None,
    ///     late_minutes: 0,
    ///     early_leave_minutes: 0,
    ///     is_overtime: true,
    /// };
    /// assert_eq!(fact.worked_hours(), Decimal::new(25, 1));
    /// ```
    pub fn worked_hours(&self) -> Decimal {
        if let Some(hours) = self.actual_work_hours {
            return hours;
        }

        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) if check_out > check_in => {
                let minutes = (check_out - check_in).num_minutes();
                Decimal::new(minutes, 0) / Decimal::new(60, 0)
            }
            _ => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(status: AttendanceStatus) -> AttendanceFact {
        AttendanceFact {
            employee_id: "emp_001".to_string(),
            work_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            check_in: None,
            check_out: None,
            shift: Some(ShiftLabel::Morning),
            status,
            actual_work_hours: None,
            late_minutes: 0,
            early_leave_minutes: 0,
            is_overtime: false,
        }
    }

    #[test]
    fn test_present_set_membership() {
        let present = [
            AttendanceStatus::OnTime,
            AttendanceStatus::ApprovedPresent,
            AttendanceStatus::ApprovedLate,
            AttendanceStatus::ApprovedEarlyLeave,
        ];
        let not_present = [
            AttendanceStatus::Late,
            AttendanceStatus::EarlyLeave,
            AttendanceStatus::Absent,
            AttendanceStatus::ApprovedAbsence,
            AttendanceStatus::Pending,
        ];

        assert!(present.iter().all(|s| s.counts_as_present()));
        assert!(not_present.iter().all(|s| !s.counts_as_present()));
    }

    #[test]
    fn test_precomputed_hours_take_priority() {
        let mut record = fact(AttendanceStatus::OnTime);
        let date = record.work_date;
        record.check_in = date.and_hms_opt(8, 0, 0);
        record.check_out = date.and_hms_opt(12, 0, 0);
        record.actual_work_hours = Some(Decimal::new(35, 1));

        assert_eq!(record.worked_hours(), Decimal::new(35, 1));
    }

    #[test]
    fn test_missing_punch_yields_zero_hours() {
        let mut record = fact(AttendanceStatus::OnTime);
        record.check_in = record.work_date.and_hms_opt(8, 0, 0);

        assert_eq!(record.worked_hours(), Decimal::ZERO);
    }

    #[test]
    fn test_status_deserializes_from_snake_case() {
        let status: AttendanceStatus = serde_json::from_str("\"approved_early_leave\"").unwrap();
        assert_eq!(status, AttendanceStatus::ApprovedEarlyLeave);
    }
}
