//! Salary cycle model.
//!
//! A [`SalaryCycle`] is one calendar-month payroll period. It starts in
//! [`CycleStatus::Draft`] and moves one way to [`CycleStatus::Finalized`].

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PayrollError, PayrollResult};

/// Lifecycle status of a salary cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Open for computation and ledger edits.
    Draft,
    /// Locked; every payslip in the cycle is immutable.
    Finalized,
}

/// One calendar-month payroll period, keyed by (month, year).
///
/// # Example
///
/// ```
/// use payroll_engine::models::{CycleStatus, SalaryCycle};
/// use chrono::NaiveDate;
///
/// let cycle = SalaryCycle::new_draft(2, 2028)?;
/// assert_eq!(cycle.status, CycleStatus::Draft);
/// assert_eq!(cycle.end_date, NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());
/// # Ok::<(), payroll_engine::error::PayrollError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryCycle {
    /// Unique identifier for the cycle.
    pub id: Uuid,
    /// Calendar month (1-12).
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// First day of the month (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the month (inclusive).
    pub end_date: NaiveDate,
    /// Current lifecycle status.
    pub status: CycleStatus,
    /// When the cycle was created.
    pub created_at: DateTime<Utc>,
    /// When the cycle was finalized, if it has been.
    #[serde(default)]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl SalaryCycle {
    /// Creates a DRAFT cycle spanning the full calendar month.
    ///
    /// Returns [`PayrollError::InvalidPeriod`] if the month is out of range.
    pub fn new_draft(month: u32, year: i32) -> PayrollResult<Self> {
        let (start_date, end_date) = month_bounds(month, year)?;
        Ok(Self {
            id: Uuid::new_v4(),
            month,
            year,
            start_date,
            end_date,
            status: CycleStatus::Draft,
            created_at: Utc::now(),
            finalized_at: None,
        })
    }

    /// Returns true once the cycle has been locked.
    pub fn is_finalized(&self) -> bool {
        self.status == CycleStatus::Finalized
    }

    /// Checks if a date falls within the cycle (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Fails with [`PayrollError::CycleLocked`] if the cycle is finalized.
    pub fn ensure_mutable(&self) -> PayrollResult<()> {
        if self.is_finalized() {
            return Err(PayrollError::CycleLocked {
                month: self.month,
                year: self.year,
            });
        }
        Ok(())
    }

    /// Moves the cycle from DRAFT to FINALIZED.
    ///
    /// The transition is one-way; finalizing twice fails with
    /// [`PayrollError::CycleLocked`].
    pub fn finalize(&mut self, at: DateTime<Utc>) -> PayrollResult<()> {
        self.ensure_mutable()?;
        self.status = CycleStatus::Finalized;
        self.finalized_at = Some(at);
        Ok(())
    }
}

/// Returns the first and last day of a calendar month.
pub fn month_bounds(month: u32, year: i32) -> PayrollResult<(NaiveDate, NaiveDate)> {
    let invalid = || PayrollError::InvalidPeriod { month, year };

    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_month_start = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let end = next_month_start.pred_opt().ok_or_else(invalid)?;

    debug_assert_eq!(end.month(), month);
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_draft_spans_calendar_month() {
        let cycle = SalaryCycle::new_draft(3, 2026).unwrap();
        assert_eq!(cycle.start_date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(cycle.end_date, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
        assert_eq!(cycle.status, CycleStatus::Draft);
        assert!(cycle.finalized_at.is_none());
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let (start, end) = month_bounds(12, 2026).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(matches!(
            SalaryCycle::new_draft(13, 2026),
            Err(PayrollError::InvalidPeriod { month: 13, .. })
        ));
        assert!(matches!(
            SalaryCycle::new_draft(0, 2026),
            Err(PayrollError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_finalize_is_one_way() {
        let mut cycle = SalaryCycle::new_draft(4, 2026).unwrap();
        assert!(cycle.ensure_mutable().is_ok());

        cycle.finalize(Utc::now()).unwrap();
        assert!(cycle.is_finalized());
        assert!(cycle.finalized_at.is_some());

        let err = cycle.finalize(Utc::now()).unwrap_err();
        assert!(matches!(err, PayrollError::CycleLocked { month: 4, year: 2026 }));
        assert!(cycle.ensure_mutable().is_err());
    }

    #[test]
    fn test_contains_date_is_inclusive() {
        let cycle = SalaryCycle::new_draft(1, 2026).unwrap();
        assert!(cycle.contains_date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
        assert!(cycle.contains_date(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()));
        assert!(!cycle.contains_date(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()));
    }
}
