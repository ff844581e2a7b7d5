//! Attendance aggregation functionality.
//!
//! This module converts one employee's attendance facts for one cycle into
//! day-equivalents, qualifying shifts, overtime hours and late minutes. It is
//! the only place the day-equivalence rule lives; both payroll computation and
//! attendance reporting go through [`daily_presence`].
//!
//! ## Counting regimes
//!
//! - **Monthly**: each distinct date with a check-in (overtime excluded) is one day.
//! - **Shift-based**: only shifts whose status is in the present set qualify;
//!   a date with two or more qualifying shifts is one day, a date with exactly
//!   one is half a day.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceFact, AuditStep, CalculationMode};

/// Presence for one work date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPresence {
    /// The work date.
    pub date: NaiveDate,
    /// Qualifying non-overtime records on the date.
    pub qualifying_shifts: u32,
    /// Work-day units the date contributes (1.0 or 0.5).
    pub day_equivalent: Decimal,
}

/// Attendance statistics for one employee over one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Sum of day-equivalents.
    pub actual_work_days: Decimal,
    /// Sum of qualifying shifts.
    pub actual_shifts: u32,
    /// Hours recorded on overtime facts.
    pub total_ot_hours: Decimal,
    /// Late minutes across all facts.
    pub total_late_minutes: u32,
}

/// The result of aggregating attendance, including the audit step.
#[derive(Debug, Clone)]
pub struct AttendanceAggregationResult {
    /// The aggregated statistics.
    pub summary: AttendanceSummary,
    /// Per-date presence the statistics were built from.
    pub days: Vec<DailyPresence>,
    /// The audit step recording this aggregation.
    pub audit_step: AuditStep,
}

/// Returns per-date presence for the given facts, ordered by date.
///
/// Overtime facts never count towards presence. Dates without a qualifying
/// record are omitted.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::daily_presence;
/// use payroll_engine::models::{AttendanceFact, AttendanceStatus, CalculationMode, ShiftLabel};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
/// let shift = |label, status| AttendanceFact {
///     employee_id: "doc_001".to_string(),
///     work_date: date,
///     check_in: date.and_hms_opt(8, 0, 0),
///     check_out: None,
///     shift: Some(label),
///     status,
///     actual_work_hours: None,
///     late_minutes: 0,
///     early_leave_minutes: 0,
///     is_overtime: false,
/// };
///
/// let facts = vec![
///     shift(ShiftLabel::Morning, AttendanceStatus::OnTime),
///     shift(ShiftLabel::Afternoon, AttendanceStatus::Late),
/// ];
/// let days = daily_presence(&facts, CalculationMode::ShiftBased);
/// assert_eq!(days.len(), 1);
/// assert_eq!(days[0].qualifying_shifts, 1);
/// assert_eq!(days[0].day_equivalent, Decimal::new(5, 1));
/// ```
pub fn daily_presence(facts: &[AttendanceFact], mode: CalculationMode) -> Vec<DailyPresence> {
    let mut per_date: BTreeMap<NaiveDate, u32> = BTreeMap::new();

    for fact in facts.iter().filter(|f| !f.is_overtime) {
        let qualifies = match mode {
            CalculationMode::Monthly => fact.check_in.is_some(),
            CalculationMode::ShiftBased => fact.status.counts_as_present(),
        };
        if qualifies {
            *per_date.entry(fact.work_date).or_insert(0) += 1;
        }
    }

    per_date
        .into_iter()
        .map(|(date, qualifying_shifts)| DailyPresence {
            date,
            qualifying_shifts,
            day_equivalent: day_equivalent(mode, qualifying_shifts),
        })
        .collect()
}

fn day_equivalent(mode: CalculationMode, qualifying_shifts: u32) -> Decimal {
    match (mode, qualifying_shifts) {
        (_, 0) => Decimal::ZERO,
        (CalculationMode::Monthly, _) => Decimal::ONE,
        (CalculationMode::ShiftBased, 1) => Decimal::new(5, 1),
        (CalculationMode::ShiftBased, _) => Decimal::ONE,
    }
}

/// Aggregates one employee's attendance facts for a cycle.
///
/// # Arguments
///
/// * `facts` - Attendance facts already restricted to the cycle's date span
/// * `mode` - The employee's calculation mode
/// * `step_number` - The step number for audit trail sequencing
pub fn aggregate_attendance(
    facts: &[AttendanceFact],
    mode: CalculationMode,
    step_number: u32,
) -> AttendanceAggregationResult {
    let days = daily_presence(facts, mode);

    let actual_work_days: Decimal = days.iter().map(|d| d.day_equivalent).sum();
    let actual_shifts: u32 = days.iter().map(|d| d.qualifying_shifts).sum();
    let half_days = days
        .iter()
        .filter(|d| d.day_equivalent < Decimal::ONE)
        .count();

    let total_ot_hours: Decimal = facts
        .iter()
        .filter(|f| f.is_overtime)
        .map(AttendanceFact::worked_hours)
        .sum();
    let overtime_records = facts.iter().filter(|f| f.is_overtime).count();

    let total_late_minutes: u32 = facts.iter().map(|f| f.late_minutes).sum();

    let mode_str = match mode {
        CalculationMode::Monthly => "monthly",
        CalculationMode::ShiftBased => "shift_based",
    };

    let reasoning = match mode {
        CalculationMode::Monthly => format!(
            "{} dated check-ins counted as {} work days; {} overtime records totalling {} hours; {} late minutes",
            actual_shifts,
            actual_work_days.normalize(),
            overtime_records,
            total_ot_hours.normalize(),
            total_late_minutes
        ),
        CalculationMode::ShiftBased => format!(
            "{} qualifying shifts over {} dates ({} half days) = {} work days; {} overtime records totalling {} hours; {} late minutes",
            actual_shifts,
            days.len(),
            half_days,
            actual_work_days.normalize(),
            overtime_records,
            total_ot_hours.normalize(),
            total_late_minutes
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_aggregation".to_string(),
        rule_name: "Attendance Aggregation".to_string(),
        input: serde_json::json!({
            "calculation_mode": mode_str,
            "fact_count": facts.len()
        }),
        output: serde_json::json!({
            "actual_work_days": actual_work_days.normalize().to_string(),
            "actual_shifts": actual_shifts,
            "qualifying_dates": days.len(),
            "half_days": half_days,
            "total_ot_hours": total_ot_hours.normalize().to_string(),
            "total_late_minutes": total_late_minutes
        }),
        reasoning,
    };

    AttendanceAggregationResult {
        summary: AttendanceSummary {
            actual_work_days,
            actual_shifts,
            total_ot_hours,
            total_late_minutes,
        },
        days,
        audit_step,
    }
}

/// Counts the non-Sunday days from `cycle_start` to `min(today, cycle_end)`.
///
/// Computed per call, so a mid-month computation expects fewer days than an
/// end-of-month one for the same cycle. Returns zero when `today` is before
/// the cycle starts.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::standard_days_in_period;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(); // Sunday
/// let end = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
///
/// // After month end the whole month counts: 31 days minus 5 Sundays.
/// let later = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
/// assert_eq!(standard_days_in_period(start, end, later), 26);
///
/// // Mid-month only counts up to today.
/// let mid = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
/// assert_eq!(standard_days_in_period(start, end, mid), 12);
/// ```
pub fn standard_days_in_period(
    cycle_start: NaiveDate,
    cycle_end: NaiveDate,
    today: NaiveDate,
) -> u32 {
    let last = today.min(cycle_end);
    if last < cycle_start {
        return 0;
    }

    cycle_start
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| d.weekday() != Weekday::Sun)
        .count() as u32
}
