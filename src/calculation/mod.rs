//! Calculation logic for the payroll engine.
//!
//! This module contains the pure computation steps for a payslip: attendance
//! aggregation and day-equivalence, standard days in period, base salary and
//! over-standard bonus, overtime pay, late penalty, allowance sync and ledger
//! aggregation, and progressive income tax. [`PayrollCalculator`] composes
//! them into a [`PayslipSnapshot`](crate::models::PayslipSnapshot).

mod attendance_aggregator;
mod base_salary;
mod late_penalty;
mod line_items;
mod overtime;
mod payroll_calculator;
mod progressive_tax;
mod rounding;

pub use attendance_aggregator::{
    AttendanceAggregationResult, AttendanceSummary, DailyPresence, aggregate_attendance,
    daily_presence, standard_days_in_period,
};
pub use base_salary::{BaseSalaryResult, calculate_base_salary};
pub use late_penalty::{LatePenaltyResult, calculate_late_penalty};
pub use line_items::{
    LedgerAggregationResult, LedgerTotals, aggregate_line_items, sync_system_items,
};
pub use overtime::{OvertimePayResult, calculate_overtime_pay};
pub use payroll_calculator::{
    LEDGER_STEP, PayrollCalculation, PayrollCalculator, PayrollInput, recompute_net_salary,
};
pub(crate) use payroll_calculator::net_salary_step;
pub use progressive_tax::{
    ProgressiveTaxResult, TAX_BRACKETS, TaxBracket, calculate_progressive_tax,
};
pub use rounding::{MONEY_DECIMAL_PLACES, round_money, round_whole};
