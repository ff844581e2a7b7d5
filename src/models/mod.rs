//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod audit;
mod payslip;
mod salary_cycle;
mod salary_profile;

pub use attendance::{AttendanceFact, AttendanceStatus, ShiftLabel};
pub use audit::{AuditAction, AuditEvent, AuditStep, AuditTrace, AuditWarning};
pub use payslip::{
    DEPENDENTS_ITEM_NAME, InsuranceCode, LineItemKind, PayslipLineItem, PayslipSnapshot,
    TaxBracketAmount,
};
pub use salary_cycle::{CycleStatus, SalaryCycle, month_bounds};
pub use salary_profile::{AllowanceConfig, CalculationMode, ItemDirection, SalaryProfile};
