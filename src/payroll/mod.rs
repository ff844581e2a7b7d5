//! The stateful payroll core.
//!
//! [`PayrollService`] owns cycles and payslips and exposes the operations
//! HR tooling drives: computing payslips and payroll runs, editing a
//! payslip's ledger, finalizing a cycle, and reporting. Profiles and
//! attendance come in through the [`EmployeeDirectory`] and
//! [`AttendanceStore`] traits; audit events go out through an [`AuditSink`].

mod audit;
mod collaborators;
mod cycle;
mod ledger;
mod reporting;
mod service;
mod store;

pub use audit::{AuditSink, AuditSinkError, ChannelAuditSink, TracingAuditSink};
pub use collaborators::{
    AttendanceStore, EmployeeDirectory, InMemoryAttendanceStore, InMemoryEmployeeDirectory,
};
pub use ledger::ManualItemRequest;
pub use reporting::{Page, PayslipDetail, PayslipFilter, PayslipPage};
pub use service::{
    AttendanceReport, EmployeeRunResult, PayrollRunReport, PayrollService, RunOutcome,
};
