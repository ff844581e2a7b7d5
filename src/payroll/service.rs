//! The payroll service: payslip computation and payroll runs.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::calculation::{
    AttendanceSummary, DailyPresence, PayrollCalculator, PayrollInput, aggregate_attendance,
};
use crate::config::PayrollConfig;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{AuditEvent, CalculationMode, PayslipSnapshot, SalaryCycle, month_bounds};

use super::audit::AuditSink;
use super::collaborators::{AttendanceStore, EmployeeDirectory};
use super::store::{PayrollStore, PayslipLocation, PayslipRecord};

/// Outcome for one employee in a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The payslip was computed and persisted.
    Computed {
        /// The payslip id.
        payslip_id: Uuid,
        /// The computed net salary.
        net_salary: Decimal,
    },
    /// The employee was skipped.
    Failed {
        /// Stable error code, see [`PayrollError::code`].
        code: String,
        /// Human-readable reason.
        message: String,
    },
}

/// One employee's entry in a [`PayrollRunReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRunResult {
    /// The employee.
    pub employee_id: String,
    /// What happened.
    pub outcome: RunOutcome,
}

impl EmployeeRunResult {
    fn from_result(employee_id: String, result: PayrollResult<PayslipSnapshot>) -> Self {
        let outcome = match result {
            Ok(snapshot) => RunOutcome::Computed {
                payslip_id: snapshot.id,
                net_salary: snapshot.net_salary,
            },
            Err(e) => {
                warn!(employee_id = %employee_id, code = e.code(), error = %e, "Skipping employee");
                RunOutcome::Failed {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }
            }
        };
        Self {
            employee_id,
            outcome,
        }
    }
}

/// Per-employee results of a payroll run, ordered by employee id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunReport {
    /// The cycle the run targeted.
    pub cycle: SalaryCycle,
    /// One entry per targeted employee.
    pub results: Vec<EmployeeRunResult>,
}

impl PayrollRunReport {
    /// Number of employees whose payslip was computed.
    pub fn succeeded(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, RunOutcome::Computed { .. }))
            .count()
    }

    /// Number of employees that were skipped.
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// Returns the result for one employee.
    pub fn result_for(&self, employee_id: &str) -> Option<&EmployeeRunResult> {
        self.results.iter().find(|r| r.employee_id == employee_id)
    }
}

/// An employee's attendance for a month, as shown on attendance reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceReport {
    /// The employee.
    pub employee_id: String,
    /// The report month.
    pub month: u32,
    /// The report year.
    pub year: i32,
    /// The counting regime applied.
    pub calculation_mode: CalculationMode,
    /// Per-date presence.
    pub days: Vec<DailyPresence>,
    /// Month totals.
    pub summary: AttendanceSummary,
}

pub(crate) struct ServiceInner {
    pub calculator: PayrollCalculator,
    pub store: PayrollStore,
    pub directory: Arc<dyn EmployeeDirectory>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub audit_sink: Arc<dyn AuditSink>,
}

/// Stateful payroll core: cycles, payslips, ledger edits and reports.
///
/// Cloning is cheap; clones share the same store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use payroll_engine::config::PayrollConfig;
/// use payroll_engine::payroll::{
///     InMemoryAttendanceStore, InMemoryEmployeeDirectory, PayrollService, TracingAuditSink,
/// };
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// runtime.block_on(async {
///     let service = PayrollService::new(
///         PayrollConfig::default(),
///         Arc::new(InMemoryEmployeeDirectory::new()),
///         Arc::new(InMemoryAttendanceStore::new()),
///         Arc::new(TracingAuditSink),
///     );
///     let as_of = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
///     let report = service.run_payroll(3, 2026, None, as_of).await.unwrap();
///     assert!(report.results.is_empty());
/// });
/// ```
#[derive(Clone)]
pub struct PayrollService {
    pub(crate) inner: Arc<ServiceInner>,
}

impl PayrollService {
    /// Creates a service with an empty store.
    pub fn new(
        config: PayrollConfig,
        directory: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceStore>,
        audit_sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                calculator: PayrollCalculator::new(config),
                store: PayrollStore::new(),
                directory,
                attendance,
                audit_sink,
            }),
        }
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &PayrollConfig {
        self.inner.calculator.config()
    }

    /// Computes or recomputes one employee's payslip and persists it.
    ///
    /// The cycle is created as DRAFT if needed. `as_of` bounds the standard
    /// days in period; pass today's date for a live computation.
    ///
    /// # Errors
    ///
    /// - [`PayrollError::ProfileMissing`] if the employee has no profile
    /// - [`PayrollError::CycleLocked`] if the cycle is finalized
    /// - [`PayrollError::StoreUnavailable`] if a collaborator fails
    ///
    /// On error the previously persisted snapshot is left untouched.
    pub async fn calculate_payslip(
        &self,
        employee_id: &str,
        month: u32,
        year: i32,
        as_of: NaiveDate,
    ) -> PayrollResult<PayslipSnapshot> {
        let inner = &self.inner;
        let profile = inner
            .directory
            .get_salary_profile(employee_id)?
            .ok_or_else(|| PayrollError::ProfileMissing {
                employee_id: employee_id.to_string(),
            })?;

        let entry = inner.store.get_or_create_cycle(month, year).await?;
        let cycle = entry.cycle.read().await;
        cycle.ensure_mutable().inspect_err(|_| {
            warn!(employee_id, month, year, "Recompute rejected on finalized cycle");
        })?;

        let facts = inner
            .attendance
            .get_attendance_facts(employee_id, cycle.start_date, cycle.end_date)?;

        let slot = entry.slot(employee_id).await;
        let mut stored = slot.lock().await;

        let calculation = inner.calculator.calculate(PayrollInput {
            cycle: &cycle,
            profile: &profile,
            facts: &facts,
            previous: stored.as_ref().map(|r| &r.snapshot),
            as_of,
        })?;
        let snapshot = calculation.snapshot;

        inner
            .store
            .register_payslip(
                snapshot.id,
                PayslipLocation {
                    month,
                    year,
                    employee_id: employee_id.to_string(),
                },
            )
            .await;
        *stored = Some(PayslipRecord {
            snapshot: snapshot.clone(),
            audit_trace: calculation.audit_trace,
        });

        info!(
            employee_id,
            month,
            year,
            version = snapshot.version,
            gross = %snapshot.gross_salary,
            net = %snapshot.net_salary,
            "Payslip persisted"
        );
        Ok(snapshot)
    }

    /// Computes payslips for every payable employee, one at a time.
    ///
    /// Per-employee failures are reported rather than aborting the run.
    ///
    /// # Errors
    ///
    /// Fails as a whole only if the cycle is finalized or invalid, or the
    /// employee list cannot be fetched.
    pub async fn run_payroll(
        &self,
        month: u32,
        year: i32,
        role_filter: Option<&str>,
        as_of: NaiveDate,
    ) -> PayrollResult<PayrollRunReport> {
        let employees = self.prepare_run(month, year, role_filter).await?;

        let mut results = Vec::with_capacity(employees.len());
        for employee_id in employees {
            let result = self.calculate_payslip(&employee_id, month, year, as_of).await;
            results.push(EmployeeRunResult::from_result(employee_id, result));
        }

        self.finish_run(month, year, results).await
    }

    /// Computes payslips for every payable employee on concurrent tasks.
    ///
    /// Produces the same report as [`run_payroll`](Self::run_payroll).
    pub async fn run_payroll_concurrent(
        &self,
        month: u32,
        year: i32,
        role_filter: Option<&str>,
        as_of: NaiveDate,
    ) -> PayrollResult<PayrollRunReport> {
        let employees = self.prepare_run(month, year, role_filter).await?;

        let mut tasks = JoinSet::new();
        for employee_id in employees.iter().cloned() {
            let service = self.clone();
            tasks.spawn(async move {
                let result = service
                    .calculate_payslip(&employee_id, month, year, as_of)
                    .await;
                EmployeeRunResult::from_result(employee_id, result)
            });
        }

        let mut results = Vec::with_capacity(employees.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => error!(error = %e, "Payroll task failed"),
            }
        }

        let finished: BTreeSet<&str> = results.iter().map(|r| r.employee_id.as_str()).collect();
        let lost: Vec<EmployeeRunResult> = employees
            .iter()
            .filter(|id| !finished.contains(id.as_str()))
            .map(|id| EmployeeRunResult {
                employee_id: id.clone(),
                outcome: RunOutcome::Failed {
                    code: "TASK_FAILED".to_string(),
                    message: "payroll task did not complete".to_string(),
                },
            })
            .collect();
        results.extend(lost);

        self.finish_run(month, year, results).await
    }

    async fn prepare_run(
        &self,
        month: u32,
        year: i32,
        role_filter: Option<&str>,
    ) -> PayrollResult<Vec<String>> {
        let entry = self.inner.store.get_or_create_cycle(month, year).await?;
        entry.cycle.read().await.ensure_mutable()?;

        let mut employees = self.inner.directory.list_payable_employees(role_filter)?;
        employees.sort();
        employees.dedup();

        info!(
            month,
            year,
            role = ?role_filter,
            employees = employees.len(),
            "Starting payroll run"
        );
        Ok(employees)
    }

    async fn finish_run(
        &self,
        month: u32,
        year: i32,
        mut results: Vec<EmployeeRunResult>,
    ) -> PayrollResult<PayrollRunReport> {
        results.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        let entry = self.inner.store.cycle(month, year).await?;
        let cycle = entry.cycle.read().await.clone();

        let report = PayrollRunReport { cycle, results };
        info!(
            month,
            year,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Payroll run complete"
        );
        Ok(report)
    }

    /// Reports an employee's day-by-day presence for a month.
    ///
    /// Uses the same day-equivalence rules as payslip computation. Does not
    /// create the cycle or touch any payslip.
    pub async fn attendance_summary(
        &self,
        employee_id: &str,
        month: u32,
        year: i32,
    ) -> PayrollResult<AttendanceReport> {
        let profile = self
            .inner
            .directory
            .get_salary_profile(employee_id)?
            .ok_or_else(|| PayrollError::ProfileMissing {
                employee_id: employee_id.to_string(),
            })?;
        let (start, end) = month_bounds(month, year)?;
        let facts = self
            .inner
            .attendance
            .get_attendance_facts(employee_id, start, end)?;

        let aggregation = aggregate_attendance(&facts, profile.calculation_mode, 1);
        Ok(AttendanceReport {
            employee_id: employee_id.to_string(),
            month,
            year,
            calculation_mode: profile.calculation_mode,
            days: aggregation.days,
            summary: aggregation.summary,
        })
    }

    pub(crate) fn emit(&self, event: AuditEvent) {
        let action = event.action;
        if let Err(e) = self.inner.audit_sink.emit(event) {
            warn!(?action, error = %e, "Audit event not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AllowanceConfig, AttendanceFact, AttendanceStatus, ItemDirection, SalaryProfile,
        ShiftLabel,
    };
    use crate::payroll::{InMemoryAttendanceStore, InMemoryEmployeeDirectory, TracingAuditSink};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
    }

    fn assistant(employee_id: &str) -> SalaryProfile {
        SalaryProfile {
            employee_id: employee_id.to_string(),
            employee_name: format!("Assistant {employee_id}"),
            role: "dental_assistant".to_string(),
            calculation_mode: CalculationMode::Monthly,
            base_salary: dec("9100000"),
            standard_work_days: 26,
            standard_shifts: 0,
            ot_rate_percent: dec("150"),
            over_standard_bonus_rate: Decimal::ZERO,
            late_deduction_rate: dec("2000"),
            insurance_base_amount: None,
            allowances: vec![AllowanceConfig {
                name: "Lunch".to_string(),
                amount: dec("730000"),
                direction: ItemDirection::Income,
                note: None,
            }],
        }
    }

    fn workday(employee_id: &str, day: u32) -> AttendanceFact {
        AttendanceFact {
            employee_id: employee_id.to_string(),
            work_date: date(day),
            check_in: date(day).and_hms_opt(8, 0, 0),
            check_out: date(day).and_hms_opt(17, 0, 0),
            shift: Some(ShiftLabel::FullDay),
            status: AttendanceStatus::OnTime,
            actual_work_hours: None,
            late_minutes: 0,
            early_leave_minutes: 0,
            is_overtime: false,
        }
    }

    fn service_with(
        profiles: Vec<SalaryProfile>,
        facts: Vec<AttendanceFact>,
    ) -> (PayrollService, Arc<InMemoryEmployeeDirectory>) {
        let directory = Arc::new(InMemoryEmployeeDirectory::new());
        for profile in profiles {
            directory.save_profile(profile).unwrap();
        }
        let attendance = Arc::new(InMemoryAttendanceStore::new());
        attendance.record(facts).unwrap();
        let service = PayrollService::new(
            PayrollConfig::default(),
            directory.clone(),
            attendance,
            Arc::new(TracingAuditSink),
        );
        (service, directory)
    }

    #[tokio::test]
    async fn test_calculate_payslip_persists_and_bumps_version() {
        let facts = (2..=7).map(|d| workday("emp_001", d)).collect();
        let (service, _) = service_with(vec![assistant("emp_001")], facts);

        let first = service
            .calculate_payslip("emp_001", 3, 2026, as_of())
            .await
            .unwrap();
        let second = service
            .calculate_payslip("emp_001", 3, 2026, as_of())
            .await
            .unwrap();

        assert_eq!(first.actual_work_days, dec("6"));
        // 9,100,000 / 26 * 6 = 2,100,000
        assert_eq!(first.salary_amount, dec("2100000"));
        assert_eq!(first.allowance_amount, dec("730000"));
        assert_eq!(first.id, second.id);
        assert_eq!(second.version, first.version + 1);
        assert_eq!(first.net_salary, second.net_salary);
    }

    #[tokio::test]
    async fn test_missing_profile_is_reported() {
        let (service, _) = service_with(Vec::new(), Vec::new());
        let result = service
            .calculate_payslip("ghost", 3, 2026, as_of())
            .await;
        assert!(matches!(result, Err(PayrollError::ProfileMissing { .. })));
    }

    #[tokio::test]
    async fn test_run_reports_each_employee_in_order() {
        let (service, directory) = service_with(
            vec![assistant("emp_002"), assistant("emp_001")],
            vec![workday("emp_001", 2), workday("emp_002", 3)],
        );
        directory.enroll("emp_000", "dental_assistant").unwrap();

        let report = service.run_payroll(3, 2026, None, as_of()).await.unwrap();

        let ids: Vec<&str> = report.results.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["emp_000", "emp_001", "emp_002"]);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(matches!(
            &report.result_for("emp_000").unwrap().outcome,
            RunOutcome::Failed { code, .. } if code == "PROFILE_MISSING"
        ));
    }

    #[tokio::test]
    async fn test_concurrent_run_matches_sequential() {
        let profiles: Vec<SalaryProfile> =
            (1..=8).map(|i| assistant(&format!("emp_{i:03}"))).collect();
        let facts: Vec<AttendanceFact> = (1..=8)
            .flat_map(|i| (2..=(2 + i)).map(move |d| workday(&format!("emp_{i:03}"), d)))
            .collect();
        let (service, _) = service_with(profiles, facts);

        let sequential = service.run_payroll(3, 2026, None, as_of()).await.unwrap();
        let concurrent = service
            .run_payroll_concurrent(3, 2026, None, as_of())
            .await
            .unwrap();

        assert_eq!(sequential.results, concurrent.results);
        assert_eq!(concurrent.succeeded(), 8);
    }

    #[tokio::test]
    async fn test_role_filter_limits_run() {
        let mut doctor = assistant("doc_001");
        doctor.role = "doctor".to_string();
        let (service, _) = service_with(vec![assistant("emp_001"), doctor], Vec::new());

        let report = service
            .run_payroll(3, 2026, Some("doctor"), as_of())
            .await
            .unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].employee_id, "doc_001");
    }

    #[tokio::test]
    async fn test_attendance_summary_shares_day_rules() {
        let mut half = workday("doc_001", 3);
        half.shift = Some(ShiftLabel::Morning);
        let mut doctor = assistant("doc_001");
        doctor.calculation_mode = CalculationMode::ShiftBased;
        doctor.standard_work_days = 0;
        doctor.standard_shifts = 48;
        let (service, _) = service_with(vec![doctor], vec![half]);

        let report = service.attendance_summary("doc_001", 3, 2026).await.unwrap();
        assert_eq!(report.days.len(), 1);
        assert_eq!(report.summary.actual_work_days, dec("0.5"));
        assert_eq!(report.calculation_mode, CalculationMode::ShiftBased);
    }
}
