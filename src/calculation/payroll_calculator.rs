//! Payslip computation for one employee in one cycle.
//!
//! [`PayrollCalculator::calculate`] runs the full pipeline: attendance
//! aggregation, base salary and bonus, overtime, late penalty, allowance sync,
//! ledger aggregation, progressive tax and net salary. Ledger edits reuse only
//! the aggregation half through [`PayrollCalculator::recompute_totals`].

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::config::PayrollConfig;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    AttendanceFact, AuditStep, AuditTrace, PayslipSnapshot, SalaryCycle, SalaryProfile,
};

use super::attendance_aggregator::{aggregate_attendance, standard_days_in_period};
use super::base_salary::calculate_base_salary;
use super::late_penalty::calculate_late_penalty;
use super::line_items::{aggregate_line_items, sync_system_items};
use super::overtime::calculate_overtime_pay;
use super::progressive_tax::calculate_progressive_tax;
use super::rounding::round_money;

/// Step number of the first ledger-dependent audit step.
///
/// Steps before it depend on attendance; steps from it onwards are rebuilt by
/// [`PayrollCalculator::recompute_totals`].
pub const LEDGER_STEP: u32 = 5;

/// Everything needed to compute one payslip.
#[derive(Debug, Clone, Copy)]
pub struct PayrollInput<'a> {
    /// The cycle being computed; must be DRAFT.
    pub cycle: &'a SalaryCycle,
    /// The employee's current salary profile.
    pub profile: &'a SalaryProfile,
    /// The employee's attendance facts for the cycle.
    pub facts: &'a [AttendanceFact],
    /// The previously persisted snapshot, if any.
    pub previous: Option<&'a PayslipSnapshot>,
    /// The date the standard days in period are counted up to.
    pub as_of: NaiveDate,
}

/// A computed payslip together with the trace of how it was computed.
#[derive(Debug, Clone)]
pub struct PayrollCalculation {
    /// The new snapshot, ready to persist.
    pub snapshot: PayslipSnapshot,
    /// Every calculation step behind the snapshot.
    pub audit_trace: AuditTrace,
}

/// Computes payslips against an explicit [`PayrollConfig`].
#[derive(Debug, Clone)]
pub struct PayrollCalculator {
    config: PayrollConfig,
}

impl PayrollCalculator {
    /// Creates a calculator using `config`.
    pub fn new(config: PayrollConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Computes or recomputes a payslip.
    ///
    /// Profile fields are frozen into the new snapshot. When a previous
    /// snapshot is given its id, manual line items and advance payment carry
    /// over and its version is bumped; system-generated items are rebuilt.
    ///
    /// # Errors
    ///
    /// - [`PayrollError::CycleLocked`] if the cycle is finalized
    /// - [`PayrollError::CalculationError`] if `previous` belongs to a
    ///   different employee or cycle
    pub fn calculate(&self, input: PayrollInput<'_>) -> PayrollResult<PayrollCalculation> {
        let start_time = Instant::now();
        let PayrollInput {
            cycle,
            profile,
            facts,
            previous,
            as_of,
        } = input;

        cycle.ensure_mutable()?;

        if let Some(prev) = previous {
            if prev.employee_id != profile.employee_id || prev.cycle_id != cycle.id {
                return Err(PayrollError::CalculationError {
                    message: format!(
                        "payslip {} belongs to employee '{}' in cycle {}, not '{}' in cycle {}",
                        prev.id, prev.employee_id, prev.cycle_id, profile.employee_id, cycle.id
                    ),
                });
            }
        }

        let in_cycle: Vec<AttendanceFact> = facts
            .iter()
            .filter(|f| f.employee_id == profile.employee_id && cycle.contains_date(f.work_date))
            .cloned()
            .collect();

        let mut steps = Vec::new();
        let mut warnings = Vec::new();

        let attendance = aggregate_attendance(&in_cycle, profile.calculation_mode, 1);
        let summary = attendance.summary;
        steps.push(attendance.audit_step);

        let standard_days = standard_days_in_period(cycle.start_date, cycle.end_date, as_of);

        let base = calculate_base_salary(
            profile.calculation_mode,
            profile.base_salary,
            profile.standard_work_days,
            standard_days,
            summary.actual_work_days,
            2,
        );
        steps.push(base.audit_step);
        warnings.extend(base.warning);

        let overtime = calculate_overtime_pay(
            profile.base_salary,
            standard_days,
            self.config.standard_hours_per_day(),
            summary.total_ot_hours,
            profile.ot_rate_percent,
            3,
        );
        steps.push(overtime.audit_step);

        let late = calculate_late_penalty(
            profile.late_deduction_rate,
            summary.total_late_minutes,
            4,
        );
        steps.push(late.audit_step);

        let previous_items = previous.map(|p| p.line_items.as_slice()).unwrap_or(&[]);
        let line_items = sync_system_items(previous_items, &profile.allowances);

        let mut snapshot = PayslipSnapshot {
            id: previous.map(|p| p.id).unwrap_or_else(Uuid::new_v4),
            cycle_id: cycle.id,
            month: cycle.month,
            year: cycle.year,
            employee_id: profile.employee_id.clone(),
            employee_name: profile.employee_name.clone(),
            calculation_mode: profile.calculation_mode,
            base_salary: profile.base_salary,
            standard_work_days: profile.standard_work_days,
            standard_shifts: profile.standard_shifts,
            standard_days_in_period: standard_days,
            insurance_base_amount: profile.insurance_base(),
            actual_work_days: summary.actual_work_days,
            actual_shifts: summary.actual_shifts,
            total_ot_hours: summary.total_ot_hours,
            total_late_minutes: summary.total_late_minutes,
            salary_amount: base.salary_amount,
            bonus_amount: base.bonus_amount,
            ot_salary_amount: overtime.amount,
            allowance_amount: Decimal::ZERO,
            gross_salary: Decimal::ZERO,
            late_penalty_amount: late.amount,
            insurance_deduction: Decimal::ZERO,
            dependent_count: 0,
            family_relief: Decimal::ZERO,
            taxable_income: Decimal::ZERO,
            tax_deduction: Decimal::ZERO,
            tax_breakdown: Vec::new(),
            advance_payment: previous.map(|p| p.advance_payment).unwrap_or(Decimal::ZERO),
            other_deduction_amount: Decimal::ZERO,
            net_salary: Decimal::ZERO,
            line_items,
            version: previous.map(|p| p.version + 1).unwrap_or(1),
            computed_at: Utc::now(),
        };

        steps.extend(self.recompute_totals(&mut snapshot, LEDGER_STEP)?);

        debug!(
            employee_id = %snapshot.employee_id,
            month = snapshot.month,
            year = snapshot.year,
            standard_days,
            gross = %snapshot.gross_salary,
            net = %snapshot.net_salary,
            "Payslip computed"
        );

        Ok(PayrollCalculation {
            snapshot,
            audit_trace: AuditTrace {
                steps,
                warnings,
                duration_us: start_time.elapsed().as_micros() as u64,
            },
        })
    }

    /// Re-derives every ledger-dependent total on `snapshot`.
    ///
    /// Attendance-derived amounts (salary, bonus, overtime, late penalty) are
    /// taken as already computed. Returns the audit steps, numbered from
    /// `start_step`.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::InvalidLedgerItem`] if the ledger cannot be
    /// aggregated.
    pub fn recompute_totals(
        &self,
        snapshot: &mut PayslipSnapshot,
        start_step: u32,
    ) -> PayrollResult<Vec<AuditStep>> {
        let ledger = aggregate_line_items(
            &mut snapshot.line_items,
            snapshot.insurance_base_amount,
            start_step,
        )?;
        let totals = ledger.totals;

        snapshot.allowance_amount = round_money(totals.allowance_income);
        snapshot.insurance_deduction = round_money(totals.insurance_deduction);
        snapshot.other_deduction_amount = round_money(totals.other_deductions);
        snapshot.dependent_count = totals.dependent_count;

        snapshot.gross_salary = round_money(
            snapshot.salary_amount
                + snapshot.bonus_amount
                + snapshot.ot_salary_amount
                + snapshot.allowance_amount,
        );
        snapshot.family_relief = self.config.family_relief(totals.dependent_count);
        snapshot.taxable_income = (snapshot.gross_salary
            - snapshot.insurance_deduction
            - snapshot.family_relief)
            .max(Decimal::ZERO);

        let tax = calculate_progressive_tax(snapshot.taxable_income);
        snapshot.tax_deduction = tax.total;
        snapshot.tax_breakdown = tax.brackets.clone();

        recompute_net_salary(snapshot);
        let net_step = net_salary_step(snapshot, start_step + 2);

        Ok(vec![ledger.audit_step, tax.audit_step(start_step + 1), net_step])
    }
}

/// Builds the audit step for the snapshot's current gross and net salary.
pub(crate) fn net_salary_step(snapshot: &PayslipSnapshot, step_number: u32) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "net_salary".to_string(),
        rule_name: "Gross and Net Salary".to_string(),
        input: serde_json::json!({
            "salary_amount": snapshot.salary_amount.normalize().to_string(),
            "bonus_amount": snapshot.bonus_amount.normalize().to_string(),
            "ot_salary_amount": snapshot.ot_salary_amount.normalize().to_string(),
            "allowance_amount": snapshot.allowance_amount.normalize().to_string(),
            "family_relief": snapshot.family_relief.normalize().to_string(),
            "advance_payment": snapshot.advance_payment.normalize().to_string()
        }),
        output: serde_json::json!({
            "gross_salary": snapshot.gross_salary.normalize().to_string(),
            "taxable_income": snapshot.taxable_income.normalize().to_string(),
            "net_salary": snapshot.net_salary.normalize().to_string()
        }),
        reasoning: format!(
            "Gross {} - insurance {} - tax {} - late {} - other {} - advance {} = net {}",
            snapshot.gross_salary.normalize(),
            snapshot.insurance_deduction.normalize(),
            snapshot.tax_deduction.normalize(),
            snapshot.late_penalty_amount.normalize(),
            snapshot.other_deduction_amount.normalize(),
            snapshot.advance_payment.normalize(),
            snapshot.net_salary.normalize()
        ),
    }
}

/// Recomputes net salary from the snapshot's known gross and deductions.
///
/// Used on its own when only the advance payment changes.
pub fn recompute_net_salary(snapshot: &mut PayslipSnapshot) -> Decimal {
    snapshot.net_salary = round_money(
        snapshot.gross_salary
            - snapshot.insurance_deduction
            - snapshot.tax_deduction
            - snapshot.late_penalty_amount
            - snapshot.other_deduction_amount
            - snapshot.advance_payment,
    );
    snapshot.net_salary
}
