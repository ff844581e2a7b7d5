//! Manual edits to a payslip's ledger.
//!
//! Every edit runs under the cycle's read lock and the payslip's own lock,
//! works on a copy of the snapshot and swaps the copy in only once all
//! totals are recomputed. A rejected edit leaves the stored payslip as it was.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{LEDGER_STEP, PayrollCalculator, net_salary_step, recompute_net_salary};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    AuditAction, AuditEvent, AuditStep, AuditTrace, ItemDirection, LineItemKind,
    PayslipLineItem, PayslipSnapshot,
};

use super::service::PayrollService;
use super::store::PayslipRecord;

/// A manual line item to add to a payslip.
///
/// For deductions named `BHXH`, `BHYT` or `BHTN` the amount is a percentage of
/// the insurance base; for `DEPENDENTS` it is a dependent count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualItemRequest {
    /// Display name.
    pub name: String,
    /// Amount, percentage or count depending on the name.
    pub amount: Decimal,
    /// Income or deduction.
    pub direction: ItemDirection,
    /// Optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

impl PayrollService {
    /// Adds a manual line item and recomputes the payslip's totals.
    ///
    /// Attendance-derived amounts are kept; only the ledger aggregation, tax
    /// and net salary are rerun.
    ///
    /// # Errors
    ///
    /// - [`PayrollError::PayslipNotFound`] if the payslip does not exist
    /// - [`PayrollError::CycleLocked`] if its cycle is finalized
    /// - [`PayrollError::InvalidAmount`] if the amount is negative, or is a
    ///   dependent count too large to represent
    /// - [`PayrollError::InvalidLedgerItem`] if the name is blank or the
    ///   payslip's dependent total would overflow
    pub async fn add_manual_item(
        &self,
        payslip_id: Uuid,
        request: ManualItemRequest,
        actor: &str,
    ) -> PayrollResult<PayslipSnapshot> {
        if request.amount.is_sign_negative() && !request.amount.is_zero() {
            return Err(PayrollError::InvalidAmount {
                field: "line item amount".to_string(),
                amount: request.amount,
            });
        }

        let item = PayslipLineItem::manual(
            request.name.trim(),
            request.amount,
            request.direction,
            request.note,
        );
        if item.name.is_empty() {
            return Err(PayrollError::InvalidLedgerItem {
                item_id: item.id,
                message: "line item name cannot be blank".to_string(),
            });
        }
        if matches!(item.kind, LineItemKind::DependentCount { .. })
            && request.amount.trunc() > Decimal::from(u32::MAX)
        {
            return Err(PayrollError::InvalidAmount {
                field: "dependent count".to_string(),
                amount: request.amount,
            });
        }

        self.edit_payslip(payslip_id, AuditAction::AddManualItem, actor, |snapshot, calc| {
            snapshot.line_items.push(item);
            calc.recompute_totals(snapshot, LEDGER_STEP)
        })
        .await
    }

    /// Removes a manual line item and recomputes the payslip's totals.
    ///
    /// # Errors
    ///
    /// - [`PayrollError::PayslipNotFound`] if the payslip does not exist
    /// - [`PayrollError::CycleLocked`] if its cycle is finalized
    /// - [`PayrollError::InvalidLedgerItem`] if the item does not exist on the
    ///   payslip or is system-generated
    pub async fn remove_manual_item(
        &self,
        payslip_id: Uuid,
        item_id: Uuid,
        actor: &str,
    ) -> PayrollResult<PayslipSnapshot> {
        self.edit_payslip(payslip_id, AuditAction::RemoveManualItem, actor, |snapshot, calc| {
            let position = snapshot
                .line_items
                .iter()
                .position(|item| item.id == item_id)
                .ok_or_else(|| PayrollError::InvalidLedgerItem {
                    item_id,
                    message: "no such line item on this payslip".to_string(),
                })?;

            if snapshot.line_items[position].is_system_generated {
                return Err(PayrollError::InvalidLedgerItem {
                    item_id,
                    message: "system-generated items cannot be removed".to_string(),
                });
            }

            snapshot.line_items.remove(position);
            calc.recompute_totals(snapshot, LEDGER_STEP)
        })
        .await
    }

    /// Overwrites the advance payment and recomputes net salary.
    ///
    /// Gross and all other deductions are taken as already known.
    ///
    /// # Errors
    ///
    /// - [`PayrollError::PayslipNotFound`] if the payslip does not exist
    /// - [`PayrollError::CycleLocked`] if its cycle is finalized
    /// - [`PayrollError::InvalidAmount`] if the amount is negative
    pub async fn set_advance_payment(
        &self,
        payslip_id: Uuid,
        amount: Decimal,
        actor: &str,
    ) -> PayrollResult<PayslipSnapshot> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PayrollError::InvalidAmount {
                field: "advance payment".to_string(),
                amount,
            });
        }

        self.edit_payslip(payslip_id, AuditAction::SetAdvancePayment, actor, |snapshot, _| {
            snapshot.advance_payment = amount;
            recompute_net_salary(snapshot);
            Ok(vec![net_salary_step(snapshot, LEDGER_STEP + 2)])
        })
        .await
    }

    async fn edit_payslip<F>(
        &self,
        payslip_id: Uuid,
        action: AuditAction,
        actor: &str,
        edit: F,
    ) -> PayrollResult<PayslipSnapshot>
    where
        F: FnOnce(&mut PayslipSnapshot, &PayrollCalculator) -> PayrollResult<Vec<AuditStep>>,
    {
        let (entry, employee_id) = self.inner.store.locate(payslip_id).await?;
        let cycle = entry.cycle.read().await;
        cycle.ensure_mutable().inspect_err(|_| {
            warn!(%payslip_id, ?action, actor, "Ledger edit rejected on finalized cycle");
        })?;

        let slot = entry
            .existing_slot(&employee_id)
            .await
            .ok_or(PayrollError::PayslipNotFound { payslip_id })?;
        let mut stored = slot.lock().await;
        let record = stored
            .as_ref()
            .ok_or(PayrollError::PayslipNotFound { payslip_id })?;

        let mut snapshot = record.snapshot.clone();
        let before = snapshot.net_salary;
        let steps = edit(&mut snapshot, &self.inner.calculator)?;
        snapshot.version += 1;
        snapshot.computed_at = Utc::now();
        let audit_trace = merge_trace(&record.audit_trace, steps);
        let after = snapshot.net_salary;

        *stored = Some(PayslipRecord {
            snapshot: snapshot.clone(),
            audit_trace,
        });
        drop(stored);
        let (month, year) = (cycle.month, cycle.year);
        drop(cycle);

        info!(
            %payslip_id,
            ?action,
            actor,
            version = snapshot.version,
            before = %before,
            after = %after,
            "Payslip ledger updated"
        );
        self.emit(AuditEvent {
            actor: actor.to_string(),
            action,
            month,
            year,
            payslip_id: Some(payslip_id),
            before_amount: before,
            after_amount: after,
            occurred_at: Utc::now(),
        });

        Ok(snapshot)
    }
}

/// Replaces steps in `trace` that share a step number with `steps`.
fn merge_trace(trace: &AuditTrace, steps: Vec<AuditStep>) -> AuditTrace {
    let mut merged: Vec<AuditStep> = trace
        .steps
        .iter()
        .filter(|old| steps.iter().all(|new| new.step_number != old.step_number))
        .cloned()
        .collect();
    merged.extend(steps);
    merged.sort_by_key(|step| step.step_number);

    AuditTrace {
        steps: merged,
        warnings: trace.warnings.clone(),
        duration_us: trace.duration_us,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::config::PayrollConfig;
    use crate::models::{
        AllowanceConfig, AttendanceFact, AttendanceStatus, CalculationMode, SalaryProfile,
        ShiftLabel,
    };
    use crate::payroll::{ChannelAuditSink, InMemoryAttendanceStore, InMemoryEmployeeDirectory};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn profile() -> SalaryProfile {
        SalaryProfile {
            employee_id: "emp_001".to_string(),
            employee_name: "Le Thi C".to_string(),
            role: "receptionist".to_string(),
            calculation_mode: CalculationMode::Monthly,
            base_salary: dec("26000000"),
            standard_work_days: 26,
            standard_shifts: 0,
            ot_rate_percent: Decimal::ZERO,
            over_standard_bonus_rate: Decimal::ZERO,
            late_deduction_rate: Decimal::ZERO,
            insurance_base_amount: Some(dec("10000000")),
            allowances: vec![
                AllowanceConfig {
                    name: "Lunch".to_string(),
                    amount: dec("730000"),
                    direction: ItemDirection::Income,
                    note: None,
                },
                AllowanceConfig {
                    name: "BHXH".to_string(),
                    amount: dec("8"),
                    direction: ItemDirection::Deduction,
                    note: None,
                },
            ],
        }
    }

    async fn computed() -> (PayrollService, PayslipSnapshot, UnboundedReceiver<AuditEvent>) {
        let directory = Arc::new(InMemoryEmployeeDirectory::new());
        directory.save_profile(profile()).unwrap();
        let attendance = Arc::new(InMemoryAttendanceStore::new());
        let facts: Vec<AttendanceFact> = (2..=7)
            .map(|day| {
                let date = NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
                AttendanceFact {
                    employee_id: "emp_001".to_string(),
                    work_date: date,
                    check_in: date.and_hms_opt(8, 0, 0),
                    check_out: date.and_hms_opt(17, 0, 0),
                    shift: Some(ShiftLabel::FullDay),
                    status: AttendanceStatus::OnTime,
                    actual_work_hours: None,
                    late_minutes: 0,
                    early_leave_minutes: 0,
                    is_overtime: false,
                }
            })
            .collect();
        attendance.record(facts).unwrap();

        let (sink, events) = ChannelAuditSink::new();
        let service = PayrollService::new(
            PayrollConfig::default(),
            directory,
            attendance,
            Arc::new(sink),
        );
        let snapshot = service
            .calculate_payslip("emp_001", 3, 2026, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap())
            .await
            .unwrap();
        (service, snapshot, events)
    }

    fn deduction(name: &str, amount: &str) -> ManualItemRequest {
        ManualItemRequest {
            name: name.to_string(),
            amount: dec(amount),
            direction: ItemDirection::Deduction,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_add_manual_deduction_updates_net_and_emits_event() {
        let (service, before, mut events) = computed().await;

        let after = service
            .add_manual_item(before.id, deduction("Uniform", "150000"), "hr_admin")
            .await
            .unwrap();

        assert_eq!(after.other_deduction_amount, dec("150000"));
        assert_eq!(after.net_salary, before.net_salary - dec("150000"));
        assert_eq!(after.version, before.version + 1);
        assert_eq!(after.manual_items().count(), 1);

        let event = events.try_recv().unwrap();
        assert_eq!(event.action, AuditAction::AddManualItem);
        assert_eq!(event.payslip_id, Some(before.id));
        assert_eq!(event.before_amount, before.net_salary);
        assert_eq!(event.after_amount, after.net_salary);
    }

    #[tokio::test]
    async fn test_manual_insurance_item_is_percentage_of_base() {
        let (service, before, _) = computed().await;

        let after = service
            .add_manual_item(before.id, deduction("BHYT", "1.5"), "hr_admin")
            .await
            .unwrap();

        // 1.5% of 10,000,000 on top of BHXH 8%
        assert_eq!(after.insurance_deduction, dec("950000"));
        assert_eq!(after.other_deduction_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_manual_dependents_raise_relief() {
        let (service, before, _) = computed().await;

        let after = service
            .add_manual_item(before.id, deduction("DEPENDENTS", "2"), "hr_admin")
            .await
            .unwrap();

        assert_eq!(after.dependent_count, 2);
        assert_eq!(after.family_relief, dec("19800000"));
        assert_eq!(after.other_deduction_amount, Decimal::ZERO);
        assert!(after.tax_deduction <= before.tax_deduction);
    }

    #[tokio::test]
    async fn test_remove_manual_item_restores_totals() {
        let (service, before, _) = computed().await;
        let added = service
            .add_manual_item(before.id, deduction("Uniform", "150000"), "hr_admin")
            .await
            .unwrap();
        let item_id = added.manual_items().next().unwrap().id;

        let removed = service
            .remove_manual_item(before.id, item_id, "hr_admin")
            .await
            .unwrap();

        assert_eq!(removed.net_salary, before.net_salary);
        assert_eq!(removed.manual_items().count(), 0);
        assert_eq!(removed.version, before.version + 2);
    }

    #[tokio::test]
    async fn test_remove_system_item_rejected() {
        let (service, before, _) = computed().await;
        let system_id = before.system_items().next().unwrap().id;

        let result = service
            .remove_manual_item(before.id, system_id, "hr_admin")
            .await;
        assert!(matches!(
            result,
            Err(PayrollError::InvalidLedgerItem { item_id, .. }) if item_id == system_id
        ));

        let stored = service.get_payslip_detail(before.id).await.unwrap().snapshot;
        assert_eq!(stored, before);
    }

    #[tokio::test]
    async fn test_remove_unknown_item_rejected() {
        let (service, before, mut events) = computed().await;

        let result = service
            .remove_manual_item(before.id, Uuid::new_v4(), "hr_admin")
            .await;
        assert!(matches!(result, Err(PayrollError::InvalidLedgerItem { .. })));
        assert!(events.try_recv().is_err());

        let stored = service.get_payslip_detail(before.id).await.unwrap().snapshot;
        assert_eq!(stored.version, before.version);
        assert_eq!(stored.net_salary, before.net_salary);
        assert_eq!(stored.line_items, before.line_items);
    }

    #[tokio::test]
    async fn test_dependent_total_overflow_leaves_payslip_unchanged() {
        let (service, before, _) = computed().await;
        let max = u32::MAX.to_string();

        let first = service
            .add_manual_item(before.id, deduction("DEPENDENTS", &max), "hr_admin")
            .await
            .unwrap();
        assert_eq!(first.dependent_count, u32::MAX);

        let second = service
            .add_manual_item(before.id, deduction("DEPENDENTS", &max), "hr_admin")
            .await;
        assert!(matches!(second, Err(PayrollError::InvalidLedgerItem { .. })));

        let stored = service.get_payslip_detail(before.id).await.unwrap().snapshot;
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_unrepresentable_dependent_count_rejected() {
        let (service, before, _) = computed().await;

        let result = service
            .add_manual_item(before.id, deduction("DEPENDENTS", "4294967296"), "hr_admin")
            .await;
        assert!(matches!(
            result,
            Err(PayrollError::InvalidAmount { ref field, .. }) if field == "dependent count"
        ));
    }

    #[tokio::test]
    async fn test_set_advance_payment_only_moves_net() {
        let (service, before, _) = computed().await;

        let after = service
            .set_advance_payment(before.id, dec("2000000"), "hr_admin")
            .await
            .unwrap();

        assert_eq!(after.advance_payment, dec("2000000"));
        assert_eq!(after.gross_salary, before.gross_salary);
        assert_eq!(after.tax_deduction, before.tax_deduction);
        assert_eq!(after.net_salary, before.net_salary - dec("2000000"));
    }

    #[tokio::test]
    async fn test_negative_amounts_rejected() {
        let (service, before, _) = computed().await;

        let advance = service
            .set_advance_payment(before.id, dec("-1"), "hr_admin")
            .await;
        let item = service
            .add_manual_item(before.id, deduction("Refund", "-100"), "hr_admin")
            .await;

        assert!(matches!(advance, Err(PayrollError::InvalidAmount { .. })));
        assert!(matches!(item, Err(PayrollError::InvalidAmount { .. })));
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let (service, before, _) = computed().await;
        let result = service
            .add_manual_item(before.id, deduction("   ", "100"), "hr_admin")
            .await;
        assert!(matches!(result, Err(PayrollError::InvalidLedgerItem { .. })));
    }

    #[tokio::test]
    async fn test_unknown_payslip_not_found() {
        let (service, _, _) = computed().await;
        let result = service
            .set_advance_payment(Uuid::new_v4(), dec("1"), "hr_admin")
            .await;
        assert!(matches!(result, Err(PayrollError::PayslipNotFound { .. })));
    }

    #[test]
    fn test_merge_trace_replaces_matching_steps() {
        let step = |n: u32, rule: &str| AuditStep {
            step_number: n,
            rule_id: rule.to_string(),
            rule_name: rule.to_string(),
            input: serde_json::Value::Null,
            output: serde_json::Value::Null,
            reasoning: String::new(),
        };
        let trace = AuditTrace {
            steps: vec![step(1, "a"), step(2, "b"), step(3, "c")],
            warnings: Vec::new(),
            duration_us: 10,
        };

        let merged = merge_trace(&trace, vec![step(3, "c2"), step(2, "b2")]);
        let rules: Vec<&str> = merged.steps.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["a", "b2", "c2"]);
    }
}
