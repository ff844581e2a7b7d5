//! Audit models for the payroll engine.
//!
//! [`AuditTrace`] records every calculation decision behind a payslip for the
//! breakdown view. [`AuditEvent`] is the record emitted to the external audit
//! log for finalizations and manual ledger edits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a payslip computation.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// assert!(trace.steps.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// Actions reported to the external audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A cycle was locked.
    FinalizeCycle,
    /// A manual line item was added.
    AddManualItem,
    /// A manual line item was removed.
    RemoveManualItem,
    /// The advance payment was overwritten.
    SetAdvancePayment,
}

/// One event for the external audit log.
///
/// For ledger edits the amounts are the payslip's net salary before and
/// after the change; for finalization they are the cycle's total net salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Who performed the action.
    pub actor: String,
    /// What was done.
    pub action: AuditAction,
    /// The cycle month.
    pub month: u32,
    /// The cycle year.
    pub year: i32,
    /// The payslip affected, if the action targets one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payslip_id: Option<Uuid>,
    /// Amount before the action.
    pub before_amount: Decimal,
    /// Amount after the action.
    pub after_amount: Decimal,
    /// When the action happened.
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 3,
            rule_id: "progressive_tax".to_string(),
            rule_name: "Progressive Income Tax".to_string(),
            input: serde_json::json!({ "taxable_income": "30000000" }),
            output: serde_json::json!({ "tax": "4350000" }),
            reasoning: "4 brackets applied".to_string(),
        };

        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"step_number\":3"));
        assert!(json.contains("\"rule_id\":\"progressive_tax\""));
    }

    #[test]
    fn test_audit_event_omits_missing_payslip() {
        let event = AuditEvent {
            actor: "hr_manager".to_string(),
            action: AuditAction::FinalizeCycle,
            month: 5,
            year: 2026,
            payslip_id: None,
            before_amount: Decimal::new(100, 0),
            after_amount: Decimal::new(100, 0),
            occurred_at: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "finalize_cycle");
        assert!(json.get("payslip_id").is_none());
    }
}
