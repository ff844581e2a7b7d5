//! Late arrival penalty.

use rust_decimal::Decimal;

use crate::models::AuditStep;

use super::rounding::round_money;

/// The result of calculating the late penalty.
#[derive(Debug, Clone)]
pub struct LatePenaltyResult {
    /// Penalty amount, rounded to 2 decimal places.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates `late_deduction_rate * total_late_minutes`.
///
/// A zero rate means lateness is not penalised.
///
/// ```
/// use payroll_engine::calculation::calculate_late_penalty;
/// use rust_decimal::Decimal;
///
/// let result = calculate_late_penalty(Decimal::new(2000, 0), 45, 1);
/// assert_eq!(result.amount, Decimal::new(90_000, 0));
/// ```
pub fn calculate_late_penalty(
    late_deduction_rate: Decimal,
    total_late_minutes: u32,
    step_number: u32,
) -> LatePenaltyResult {
    let amount = round_money(late_deduction_rate * Decimal::from(total_late_minutes));

    let audit_step = AuditStep {
        step_number,
        rule_id: "late_penalty".to_string(),
        rule_name: "Late Penalty".to_string(),
        input: serde_json::json!({
            "late_deduction_rate": late_deduction_rate.normalize().to_string(),
            "total_late_minutes": total_late_minutes
        }),
        output: serde_json::json!({
            "amount": amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} late minutes x {} per minute = {}",
            total_late_minutes,
            late_deduction_rate.normalize(),
            amount.normalize()
        ),
    };

    LatePenaltyResult { amount, audit_step }
}
