//! Allowance sync and ledger aggregation.
//!
//! System-generated line items are rebuilt from the profile on every
//! recomputation; manual items are carried over untouched. Aggregation then
//! turns the ledger into income, insurance, other deductions and a dependent
//! count, refreshing each insurance item's money amount from its percentage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};
use crate::models::{AllowanceConfig, AuditStep, ItemDirection, LineItemKind, PayslipLineItem};

use super::rounding::round_money;

/// Totals derived from a payslip's line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Sum of income items.
    pub allowance_income: Decimal,
    /// Sum of insurance deductions.
    pub insurance_deduction: Decimal,
    /// Sum of remaining deduction items.
    pub other_deductions: Decimal,
    /// Dependents claimed.
    pub dependent_count: u32,
}

/// The result of aggregating line items, including the audit step.
#[derive(Debug, Clone)]
pub struct LedgerAggregationResult {
    /// The aggregated totals.
    pub totals: LedgerTotals,
    /// The audit step recording this aggregation.
    pub audit_step: AuditStep,
}

/// Replaces every system-generated item with fresh ones from `allowances`.
///
/// Fresh system items come first, in profile order, followed by the existing
/// manual items in their current order.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::sync_system_items;
/// use payroll_engine::models::{AllowanceConfig, ItemDirection, PayslipLineItem};
/// use rust_decimal::Decimal;
///
/// let bonus = Decimal::new(500_000, 0);
/// let manual = PayslipLineItem::manual("Bonus", bonus, ItemDirection::Income, None);
/// let allowances = vec![AllowanceConfig {
///     name: "Lunch".to_string(),
///     amount: Decimal::new(730_000, 0),
///     direction: ItemDirection::Income,
///     note: None,
/// }];
///
/// let items = sync_system_items(&[manual.clone()], &allowances);
/// assert_eq!(items.len(), 2);
/// assert!(items[0].is_system_generated);
/// assert_eq!(items[1], manual);
/// ```
pub fn sync_system_items(
    existing: &[PayslipLineItem],
    allowances: &[AllowanceConfig],
) -> Vec<PayslipLineItem> {
    allowances
        .iter()
        .map(PayslipLineItem::system)
        .chain(
            existing
                .iter()
                .filter(|item| !item.is_system_generated)
                .cloned(),
        )
        .collect()
}

/// Aggregates line items into ledger totals.
///
/// Insurance items have their `amount` overwritten with
/// `insurance_base * percentage / 100`, rounded to 2 decimal places.
/// Dependent counts never contribute to money totals.
///
/// # Arguments
///
/// * `items` - The payslip's line items; insurance amounts are updated in place
/// * `insurance_base` - The frozen insurance base
/// * `step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// Returns [`PayrollError::InvalidLedgerItem`] if the summed dependent count
/// overflows.
pub fn aggregate_line_items(
    items: &mut [PayslipLineItem],
    insurance_base: Decimal,
    step_number: u32,
) -> PayrollResult<LedgerAggregationResult> {
    let mut totals = LedgerTotals {
        allowance_income: Decimal::ZERO,
        insurance_deduction: Decimal::ZERO,
        other_deductions: Decimal::ZERO,
        dependent_count: 0,
    };
    let mut insurance_json = Vec::new();

    for item in items.iter_mut() {
        match (item.direction, item.kind) {
            (ItemDirection::Income, _) => {
                totals.allowance_income += item.amount;
            }
            (ItemDirection::Deduction, LineItemKind::InsurancePercentage { code, percentage }) => {
                item.amount = round_money(insurance_base * percentage / Decimal::ONE_HUNDRED);
                totals.insurance_deduction += item.amount;
                insurance_json.push(serde_json::json!({
                    "code": code.as_str(),
                    "percentage": percentage.normalize().to_string(),
                    "amount": item.amount.normalize().to_string()
                }));
            }
            (ItemDirection::Deduction, LineItemKind::DependentCount { count }) => {
                let running = totals.dependent_count;
                totals.dependent_count = running.checked_add(count).ok_or_else(|| {
                    PayrollError::InvalidLedgerItem {
                        item_id: item.id,
                        message: format!("dependent count {count} overflows total {running}"),
                    }
                })?;
            }
            (ItemDirection::Deduction, _) => {
                totals.other_deductions += item.amount;
            }
        }
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "ledger_aggregation".to_string(),
        rule_name: "Allowance and Deduction Ledger".to_string(),
        input: serde_json::json!({
            "item_count": items.len(),
            "manual_items": items.iter().filter(|i| !i.is_system_generated).count(),
            "insurance_base": insurance_base.normalize().to_string()
        }),
        output: serde_json::json!({
            "allowance_income": totals.allowance_income.normalize().to_string(),
            "insurance": insurance_json,
            "insurance_deduction": totals.insurance_deduction.normalize().to_string(),
            "other_deductions": totals.other_deductions.normalize().to_string(),
            "dependent_count": totals.dependent_count
        }),
        reasoning: format!(
            "Income {}; insurance {} on base {}; other deductions {}; {} dependent(s)",
            totals.allowance_income.normalize(),
            totals.insurance_deduction.normalize(),
            insurance_base.normalize(),
            totals.other_deductions.normalize(),
            totals.dependent_count
        ),
    };

    Ok(LedgerAggregationResult { totals, audit_step })
}
