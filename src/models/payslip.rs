//! Payslip snapshot and ledger line item models.
//!
//! A [`PayslipSnapshot`] is the computed payslip for one employee in one
//! cycle. It freezes the profile fields it was computed from and owns an
//! ordered list of [`PayslipLineItem`]s.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AllowanceConfig, CalculationMode, ItemDirection};

/// Line item name that carries a dependent count instead of money.
pub const DEPENDENTS_ITEM_NAME: &str = "DEPENDENTS";

/// Statutory insurance schemes whose deduction is a percentage of the insurance base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InsuranceCode {
    /// Social insurance.
    Bhxh,
    /// Health insurance.
    Bhyt,
    /// Unemployment insurance.
    Bhtn,
}

impl InsuranceCode {
    /// Matches a ledger item name against the insurance codes.
    ///
    /// ```
    /// use payroll_engine::models::InsuranceCode;
    ///
    /// assert_eq!(InsuranceCode::from_name("BHYT"), Some(InsuranceCode::Bhyt));
    /// assert_eq!(InsuranceCode::from_name("Parking"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "BHXH" => Some(InsuranceCode::Bhxh),
            "BHYT" => Some(InsuranceCode::Bhyt),
            "BHTN" => Some(InsuranceCode::Bhtn),
            _ => None,
        }
    }

    /// Returns the code as it appears on payslips.
    pub fn as_str(self) -> &'static str {
        match self {
            InsuranceCode::Bhxh => "BHXH",
            InsuranceCode::Bhyt => "BHYT",
            InsuranceCode::Bhtn => "BHTN",
        }
    }
}

/// What a line item's configured value means.
///
/// Names are classified once, when a profile allowance or a manual entry
/// becomes a line item; aggregation dispatches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineItemKind {
    /// A money amount generated from the salary profile.
    Allowance {
        /// The configured amount.
        amount: Decimal,
    },
    /// An insurance deduction expressed as a percentage of the insurance base.
    InsurancePercentage {
        /// The insurance scheme.
        code: InsuranceCode,
        /// Percentage of the insurance base (e.g. 8 for 8%).
        percentage: Decimal,
    },
    /// Number of dependents for family relief; never a money amount.
    DependentCount {
        /// Number of dependents.
        count: u32,
    },
    /// A money amount entered by hand.
    ManualAdjustment {
        /// The entered amount.
        amount: Decimal,
    },
}

impl LineItemKind {
    /// Classifies a named value into its kind.
    ///
    /// Insurance codes and `DEPENDENTS` are only special on the deduction
    /// side. Anything else is an allowance when system-generated and a manual
    /// adjustment otherwise.
    ///
    /// ```
    /// use payroll_engine::models::{InsuranceCode, ItemDirection, LineItemKind};
    /// use rust_decimal::Decimal;
    ///
    /// let eight = Decimal::new(8, 0);
    /// let kind = LineItemKind::classify("BHXH", eight, ItemDirection::Deduction, true);
    /// assert_eq!(
    ///     kind,
    ///     LineItemKind::InsurancePercentage {
    ///         code: InsuranceCode::Bhxh,
    ///         percentage: eight,
    ///     }
    /// );
    /// ```
    pub fn classify(
        name: &str,
        value: Decimal,
        direction: ItemDirection,
        system_generated: bool,
    ) -> Self {
        if direction == ItemDirection::Deduction {
            if let Some(code) = InsuranceCode::from_name(name) {
                return LineItemKind::InsurancePercentage {
                    code,
                    percentage: value,
                };
            }
            if name.trim() == DEPENDENTS_ITEM_NAME {
                return LineItemKind::DependentCount {
                    count: value.trunc().to_u32().unwrap_or(0),
                };
            }
        }

        if system_generated {
            LineItemKind::Allowance { amount: value }
        } else {
            LineItemKind::ManualAdjustment { amount: value }
        }
    }
}

/// One income or deduction entry on a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipLineItem {
    /// Unique identifier for the item.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Income or deduction.
    pub direction: ItemDirection,
    /// What the configured value means.
    pub kind: LineItemKind,
    /// Resolved money amount; recomputed for insurance items, zero for dependents.
    pub amount: Decimal,
    /// True for items generated from the profile's allowance list.
    pub is_system_generated: bool,
    /// Free-form note.
    #[serde(default)]
    pub note: Option<String>,
}

impl PayslipLineItem {
    /// Creates a system-generated item from a profile allowance.
    pub fn system(config: &AllowanceConfig) -> Self {
        Self::new(
            &config.name,
            config.amount,
            config.direction,
            config.note.clone(),
            true,
        )
    }

    /// Creates a manually entered item.
    pub fn manual(
        name: &str,
        value: Decimal,
        direction: ItemDirection,
        note: Option<String>,
    ) -> Self {
        Self::new(name, value, direction, note, false)
    }

    fn new(
        name: &str,
        value: Decimal,
        direction: ItemDirection,
        note: Option<String>,
        is_system_generated: bool,
    ) -> Self {
        let kind = LineItemKind::classify(name, value, direction, is_system_generated);
        let amount = match kind {
            LineItemKind::Allowance { amount } | LineItemKind::ManualAdjustment { amount } => {
                amount
            }
            LineItemKind::InsurancePercentage { .. } | LineItemKind::DependentCount { .. } => {
                Decimal::ZERO
            }
        };

        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            direction,
            kind,
            amount,
            is_system_generated,
            note,
        }
    }
}

/// Tax owed within one progressive bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracketAmount {
    /// Bracket number, starting at 1.
    pub bracket: u8,
    /// Display label (e.g. "Bracket 2 (10%)").
    pub label: String,
    /// Marginal rate as a fraction (e.g. 0.10).
    pub rate: Decimal,
    /// Portion of taxable income falling in this bracket.
    pub taxable_portion: Decimal,
    /// Tax for this bracket, rounded to a whole currency unit.
    pub amount: Decimal,
}

/// The computed payslip for one employee in one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipSnapshot {
    /// Unique identifier for the payslip.
    pub id: Uuid,
    /// The cycle this payslip belongs to.
    pub cycle_id: Uuid,
    /// Cycle month.
    pub month: u32,
    /// Cycle year.
    pub year: i32,
    /// The employee paid.
    pub employee_id: String,
    /// Employee name at computation time.
    pub employee_name: String,
    /// Counting regime used.
    pub calculation_mode: CalculationMode,

    /// Base salary frozen from the profile.
    pub base_salary: Decimal,
    /// Standard work days frozen from the profile.
    pub standard_work_days: u32,
    /// Standard shifts frozen from the profile.
    pub standard_shifts: u32,
    /// Non-Sunday days from cycle start to the computation date.
    pub standard_days_in_period: u32,
    /// Insurance base frozen from the profile.
    pub insurance_base_amount: Decimal,

    /// Day-equivalents worked.
    pub actual_work_days: Decimal,
    /// Qualifying shifts worked.
    pub actual_shifts: u32,
    /// Overtime hours worked.
    pub total_ot_hours: Decimal,
    /// Minutes late across the cycle.
    pub total_late_minutes: u32,

    /// Attendance-based salary.
    pub salary_amount: Decimal,
    /// Over-standard bonus.
    pub bonus_amount: Decimal,
    /// Overtime pay.
    pub ot_salary_amount: Decimal,
    /// Sum of income line items.
    pub allowance_amount: Decimal,
    /// Salary, bonus, overtime and allowances.
    pub gross_salary: Decimal,
    /// Deduction for late minutes.
    pub late_penalty_amount: Decimal,
    /// Sum of insurance line items.
    pub insurance_deduction: Decimal,
    /// Dependents claimed for family relief.
    pub dependent_count: u32,
    /// Self plus dependent relief.
    pub family_relief: Decimal,
    /// Income subject to progressive tax.
    pub taxable_income: Decimal,
    /// Personal income tax.
    pub tax_deduction: Decimal,
    /// Per-bracket tax contributions.
    pub tax_breakdown: Vec<TaxBracketAmount>,
    /// Salary advanced during the cycle.
    pub advance_payment: Decimal,
    /// Deduction line items other than insurance and dependents.
    pub other_deduction_amount: Decimal,
    /// Take-home pay.
    pub net_salary: Decimal,

    /// Ledger entries in display order.
    pub line_items: Vec<PayslipLineItem>,
    /// Bumped on every persisted change.
    pub version: u64,
    /// When the snapshot was last written.
    pub computed_at: DateTime<Utc>,
}

impl PayslipSnapshot {
    /// Returns the system-generated line items.
    pub fn system_items(&self) -> impl Iterator<Item = &PayslipLineItem> {
        self.line_items.iter().filter(|item| item.is_system_generated)
    }

    /// Returns the manually entered line items.
    pub fn manual_items(&self) -> impl Iterator<Item = &PayslipLineItem> {
        self.line_items.iter().filter(|item| !item.is_system_generated)
    }

    /// Finds a line item by id.
    pub fn find_item(&self, item_id: Uuid) -> Option<&PayslipLineItem> {
        self.line_items.iter().find(|item| item.id == item_id)
    }
}
