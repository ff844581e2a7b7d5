//! Progressive personal income tax.
//!
//! Seven brackets are consumed in order against the remaining taxable income.
//! Each bracket's contribution is rounded to a whole currency unit on its
//! own, and the total is the sum of those rounded contributions.
//!
//! | Bracket | Width            | Rate |
//! |---------|------------------|------|
//! | 1       | first 5,000,000  | 5%   |
//! | 2       | next 5,000,000   | 10%  |
//! | 3       | next 8,000,000   | 15%  |
//! | 4       | next 14,000,000  | 20%  |
//! | 5       | next 20,000,000  | 25%  |
//! | 6       | next 28,000,000  | 30%  |
//! | 7       | remainder        | 35%  |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, TaxBracketAmount};

use super::rounding::round_whole;

/// One progressive tax bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxBracket {
    /// Width of the bracket; `None` for the open-ended top bracket.
    pub width: Option<Decimal>,
    /// Marginal rate as a fraction.
    pub rate: Decimal,
}

/// The fixed bracket table.
pub const TAX_BRACKETS: [TaxBracket; 7] = [
    TaxBracket {
        width: Some(Decimal::from_parts(5_000_000, 0, 0, false, 0)),
        rate: Decimal::from_parts(5, 0, 0, false, 2),
    },
    TaxBracket {
        width: Some(Decimal::from_parts(5_000_000, 0, 0, false, 0)),
        rate: Decimal::from_parts(10, 0, 0, false, 2),
    },
    TaxBracket {
        width: Some(Decimal::from_parts(8_000_000, 0, 0, false, 0)),
        rate: Decimal::from_parts(15, 0, 0, false, 2),
    },
    TaxBracket {
        width: Some(Decimal::from_parts(14_000_000, 0, 0, false, 0)),
        rate: Decimal::from_parts(20, 0, 0, false, 2),
    },
    TaxBracket {
        width: Some(Decimal::from_parts(20_000_000, 0, 0, false, 0)),
        rate: Decimal::from_parts(25, 0, 0, false, 2),
    },
    TaxBracket {
        width: Some(Decimal::from_parts(28_000_000, 0, 0, false, 0)),
        rate: Decimal::from_parts(30, 0, 0, false, 2),
    },
    TaxBracket {
        width: None,
        rate: Decimal::from_parts(35, 0, 0, false, 2),
    },
];

/// Tax owed on a taxable income, with the per-bracket breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveTaxResult {
    /// The taxable income the tax was computed on.
    pub taxable_income: Decimal,
    /// Sum of the rounded bracket amounts.
    pub total: Decimal,
    /// Contributions of the brackets the income reached.
    pub brackets: Vec<TaxBracketAmount>,
}

impl ProgressiveTaxResult {
    /// Builds the audit step for this tax computation.
    pub fn audit_step(&self, step_number: u32) -> AuditStep {
        let bracket_json: Vec<serde_json::Value> = self
            .brackets
            .iter()
            .map(|b| {
                serde_json::json!({
                    "bracket": b.bracket,
                    "rate": b.rate.normalize().to_string(),
                    "taxable_portion": b.taxable_portion.normalize().to_string(),
                    "amount": b.amount.normalize().to_string()
                })
            })
            .collect();

        AuditStep {
            step_number,
            rule_id: "progressive_tax".to_string(),
            rule_name: "Progressive Income Tax".to_string(),
            input: serde_json::json!({
                "taxable_income": self.taxable_income.normalize().to_string()
            }),
            output: serde_json::json!({
                "brackets": bracket_json,
                "total": self.total.normalize().to_string()
            }),
            reasoning: format!(
                "Taxable income {} spans {} bracket(s); bracket amounts rounded individually sum to {}",
                self.taxable_income.normalize(),
                self.brackets.len(),
                self.total.normalize()
            ),
        }
    }
}

/// Computes progressive tax on `taxable_income`.
///
/// Negative income is treated as zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_progressive_tax;
/// use rust_decimal::Decimal;
///
/// let result = calculate_progressive_tax(Decimal::new(30_000_000, 0));
/// assert_eq!(result.total, Decimal::new(4_350_000, 0));
/// assert_eq!(result.brackets.len(), 4);
/// ```
pub fn calculate_progressive_tax(taxable_income: Decimal) -> ProgressiveTaxResult {
    let taxable_income = taxable_income.max(Decimal::ZERO);
    let mut remaining = taxable_income;
    let mut brackets = Vec::new();

    for (index, bracket) in TAX_BRACKETS.iter().enumerate() {
        if remaining <= Decimal::ZERO {
            break;
        }

        let portion = match bracket.width {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        let number = (index + 1) as u8;

        brackets.push(TaxBracketAmount {
            bracket: number,
            label: format!(
                "Bracket {} ({}%)",
                number,
                (bracket.rate * Decimal::ONE_HUNDRED).normalize()
            ),
            rate: bracket.rate,
            taxable_portion: portion,
            amount: round_whole(portion * bracket.rate),
        });

        remaining -= portion;
    }

    let total = brackets.iter().map(|b| b.amount).sum();

    ProgressiveTaxResult {
        taxable_income,
        total,
        brackets,
    }
}
