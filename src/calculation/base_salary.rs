//! Base salary and over-standard bonus calculation.
//!
//! ## Formulas
//!
//! - **Monthly**: `base / standard_work_days * actual_work_days`
//! - **Shift-based, at or under standard**: `base / standard_days_in_period * actual_work_days`
//! - **Shift-based, over standard**: salary is the full base; the bonus is
//!   `(actual_work_days - standard_days_in_period) * (base / standard_days_in_period)`

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{AuditStep, AuditWarning, CalculationMode};

use super::rounding::round_money;

/// The result of calculating base salary and bonus.
#[derive(Debug, Clone)]
pub struct BaseSalaryResult {
    /// Attendance-based salary, rounded to 2 decimal places.
    pub salary_amount: Decimal,
    /// Over-standard bonus, rounded to 2 decimal places.
    pub bonus_amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
    /// Set when the denominator was zero and pay could not be prorated.
    pub warning: Option<AuditWarning>,
}

/// Calculates the attendance-based salary and any over-standard bonus.
///
/// # Arguments
///
/// * `mode` - The employee's calculation mode
/// * `base_salary` - Monthly base salary frozen from the profile
/// * `standard_work_days` - Standard days from the profile (monthly mode)
/// * `standard_days_in_period` - Non-Sunday days elapsed in the cycle (shift-based mode)
/// * `actual_work_days` - Day-equivalents worked
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_base_salary;
/// use payroll_engine::models::CalculationMode;
/// use rust_decimal::Decimal;
///
/// let result = calculate_base_salary(
///     CalculationMode::ShiftBased,
///     Decimal::new(20_000_000, 0),
///     0,
///     20,
///     Decimal::new(22, 0),
///     1,
/// );
/// assert_eq!(result.salary_amount, Decimal::new(20_000_000, 0));
/// assert_eq!(result.bonus_amount, Decimal::new(2_000_000, 0));
/// ```
pub fn calculate_base_salary(
    mode: CalculationMode,
    base_salary: Decimal,
    standard_work_days: u32,
    standard_days_in_period: u32,
    actual_work_days: Decimal,
    step_number: u32,
) -> BaseSalaryResult {
    let denominator = match mode {
        CalculationMode::Monthly => standard_work_days,
        CalculationMode::ShiftBased => standard_days_in_period,
    };

    if denominator == 0 {
        warn!(
            ?mode,
            "Standard day denominator is zero; salary and bonus set to zero"
        );
        return BaseSalaryResult {
            salary_amount: Decimal::ZERO,
            bonus_amount: Decimal::ZERO,
            audit_step: AuditStep {
                step_number,
                rule_id: "base_salary".to_string(),
                rule_name: "Base Salary".to_string(),
                input: serde_json::json!({
                    "base_salary": base_salary.normalize().to_string(),
                    "standard_days": 0,
                    "actual_work_days": actual_work_days.normalize().to_string()
                }),
                output: serde_json::json!({
                    "salary_amount": "0",
                    "bonus_amount": "0"
                }),
                reasoning: "No standard days to prorate against; salary is zero".to_string(),
            },
            warning: Some(AuditWarning {
                code: "ZERO_STANDARD_DAYS".to_string(),
                message: "Standard days for the period is zero; base salary not prorated"
                    .to_string(),
                severity: "high".to_string(),
            }),
        };
    }

    let standard = Decimal::from(denominator);
    let daily_rate = base_salary / standard;

    let (salary_amount, bonus_amount, reasoning) = match mode {
        CalculationMode::Monthly => {
            let salary = round_money(daily_rate * actual_work_days);
            (
                salary,
                Decimal::ZERO,
                format!(
                    "{} / {} standard work days x {} days worked = {}",
                    base_salary.normalize(),
                    denominator,
                    actual_work_days.normalize(),
                    salary.normalize()
                ),
            )
        }
        CalculationMode::ShiftBased if actual_work_days <= standard => {
            let salary = round_money(daily_rate * actual_work_days);
            (
                salary,
                Decimal::ZERO,
                format!(
                    "{} / {} standard days in period x {} day-equivalents = {}",
                    base_salary.normalize(),
                    denominator,
                    actual_work_days.normalize(),
                    salary.normalize()
                ),
            )
        }
        CalculationMode::ShiftBased => {
            let extra_days = actual_work_days - standard;
            let bonus = round_money(extra_days * daily_rate);
            (
                round_money(base_salary),
                bonus,
                format!(
                    "{} day-equivalents exceed {} standard days; full base {} plus {} extra days x {} = {} bonus",
                    actual_work_days.normalize(),
                    denominator,
                    base_salary.normalize(),
                    extra_days.normalize(),
                    round_money(daily_rate).normalize(),
                    bonus.normalize()
                ),
            )
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "base_salary".to_string(),
        rule_name: "Base Salary".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.normalize().to_string(),
            "standard_days": denominator,
            "actual_work_days": actual_work_days.normalize().to_string()
        }),
        output: serde_json::json!({
            "daily_rate": round_money(daily_rate).normalize().to_string(),
            "salary_amount": salary_amount.normalize().to_string(),
            "bonus_amount": bonus_amount.normalize().to_string()
        }),
        reasoning,
    };

    BaseSalaryResult {
        salary_amount,
        bonus_amount,
        audit_step,
        warning: None,
    }
}
