//! Overtime pay calculation.
//!
//! The hourly rate is the base salary spread over the standard days in the
//! period and the standard hours per day; overtime is paid at a configured
//! percentage of it.

use rust_decimal::Decimal;

use crate::models::AuditStep;

use super::rounding::round_money;

/// The result of calculating overtime pay.
#[derive(Debug, Clone)]
pub struct OvertimePayResult {
    /// Hourly rate the overtime was priced at, before the overtime percentage.
    pub hourly_rate: Decimal,
    /// Overtime pay, rounded to 2 decimal places.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates overtime pay.
///
/// Returns zero when there are no overtime hours, no configured rate, or no
/// standard days to derive an hourly rate from.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_overtime_pay;
/// use rust_decimal::Decimal;
///
/// // 20,000,000 / 20 days / 8 hours = 125,000 per hour; 4h at 150% = 750,000
/// let result = calculate_overtime_pay(
///     Decimal::new(20_000_000, 0),
///     20,
///     Decimal::new(8, 0),
///     Decimal::new(4, 0),
///     Decimal::new(150, 0),
///     1,
/// );
/// assert_eq!(result.amount, Decimal::new(750_000, 0));
/// ```
pub fn calculate_overtime_pay(
    base_salary: Decimal,
    standard_days_in_period: u32,
    hours_per_day: Decimal,
    total_ot_hours: Decimal,
    ot_rate_percent: Decimal,
    step_number: u32,
) -> OvertimePayResult {
    let payable = total_ot_hours > Decimal::ZERO
        && ot_rate_percent > Decimal::ZERO
        && standard_days_in_period > 0
        && hours_per_day > Decimal::ZERO;

    let (hourly_rate, amount, reasoning) = if payable {
        let hourly_rate = base_salary / Decimal::from(standard_days_in_period) / hours_per_day;
        let amount =
            round_money(hourly_rate * total_ot_hours * (ot_rate_percent / Decimal::ONE_HUNDRED));
        (
            hourly_rate,
            amount,
            format!(
                "{} / {} days / {} hours = {} per hour; {} OT hours x {}% = {}",
                base_salary.normalize(),
                standard_days_in_period,
                hours_per_day.normalize(),
                round_money(hourly_rate).normalize(),
                total_ot_hours.normalize(),
                ot_rate_percent.normalize(),
                amount.normalize()
            ),
        )
    } else {
        (
            Decimal::ZERO,
            Decimal::ZERO,
            if total_ot_hours <= Decimal::ZERO {
                "No overtime hours recorded".to_string()
            } else if ot_rate_percent <= Decimal::ZERO {
                "No overtime rate configured".to_string()
            } else {
                "No standard days to derive an hourly rate from".to_string()
            },
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime_pay".to_string(),
        rule_name: "Overtime Pay".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.normalize().to_string(),
            "standard_days_in_period": standard_days_in_period,
            "hours_per_day": hours_per_day.normalize().to_string(),
            "total_ot_hours": total_ot_hours.normalize().to_string(),
            "ot_rate_percent": ot_rate_percent.normalize().to_string()
        }),
        output: serde_json::json!({
            "hourly_rate": round_money(hourly_rate).normalize().to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    OvertimePayResult {
        hourly_rate,
        amount,
        audit_step,
    }
}
