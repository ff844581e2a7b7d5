//! Salary profile model and related types.
//!
//! This module defines the long-lived, per-employee [`SalaryProfile`] that HR
//! maintains, together with the allowance configuration attached to it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PayrollConfig;
use crate::error::{PayrollError, PayrollResult};

/// How an employee's attendance is converted into pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    /// Fixed-day employees paid against a standard number of work days.
    Monthly,
    /// Shift-based staff (doctors) paid by day-equivalents of qualifying shifts.
    ShiftBased,
}

/// Whether a ledger entry adds to or subtracts from pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemDirection {
    /// Adds to gross salary.
    Income,
    /// Subtracted after gross salary is known.
    Deduction,
}

/// An allowance or deduction configured on a salary profile.
///
/// Every recomputation turns each config into a fresh system-generated
/// payslip line item.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{AllowanceConfig, ItemDirection};
/// use rust_decimal::Decimal;
///
/// let lunch = AllowanceConfig {
///     name: "Lunch".to_string(),
///     amount: Decimal::new(730_000, 0),
///     direction: ItemDirection::Income,
///     note: None,
/// };
/// assert_eq!(lunch.direction, ItemDirection::Income);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceConfig {
    /// Display name; insurance codes and `DEPENDENTS` carry special meaning.
    pub name: String,
    /// Money amount, insurance percentage, or dependent count depending on name.
    pub amount: Decimal,
    /// Income or deduction.
    pub direction: ItemDirection,
    /// Free-form note copied onto the generated line item.
    #[serde(default)]
    pub note: Option<String>,
}

/// Per-employee salary configuration maintained by HR.
///
/// Exactly one of `standard_work_days` (MONTHLY) and `standard_shifts`
/// (SHIFT_BASED) is non-zero; [`SalaryProfile::validate`] enforces this at
/// save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryProfile {
    /// Unique identifier of the employee.
    pub employee_id: String,
    /// Display name used for payslip search.
    pub employee_name: String,
    /// Role used for payable-employee filtering and role defaults.
    pub role: String,
    /// Counting regime for attendance.
    pub calculation_mode: CalculationMode,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Standard work days per month (MONTHLY only).
    #[serde(default)]
    pub standard_work_days: u32,
    /// Standard shift count per month (SHIFT_BASED only).
    #[serde(default)]
    pub standard_shifts: u32,
    /// Overtime rate as a percentage of the hourly rate (e.g. 150).
    #[serde(default)]
    pub ot_rate_percent: Decimal,
    /// Bonus rate per shift worked beyond the standard.
    #[serde(default)]
    pub over_standard_bonus_rate: Decimal,
    /// Currency deducted per minute late.
    #[serde(default)]
    pub late_deduction_rate: Decimal,
    /// Base for insurance percentages; falls back to the base salary.
    #[serde(default)]
    pub insurance_base_amount: Option<Decimal>,
    /// Allowances and deductions, in display order.
    #[serde(default)]
    pub allowances: Vec<AllowanceConfig>,
}

impl SalaryProfile {
    /// Builds a profile from the role default table in `config`.
    ///
    /// Returns [`PayrollError::ProfileMissing`] when the role has no defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::ConfigLoader;
    /// use payroll_engine::models::{CalculationMode, SalaryProfile};
    ///
    /// let config = ConfigLoader::load("./config")?.into_config();
    /// let profile =
    ///     SalaryProfile::from_role_defaults("emp_007", "Tran Van B", "doctor", &config)?;
    /// assert_eq!(profile.calculation_mode, CalculationMode::ShiftBased);
    /// # Ok::<(), payroll_engine::error::PayrollError>(())
    /// ```
    pub fn from_role_defaults(
        employee_id: &str,
        employee_name: &str,
        role: &str,
        config: &PayrollConfig,
    ) -> PayrollResult<Self> {
        let defaults = config
            .role_defaults(role)
            .ok_or_else(|| PayrollError::ProfileMissing {
                employee_id: employee_id.to_string(),
            })?;

        let profile = Self {
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            role: role.to_string(),
            calculation_mode: defaults.calculation_mode,
            base_salary: defaults.base_salary,
            standard_work_days: defaults.standard_work_days,
            standard_shifts: defaults.standard_shifts,
            ot_rate_percent: defaults.ot_rate_percent,
            over_standard_bonus_rate: defaults.over_standard_bonus_rate,
            late_deduction_rate: defaults.late_deduction_rate,
            insurance_base_amount: None,
            allowances: defaults.allowances.clone(),
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Returns the amount insurance percentages apply to.
    pub fn insurance_base(&self) -> Decimal {
        self.insurance_base_amount.unwrap_or(self.base_salary)
    }

    /// Checks the profile invariants.
    ///
    /// Exactly one of standard work days and standard shifts must be set, and
    /// it must be the one the calculation mode counts against. Monetary fields
    /// may not be negative.
    pub fn validate(&self) -> PayrollResult<()> {
        let inconsistent = |message: &str| PayrollError::InconsistentProfile {
            employee_id: self.employee_id.clone(),
            message: message.to_string(),
        };

        match (self.standard_work_days > 0, self.standard_shifts > 0) {
            (true, true) => {
                return Err(inconsistent(
                    "standard work days and standard shifts are both set",
                ));
            }
            (false, false) => {
                return Err(inconsistent(
                    "one of standard work days or standard shifts must be set",
                ));
            }
            (true, false) if self.calculation_mode == CalculationMode::ShiftBased => {
                return Err(inconsistent(
                    "shift-based profiles must set standard shifts, not work days",
                ));
            }
            (false, true) if self.calculation_mode == CalculationMode::Monthly => {
                return Err(inconsistent(
                    "monthly profiles must set standard work days, not shifts",
                ));
            }
            _ => {}
        }

        let negative = [
            ("base salary", self.base_salary),
            ("overtime rate", self.ot_rate_percent),
            ("over-standard bonus rate", self.over_standard_bonus_rate),
            ("late deduction rate", self.late_deduction_rate),
            ("insurance base", self.insurance_base()),
        ]
        .into_iter()
        .find(|(_, value)| value.is_sign_negative() && !value.is_zero());

        if let Some((field, _)) = negative {
            return Err(inconsistent(&format!("{} cannot be negative", field)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoleSalaryDefaults;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn monthly_profile() -> SalaryProfile {
        SalaryProfile {
            employee_id: "emp_001".to_string(),
            employee_name: "Nguyen Thi A".to_string(),
            role: "receptionist".to_string(),
            calculation_mode: CalculationMode::Monthly,
            base_salary: dec("8000000"),
            standard_work_days: 26,
            standard_shifts: 0,
            ot_rate_percent: dec("150"),
            over_standard_bonus_rate: Decimal::ZERO,
            late_deduction_rate: dec("2000"),
            insurance_base_amount: None,
            allowances: vec![],
        }
    }

    #[test]
    fn test_valid_monthly_profile_passes() {
        assert!(monthly_profile().validate().is_ok());
    }

    #[test]
    fn test_both_standards_set_is_inconsistent() {
        let mut profile = monthly_profile();
        profile.standard_shifts = 40;

        let err = profile.validate().unwrap_err();
        assert!(matches!(err, PayrollError::InconsistentProfile { .. }));
        assert!(err.to_string().contains("both set"));
    }

    #[test]
    fn test_neither_standard_set_is_inconsistent() {
        let mut profile = monthly_profile();
        profile.standard_work_days = 0;

        assert!(matches!(
            profile.validate(),
            Err(PayrollError::InconsistentProfile { .. })
        ));
    }

    #[test]
    fn test_shift_based_with_work_days_is_inconsistent() {
        let mut profile = monthly_profile();
        profile.calculation_mode = CalculationMode::ShiftBased;

        assert!(matches!(
            profile.validate(),
            Err(PayrollError::InconsistentProfile { .. })
        ));
    }

    #[test]
    fn test_negative_base_salary_rejected() {
        let mut profile = monthly_profile();
        profile.base_salary = dec("-1");

        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("base salary cannot be negative"));
    }

    #[test]
    fn test_insurance_base_defaults_to_base_salary() {
        let mut profile = monthly_profile();
        assert_eq!(profile.insurance_base(), dec("8000000"));

        profile.insurance_base_amount = Some(dec("5000000"));
        assert_eq!(profile.insurance_base(), dec("5000000"));
    }

    #[test]
    fn test_from_role_defaults_copies_role_table_entry() {
        let config = PayrollConfig::default().with_role_defaults(
            "hygienist",
            RoleSalaryDefaults {
                calculation_mode: CalculationMode::Monthly,
                base_salary: dec("12000000"),
                standard_work_days: 24,
                standard_shifts: 0,
                ot_rate_percent: dec("150"),
                over_standard_bonus_rate: Decimal::ZERO,
                late_deduction_rate: dec("1000"),
                allowances: vec![AllowanceConfig {
                    name: "BHYT".to_string(),
                    amount: dec("1.5"),
                    direction: ItemDirection::Deduction,
                    note: None,
                }],
            },
        );

        let profile =
            SalaryProfile::from_role_defaults("emp_010", "Pham D", "hygienist", &config).unwrap();
        assert_eq!(profile.role, "hygienist");
        assert_eq!(profile.base_salary, dec("12000000"));
        assert_eq!(profile.standard_work_days, 24);
        assert_eq!(profile.insurance_base(), dec("12000000"));
        assert_eq!(profile.allowances.len(), 1);
    }

    #[test]
    fn test_inconsistent_role_defaults_rejected() {
        let config = PayrollConfig::default().with_role_defaults(
            "locum",
            RoleSalaryDefaults {
                calculation_mode: CalculationMode::ShiftBased,
                base_salary: dec("15000000"),
                standard_work_days: 0,
                standard_shifts: 0,
                ot_rate_percent: Decimal::ZERO,
                over_standard_bonus_rate: Decimal::ZERO,
                late_deduction_rate: Decimal::ZERO,
                allowances: vec![],
            },
        );

        let result = SalaryProfile::from_role_defaults("emp_011", "Vo E", "locum", &config);
        assert!(matches!(result, Err(PayrollError::InconsistentProfile { .. })));
    }

    #[test]
    fn test_from_unknown_role_is_profile_missing() {
        let config = PayrollConfig::default();
        let result = SalaryProfile::from_role_defaults("emp_009", "Le C", "astronaut", &config);
        assert!(matches!(result, Err(PayrollError::ProfileMissing { .. })));
    }

    #[test]
    fn test_calculation_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&CalculationMode::ShiftBased).unwrap(),
            "\"shift_based\""
        );
        let direction: ItemDirection = serde_json::from_str("\"deduction\"").unwrap();
        assert_eq!(direction, ItemDirection::Deduction);
    }
}
