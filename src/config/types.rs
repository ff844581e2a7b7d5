//! Configuration types for payroll computation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{AllowanceConfig, CalculationMode};

/// Default monthly personal relief.
pub const DEFAULT_SELF_RELIEF: Decimal = Decimal::from_parts(11_000_000, 0, 0, false, 0);

/// Default monthly relief per registered dependent.
pub const DEFAULT_DEPENDENT_RELIEF: Decimal = Decimal::from_parts(4_400_000, 0, 0, false, 0);

/// Default hours in a standard working day.
pub const DEFAULT_STANDARD_HOURS_PER_DAY: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Family relief settings from payroll.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct ReliefConfig {
    /// Relief every taxpayer receives.
    #[serde(rename = "self")]
    pub self_relief: Decimal,
    /// Relief per dependent.
    pub per_dependent: Decimal,
}

/// Top-level structure of payroll.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollSettings {
    /// Family relief settings.
    pub relief: ReliefConfig,
    /// Hours in a standard working day, used to derive the hourly rate.
    #[serde(default = "default_hours_per_day")]
    pub standard_hours_per_day: Decimal,
}

fn default_hours_per_day() -> Decimal {
    DEFAULT_STANDARD_HOURS_PER_DAY
}

/// Default salary settings applied when HR creates a profile for a role.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleSalaryDefaults {
    /// Counting regime.
    pub calculation_mode: CalculationMode,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Standard work days (monthly roles).
    #[serde(default)]
    pub standard_work_days: u32,
    /// Standard shifts (shift-based roles).
    #[serde(default)]
    pub standard_shifts: u32,
    /// Overtime rate as a percentage of the hourly rate.
    #[serde(default)]
    pub ot_rate_percent: Decimal,
    /// Bonus rate per extra shift.
    #[serde(default)]
    pub over_standard_bonus_rate: Decimal,
    /// Currency per late minute.
    #[serde(default)]
    pub late_deduction_rate: Decimal,
    /// Allowances and deductions.
    #[serde(default)]
    pub allowances: Vec<AllowanceConfig>,
}

/// Structure of role_profiles.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleProfilesConfig {
    /// Map of role name to defaults.
    pub roles: HashMap<String, RoleSalaryDefaults>,
}

/// Configuration passed explicitly into the payroll calculator.
///
/// # Example
///
/// ```
/// use payroll_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
///
/// let config = PayrollConfig::default();
/// assert_eq!(config.family_relief(2), Decimal::new(19_800_000, 0));
/// ```
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    self_relief: Decimal,
    dependent_relief: Decimal,
    standard_hours_per_day: Decimal,
    role_defaults: HashMap<String, RoleSalaryDefaults>,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            self_relief: DEFAULT_SELF_RELIEF,
            dependent_relief: DEFAULT_DEPENDENT_RELIEF,
            standard_hours_per_day: DEFAULT_STANDARD_HOURS_PER_DAY,
            role_defaults: HashMap::new(),
        }
    }
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(
        settings: PayrollSettings,
        role_defaults: HashMap<String, RoleSalaryDefaults>,
    ) -> Self {
        Self {
            self_relief: settings.relief.self_relief,
            dependent_relief: settings.relief.per_dependent,
            standard_hours_per_day: settings.standard_hours_per_day,
            role_defaults,
        }
    }

    /// Adds or replaces the defaults for a role.
    pub fn with_role_defaults(mut self, role: &str, defaults: RoleSalaryDefaults) -> Self {
        self.role_defaults.insert(role.to_string(), defaults);
        self
    }

    /// Returns the personal relief.
    pub fn self_relief(&self) -> Decimal {
        self.self_relief
    }

    /// Returns the relief per dependent.
    pub fn dependent_relief(&self) -> Decimal {
        self.dependent_relief
    }

    /// Returns the hours in a standard working day.
    pub fn standard_hours_per_day(&self) -> Decimal {
        self.standard_hours_per_day
    }

    /// Returns self relief plus relief for `dependents`.
    pub fn family_relief(&self, dependents: u32) -> Decimal {
        self.self_relief + self.dependent_relief * Decimal::from(dependents)
    }

    /// Returns the defaults for a role, if configured.
    pub fn role_defaults(&self, role: &str) -> Option<&RoleSalaryDefaults> {
        self.role_defaults.get(role)
    }

    /// Returns all configured role names.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.role_defaults.keys().map(String::as_str)
    }
}
