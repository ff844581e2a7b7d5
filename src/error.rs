//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing or editing payroll.

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::PayrollError;
///
/// let error = PayrollError::CycleLocked { month: 3, year: 2026 };
/// assert_eq!(error.to_string(), "Salary cycle 03/2026 is finalized and cannot be modified");
/// assert_eq!(error.code(), "CYCLE_LOCKED");
/// ```
#[derive(Debug, Error)]
pub enum PayrollError {
    /// No salary profile exists for an employee targeted by a run.
    #[error("Salary profile not found for employee '{employee_id}'")]
    ProfileMissing {
        /// The employee without a profile.
        employee_id: String,
    },

    /// A mutation was attempted on a finalized cycle.
    #[error("Salary cycle {month:02}/{year} is finalized and cannot be modified")]
    CycleLocked {
        /// The cycle month (1-12).
        month: u32,
        /// The cycle year.
        year: i32,
    },

    /// The requested cycle has never been created.
    #[error("Salary cycle {month:02}/{year} does not exist")]
    CycleNotFound {
        /// The cycle month (1-12).
        month: u32,
        /// The cycle year.
        year: i32,
    },

    /// The month/year pair does not name a calendar month.
    #[error("Invalid payroll period {month}/{year}")]
    InvalidPeriod {
        /// The requested month.
        month: u32,
        /// The requested year.
        year: i32,
    },

    /// No payslip exists with the given id.
    #[error("Payslip not found: {payslip_id}")]
    PayslipNotFound {
        /// The payslip id that was not found.
        payslip_id: Uuid,
    },

    /// A ledger edit referenced an item it may not touch.
    #[error("Invalid ledger item '{item_id}': {message}")]
    InvalidLedgerItem {
        /// The offending line item id.
        item_id: Uuid,
        /// A description of why the edit was rejected.
        message: String,
    },

    /// A ledger amount is outside its allowed range.
    #[error("Invalid {field}: {amount}")]
    InvalidAmount {
        /// The field the amount was supplied for.
        field: String,
        /// The rejected amount.
        amount: rust_decimal::Decimal,
    },

    /// A salary profile violates the standard days/shifts invariant.
    #[error("Inconsistent salary profile for employee '{employee_id}': {message}")]
    InconsistentProfile {
        /// The employee whose profile was rejected.
        employee_id: String,
        /// A description of the inconsistency.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// The payroll store could not be accessed.
    #[error("Payroll store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the failure.
        message: String,
    },
}

impl PayrollError {
    /// Returns a stable, machine-readable code for the error.
    ///
    /// Batch reports and downstream exporters key off these codes rather than
    /// the display text.
    pub fn code(&self) -> &'static str {
        match self {
            PayrollError::ProfileMissing { .. } => "PROFILE_MISSING",
            PayrollError::CycleLocked { .. } => "CYCLE_LOCKED",
            PayrollError::CycleNotFound { .. } => "CYCLE_NOT_FOUND",
            PayrollError::InvalidPeriod { .. } => "INVALID_PERIOD",
            PayrollError::PayslipNotFound { .. } => "PAYSLIP_NOT_FOUND",
            PayrollError::InvalidLedgerItem { .. } => "INVALID_LEDGER_ITEM",
            PayrollError::InvalidAmount { .. } => "INVALID_AMOUNT",
            PayrollError::InconsistentProfile { .. } => "INCONSISTENT_PROFILE",
            PayrollError::ConfigNotFound { .. } | PayrollError::ConfigParseError { .. } => {
                "CONFIG_ERROR"
            }
            PayrollError::CalculationError { .. } => "CALCULATION_ERROR",
            PayrollError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
        }
    }
}

/// A type alias for Results that return PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_missing_displays_employee() {
        let error = PayrollError::ProfileMissing {
            employee_id: "emp_042".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Salary profile not found for employee 'emp_042'"
        );
        assert_eq!(error.code(), "PROFILE_MISSING");
    }

    #[test]
    fn test_cycle_locked_pads_month() {
        let error = PayrollError::CycleLocked {
            month: 7,
            year: 2026,
        };
        assert_eq!(
            error.to_string(),
            "Salary cycle 07/2026 is finalized and cannot be modified"
        );
    }

    #[test]
    fn test_invalid_ledger_item_displays_id_and_message() {
        let id = Uuid::nil();
        let error = PayrollError::InvalidLedgerItem {
            item_id: id,
            message: "system-generated items cannot be removed".to_string(),
        };
        assert_eq!(
            error.to_string(),
            format!(
                "Invalid ledger item '{}': system-generated items cannot be removed",
                id
            )
        );
        assert_eq!(error.code(), "INVALID_LEDGER_ITEM");
    }

    #[test]
    fn test_config_errors_share_code() {
        let not_found = PayrollError::ConfigNotFound {
            path: "/missing/payroll.yaml".to_string(),
        };
        let parse = PayrollError::ConfigParseError {
            path: "/config/payroll.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(not_found.code(), "CONFIG_ERROR");
        assert_eq!(parse.code(), "CONFIG_ERROR");
        assert_eq!(
            parse.to_string(),
            "Failed to parse configuration file '/config/payroll.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<PayrollError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_cycle_not_found() -> PayrollResult<()> {
            Err(PayrollError::CycleNotFound {
                month: 1,
                year: 2026,
            })
        }

        fn propagates_error() -> PayrollResult<()> {
            returns_cycle_not_found()?;
            Ok(())
        }

        assert!(matches!(
            propagates_error(),
            Err(PayrollError::CycleNotFound { .. })
        ));
    }
}
