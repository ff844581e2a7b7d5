//! Configuration loading and management for the payroll engine.
//!
//! This module provides the [`PayrollConfig`] value object passed into the
//! calculator (relief constants, working hours, role default profiles) and
//! a loader that reads it from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap().into_config();
//! println!("Self relief: {}", config.self_relief());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DEFAULT_DEPENDENT_RELIEF, DEFAULT_SELF_RELIEF, DEFAULT_STANDARD_HOURS_PER_DAY,
    PayrollConfig, PayrollSettings, ReliefConfig, RoleProfilesConfig, RoleSalaryDefaults,
};
