//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configuration from YAML files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{PayrollError, PayrollResult};

use super::types::{PayrollConfig, PayrollSettings, RoleProfilesConfig};

/// Loads payroll configuration from a directory.
///
/// # Directory Structure
///
/// ```text
/// config/
/// ├── payroll.yaml        # Relief constants and working hours
/// └── role_profiles.yaml  # Optional default salary profiles per role
/// ```
///
/// # Example
///
/// ```
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config")?;
/// assert!(loader.config().role_defaults("doctor").is_some());
/// # Ok::<(), payroll_engine::error::PayrollError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - payroll.yaml is missing
    /// - Any file contains invalid YAML
    /// - Any required field is missing from the configuration
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<PayrollSettings>(&path.join("payroll.yaml"))?;

        let roles_path = path.join("role_profiles.yaml");
        let role_defaults = if roles_path.exists() {
            Self::load_yaml::<RoleProfilesConfig>(&roles_path)?.roles
        } else {
            debug!(path = %roles_path.display(), "No role profile defaults found");
            HashMap::new()
        };

        info!(
            path = %path.display(),
            roles = role_defaults.len(),
            "Loaded payroll configuration"
        );

        Ok(Self {
            config: PayrollConfig::new(settings, role_defaults),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PayrollResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| PayrollError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }
}
