//! Contracts for the systems that feed the payroll core.
//!
//! Profiles and attendance are owned elsewhere; the core only reads them
//! through these traits. The in-memory implementations back tests, benches
//! and embedders without a real HR backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{PayrollError, PayrollResult};
use crate::models::{AttendanceFact, SalaryProfile};

/// Source of salary profiles.
pub trait EmployeeDirectory: Send + Sync {
    /// Returns the employee's current profile, or `None` if none is on file.
    fn get_salary_profile(&self, employee_id: &str) -> PayrollResult<Option<SalaryProfile>>;

    /// Lists employees a payroll run should target, optionally by role.
    fn list_payable_employees(&self, role_filter: Option<&str>) -> PayrollResult<Vec<String>>;
}

/// Source of attendance facts.
pub trait AttendanceStore: Send + Sync {
    /// Returns the employee's facts dated within `[start, end]`.
    fn get_attendance_facts(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PayrollResult<Vec<AttendanceFact>>;
}

fn poisoned(what: &str) -> PayrollError {
    PayrollError::StoreUnavailable {
        message: format!("{what} lock poisoned"),
    }
}

#[derive(Debug, Default)]
struct DirectoryState {
    profiles: HashMap<String, SalaryProfile>,
    roster: BTreeMap<String, String>,
}

/// Employee directory held in memory.
///
/// The roster of payable employees is kept separately from profiles, so an
/// employee can be on the roster without a profile on file.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryEmployeeDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a profile, adding the employee to the roster.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::InconsistentProfile`] if the profile fails
    /// [`SalaryProfile::validate`]; nothing is stored in that case.
    pub fn save_profile(&self, profile: SalaryProfile) -> PayrollResult<()> {
        profile.validate()?;

        let mut state = self.state.write().map_err(|_| poisoned("directory"))?;
        debug!(employee_id = %profile.employee_id, role = %profile.role, "Saved salary profile");
        state
            .roster
            .insert(profile.employee_id.clone(), profile.role.clone());
        state.profiles.insert(profile.employee_id.clone(), profile);
        Ok(())
    }

    /// Adds an employee to the roster without a profile.
    pub fn enroll(&self, employee_id: &str, role: &str) -> PayrollResult<()> {
        let mut state = self.state.write().map_err(|_| poisoned("directory"))?;
        state
            .roster
            .insert(employee_id.to_string(), role.to_string());
        Ok(())
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn get_salary_profile(&self, employee_id: &str) -> PayrollResult<Option<SalaryProfile>> {
        let state = self.state.read().map_err(|_| poisoned("directory"))?;
        Ok(state.profiles.get(employee_id).cloned())
    }

    fn list_payable_employees(&self, role_filter: Option<&str>) -> PayrollResult<Vec<String>> {
        let state = self.state.read().map_err(|_| poisoned("directory"))?;
        Ok(state
            .roster
            .iter()
            .filter(|(_, role)| role_filter.is_none_or(|wanted| wanted == role.as_str()))
            .map(|(id, _)| id.clone())
            .collect())
    }
}

/// Attendance store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryAttendanceStore {
    facts: RwLock<HashMap<String, Vec<AttendanceFact>>>,
}

impl InMemoryAttendanceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records facts, filed under each fact's employee.
    pub fn record(&self, facts: impl IntoIterator<Item = AttendanceFact>) -> PayrollResult<()> {
        let mut stored = self.facts.write().map_err(|_| poisoned("attendance"))?;
        for fact in facts {
            stored
                .entry(fact.employee_id.clone())
                .or_default()
                .push(fact);
        }
        Ok(())
    }

    /// Drops every fact for an employee.
    pub fn clear_employee(&self, employee_id: &str) -> PayrollResult<()> {
        let mut stored = self.facts.write().map_err(|_| poisoned("attendance"))?;
        stored.remove(employee_id);
        Ok(())
    }
}

impl AttendanceStore for InMemoryAttendanceStore {
    fn get_attendance_facts(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PayrollResult<Vec<AttendanceFact>> {
        let stored = self.facts.read().map_err(|_| poisoned("attendance"))?;
        Ok(stored
            .get(employee_id)
            .map(|facts| {
                facts
                    .iter()
                    .filter(|f| f.work_date >= start && f.work_date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
