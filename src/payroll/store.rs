//! In-memory persistence for cycles and payslips.
//!
//! ## Locking
//!
//! Each cycle sits behind its own `RwLock`. Recomputation and ledger edits
//! hold the read lock for their whole read-modify-write, so finalization (which
//! takes the write lock) waits for every in-flight edit on the cycle and blocks
//! new ones until it completes. Each payslip slot has its own `Mutex`, so edits
//! to one employee never wait on another. A new snapshot is built off to the
//! side and swapped into its slot in one assignment.
//!
//! Lock order is cycle, then slot map, then slot. The registry maps are only
//! held for lookups.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::error::{PayrollError, PayrollResult};
use crate::models::{AuditTrace, PayslipSnapshot, SalaryCycle, month_bounds};

/// A persisted payslip and the trace of its last computation.
#[derive(Debug, Clone)]
pub(crate) struct PayslipRecord {
    pub snapshot: PayslipSnapshot,
    pub audit_trace: AuditTrace,
}

pub(crate) type PayslipSlot = Arc<Mutex<Option<PayslipRecord>>>;

/// One cycle and its payslips, keyed by employee id.
#[derive(Debug)]
pub(crate) struct CycleEntry {
    pub cycle: RwLock<SalaryCycle>,
    slots: Mutex<BTreeMap<String, PayslipSlot>>,
}

impl CycleEntry {
    fn new(cycle: SalaryCycle) -> Self {
        Self {
            cycle: RwLock::new(cycle),
            slots: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the employee's slot, creating an empty one if needed.
    pub async fn slot(&self, employee_id: &str) -> PayslipSlot {
        let mut slots = self.slots.lock().await;
        slots
            .entry(employee_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    /// Returns the employee's slot if one was ever created.
    pub async fn existing_slot(&self, employee_id: &str) -> Option<PayslipSlot> {
        self.slots.lock().await.get(employee_id).cloned()
    }

    /// Returns a copy of every stored payslip, ordered by employee id.
    pub async fn records(&self) -> Vec<PayslipRecord> {
        let slots: Vec<PayslipSlot> = self.slots.lock().await.values().cloned().collect();
        let mut records = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(record) = slot.lock().await.as_ref() {
                records.push(record.clone());
            }
        }
        records
    }

    /// Sums net salary over every stored payslip.
    pub async fn total_net_salary(&self) -> Decimal {
        self.records()
            .await
            .iter()
            .map(|r| r.snapshot.net_salary)
            .sum()
    }
}

/// Where a payslip lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PayslipLocation {
    pub month: u32,
    pub year: i32,
    pub employee_id: String,
}

/// Registry of cycles and a payslip id index.
#[derive(Debug, Default)]
pub(crate) struct PayrollStore {
    cycles: Mutex<HashMap<(i32, u32), Arc<CycleEntry>>>,
    payslip_index: Mutex<HashMap<Uuid, PayslipLocation>>,
}

impl PayrollStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cycle for a month, creating a DRAFT one if none exists.
    pub async fn get_or_create_cycle(
        &self,
        month: u32,
        year: i32,
    ) -> PayrollResult<Arc<CycleEntry>> {
        month_bounds(month, year)?;

        let mut cycles = self.cycles.lock().await;
        if let Some(entry) = cycles.get(&(year, month)) {
            return Ok(Arc::clone(entry));
        }

        let cycle = SalaryCycle::new_draft(month, year)?;
        info!(month, year, cycle_id = %cycle.id, "Created salary cycle");
        let entry = Arc::new(CycleEntry::new(cycle));
        cycles.insert((year, month), Arc::clone(&entry));
        Ok(entry)
    }

    /// Returns an existing cycle.
    pub async fn cycle(&self, month: u32, year: i32) -> PayrollResult<Arc<CycleEntry>> {
        month_bounds(month, year)?;
        self.cycles
            .lock()
            .await
            .get(&(year, month))
            .cloned()
            .ok_or(PayrollError::CycleNotFound { month, year })
    }

    /// Returns every cycle, oldest period first.
    pub async fn cycles(&self) -> Vec<Arc<CycleEntry>> {
        let cycles = self.cycles.lock().await;
        let mut keys: Vec<&(i32, u32)> = cycles.keys().collect();
        keys.sort();
        keys.into_iter().map(|key| Arc::clone(&cycles[key])).collect()
    }

    pub async fn register_payslip(&self, payslip_id: Uuid, location: PayslipLocation) {
        self.payslip_index.lock().await.insert(payslip_id, location);
    }

    /// Resolves a payslip id to its cycle entry and employee id.
    pub async fn locate(&self, payslip_id: Uuid) -> PayrollResult<(Arc<CycleEntry>, String)> {
        let location = self
            .payslip_index
            .lock()
            .await
            .get(&payslip_id)
            .cloned()
            .ok_or(PayrollError::PayslipNotFound { payslip_id })?;

        let entry = self
            .cycles
            .lock()
            .await
            .get(&(location.year, location.month))
            .cloned()
            .ok_or(PayrollError::PayslipNotFound { payslip_id })?;

        Ok((entry, location.employee_id))
    }
}
