//! Salary cycle lifecycle: DRAFT on creation, FINALIZED for good.

use chrono::Utc;
use tracing::{info, warn};

use crate::error::PayrollResult;
use crate::models::{AuditAction, AuditEvent, SalaryCycle};

use super::service::PayrollService;

impl PayrollService {
    /// Returns the cycle for a month, creating it as DRAFT if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::InvalidPeriod`](crate::error::PayrollError::InvalidPeriod)
    /// if the month is out of range.
    pub async fn get_or_create_cycle(&self, month: u32, year: i32) -> PayrollResult<SalaryCycle> {
        let entry = self.inner.store.get_or_create_cycle(month, year).await?;
        let cycle = entry.cycle.read().await.clone();
        Ok(cycle)
    }

    /// Locks a cycle against every further edit.
    ///
    /// Waits for in-flight recomputations and ledger edits on the cycle to
    /// finish; edits arriving afterwards fail with `CycleLocked`.
    ///
    /// # Errors
    ///
    /// - [`PayrollError::CycleNotFound`](crate::error::PayrollError::CycleNotFound)
    ///   if the cycle was never created
    /// - [`PayrollError::CycleLocked`](crate::error::PayrollError::CycleLocked)
    ///   if it is already finalized
    pub async fn finalize_cycle(
        &self,
        month: u32,
        year: i32,
        actor: &str,
    ) -> PayrollResult<SalaryCycle> {
        let entry = self.inner.store.cycle(month, year).await?;
        let mut cycle = entry.cycle.write().await;

        cycle.finalize(Utc::now()).inspect_err(|_| {
            warn!(month, year, actor, "Cycle already finalized");
        })?;
        let finalized = cycle.clone();
        let total_net = entry.total_net_salary().await;
        drop(cycle);

        info!(month, year, actor, total_net = %total_net, "Salary cycle finalized");
        self.emit(AuditEvent {
            actor: actor.to_string(),
            action: AuditAction::FinalizeCycle,
            month,
            year,
            payslip_id: None,
            before_amount: total_net,
            after_amount: total_net,
            occurred_at: Utc::now(),
        });

        Ok(finalized)
    }
}
