//! Read-only queries for downstream exporters.
//!
//! The core returns data; rendering tables or spreadsheets is left to the
//! caller.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PayrollError, PayrollResult};
use crate::models::{AuditTrace, CycleStatus, PayslipSnapshot};

use super::service::PayrollService;

/// Which cycles to list payslips from. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipFilter {
    /// Cycle month.
    pub month: Option<u32>,
    /// Cycle year.
    pub year: Option<i32>,
    /// Cycle status.
    pub status: Option<CycleStatus>,
}

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page number, starting at 1.
    pub number: usize,
    /// Items per page.
    pub size: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: 20,
        }
    }
}

/// One page of payslips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipPage {
    /// The payslips on this page.
    pub items: Vec<PayslipSnapshot>,
    /// Payslips matching the query across all pages.
    pub total: usize,
    /// The page that was returned.
    pub page: Page,
}

/// A payslip with the context needed to render its breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipDetail {
    /// The payslip.
    pub snapshot: PayslipSnapshot,
    /// Status of the payslip's cycle.
    pub cycle_status: CycleStatus,
    /// Steps behind every amount on the payslip.
    pub audit_trace: AuditTrace,
}

impl PayrollService {
    /// Lists payslips matching `filter` and `keyword`, one page at a time.
    ///
    /// Results are ordered by cycle period, then employee id. The keyword
    /// matches employee id or name, case-insensitively; a blank keyword
    /// matches everything. Page numbers below 1 are treated as 1 and a page
    /// size of 0 yields an empty page.
    pub async fn list_payslips(
        &self,
        filter: PayslipFilter,
        keyword: Option<&str>,
        page: Page,
    ) -> PayrollResult<PayslipPage> {
        let needle = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase);

        let mut matches = Vec::new();
        for entry in self.inner.store.cycles().await {
            let cycle = entry.cycle.read().await;
            let cycle_matches = filter.month.is_none_or(|m| m == cycle.month)
                && filter.year.is_none_or(|y| y == cycle.year)
                && filter.status.is_none_or(|s| s == cycle.status);
            if !cycle_matches {
                continue;
            }

            matches.extend(
                entry
                    .records()
                    .await
                    .into_iter()
                    .map(|record| record.snapshot)
                    .filter(|snapshot| {
                        needle.as_deref().is_none_or(|n| {
                            snapshot.employee_id.to_lowercase().contains(n)
                                || snapshot.employee_name.to_lowercase().contains(n)
                        })
                    }),
            );
        }

        let page = Page {
            number: page.number.max(1),
            size: page.size,
        };
        let total = matches.len();
        let items = matches
            .into_iter()
            .skip((page.number - 1).saturating_mul(page.size))
            .take(page.size)
            .collect();

        Ok(PayslipPage { items, total, page })
    }

    /// Returns one payslip with its cycle status and audit trace.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::PayslipNotFound`] if no payslip has that id.
    pub async fn get_payslip_detail(&self, payslip_id: Uuid) -> PayrollResult<PayslipDetail> {
        let (entry, employee_id) = self.inner.store.locate(payslip_id).await?;
        let cycle = entry.cycle.read().await;

        let slot = entry
            .existing_slot(&employee_id)
            .await
            .ok_or(PayrollError::PayslipNotFound { payslip_id })?;
        let stored = slot.lock().await;
        let record = stored
            .as_ref()
            .ok_or(PayrollError::PayslipNotFound { payslip_id })?;

        Ok(PayslipDetail {
            snapshot: record.snapshot.clone(),
            cycle_status: cycle.status,
            audit_trace: record.audit_trace.clone(),
        })
    }
}
