//! Delivery of audit events to an external log.
//!
//! Emission is best-effort: the service logs a failed delivery and carries on
//! with the operation that produced the event.

use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::info;

use crate::models::AuditEvent;

/// Errors raised while delivering an audit event.
#[derive(Debug, Error)]
pub enum AuditSinkError {
    /// The receiving end of the channel has been dropped.
    #[error("Audit channel closed")]
    ChannelClosed,

    /// The sink refused the event.
    #[error("Audit event rejected: {0}")]
    Rejected(String),
}

/// A destination for audit events.
pub trait AuditSink: Send + Sync {
    /// Delivers one event. Must not block.
    fn emit(&self, event: AuditEvent) -> Result<(), AuditSinkError>;
}

/// Forwards events over an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelAuditSink {
    sender: UnboundedSender<AuditEvent>,
}

impl ChannelAuditSink {
    /// Creates a sink and the receiver its events arrive on.
    ///
    /// ```
    /// use payroll_engine::payroll::{AuditSink, ChannelAuditSink};
    /// use payroll_engine::models::{AuditAction, AuditEvent};
    /// use rust_decimal::Decimal;
    ///
    /// let (sink, mut events) = ChannelAuditSink::new();
    /// sink.emit(AuditEvent {
    ///     actor: "hr_admin".to_string(),
    ///     action: AuditAction::FinalizeCycle,
    ///     month: 3,
    ///     year: 2026,
    ///     payslip_id: None,
    ///     before_amount: Decimal::ZERO,
    ///     after_amount: Decimal::ZERO,
    ///     occurred_at: chrono::Utc::now(),
    /// })
    /// .unwrap();
    /// assert_eq!(events.try_recv().unwrap().actor, "hr_admin");
    /// ```
    pub fn new() -> (Self, UnboundedReceiver<AuditEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl AuditSink for ChannelAuditSink {
    fn emit(&self, event: AuditEvent) -> Result<(), AuditSinkError> {
        self.sender
            .send(event)
            .map_err(|_| AuditSinkError::ChannelClosed)
    }
}

/// Writes events to the `tracing` log under the `payroll::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: AuditEvent) -> Result<(), AuditSinkError> {
        info!(
            target: "payroll::audit",
            actor = %event.actor,
            action = ?event.action,
            month = event.month,
            year = event.year,
            payslip_id = ?event.payslip_id,
            before = %event.before_amount,
            after = %event.after_amount,
            "Audit event"
        );
        Ok(())
    }
}
