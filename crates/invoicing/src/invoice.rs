use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crewpay_core::{CycleId, DomainError, InvoiceId, Money};

use crate::line_item::InvoiceLineItem;

/// Invoice status lifecycle.
///
/// The nominal path is `DRAFT -> SENT -> APPROVED -> PAID`, with `OVERDUE`
/// and `CANCELLED` as side branches. Not enforced as a strict state machine:
/// any status can be set, but the first transition into `SENT`, `APPROVED`
/// or `PAID` stamps the matching date exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Approved,
    Overdue,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::Approved => "APPROVED",
            InvoiceStatus::Overdue => "OVERDUE",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }
}

impl core::str::FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(InvoiceStatus::Draft),
            "SENT" => Ok(InvoiceStatus::Sent),
            "APPROVED" => Ok(InvoiceStatus::Approved),
            "OVERDUE" => Ok(InvoiceStatus::Overdue),
            "PAID" => Ok(InvoiceStatus::Paid),
            "CANCELLED" => Ok(InvoiceStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown invoice status: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated bill to the client for one payroll cycle.
///
/// Invariant: `subtotal == sum(line_items.amount)`, `total == subtotal + tax`,
/// `amount_due == total` (no partial payments modeled). The cached totals are
/// recomputed from persisted line items on every mutation, never trusted from
/// callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInvoice {
    pub id: InvoiceId,
    pub cycle_id: CycleId,
    /// Human-facing sequential number from the singleton sequence.
    pub invoice_number: i64,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub sent_date: Option<DateTime<Utc>>,
    pub approved_date: Option<DateTime<Utc>>,
    pub paid_date: Option<DateTime<Utc>>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub amount_due: Money,
    pub created_at: DateTime<Utc>,
}

impl ClientInvoice {
    pub fn new(cycle_id: CycleId, invoice_number: i64, issue_date: NaiveDate) -> Self {
        Self {
            id: InvoiceId::new(),
            cycle_id,
            invoice_number,
            status: InvoiceStatus::Draft,
            issue_date,
            sent_date: None,
            approved_date: None,
            paid_date: None,
            subtotal: Money::ZERO,
            tax: Money::ZERO,
            total: Money::ZERO,
            amount_due: Money::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Set the status and stamp the matching date field on the first
    /// transition into `SENT`/`APPROVED`/`PAID`. Re-entering a status keeps
    /// the original stamp.
    pub fn set_status(&mut self, status: InvoiceStatus, now: DateTime<Utc>) {
        self.status = status;
        let slot = match status {
            InvoiceStatus::Sent => &mut self.sent_date,
            InvoiceStatus::Approved => &mut self.approved_date,
            InvoiceStatus::Paid => &mut self.paid_date,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(now);
        }
    }

    /// Recompute the cached totals from the full line-item set. This is the
    /// only way totals change; it guards against drift when line items were
    /// edited independently of the invoice row.
    pub fn recompute_totals(&mut self, line_items: &[InvoiceLineItem]) {
        self.subtotal = line_items.iter().map(|li| li.amount).sum();
        self.total = self.subtotal + self.tax;
        self.amount_due = self.total;
    }
}
