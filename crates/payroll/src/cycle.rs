use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crewpay_core::{ConsultantId, CycleId, DomainError, DomainResult, Money};

/// A monthly payroll run.
///
/// The month label is human-entered (e.g. `"2025-10"`) and unique across
/// cycles; uniqueness is enforced by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollCycle {
    pub id: CycleId,
    pub month_label: String,
    /// Default work hours for the month; individual line items may override.
    pub work_hours: f64,
    /// Pooled bonus billed to the client. `None` means the historical
    /// default applies at invoice time.
    pub invoice_bonus: Option<Money>,
    /// Consultant designated to receive/announce the pooled bonus.
    pub bonus_recipient_id: Option<ConsultantId>,
    pub hours_entered_at: Option<DateTime<Utc>>,
    pub invoices_sent_at: Option<DateTime<Utc>>,
    pub payments_done_at: Option<DateTime<Utc>>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

/// Workflow checklist steps tracked on a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    HoursEntered,
    InvoicesSent,
    PaymentsDone,
}

impl PayrollCycle {
    pub fn new(month_label: impl Into<String>, work_hours: f64) -> DomainResult<Self> {
        let month_label = month_label.into();
        if month_label.trim().is_empty() {
            return Err(DomainError::validation("cycle month label must not be empty"));
        }
        if !work_hours.is_finite() || work_hours <= 0.0 {
            return Err(DomainError::validation(
                "cycle work hours must be positive",
            ));
        }
        Ok(Self {
            id: CycleId::new(),
            month_label,
            work_hours,
            invoice_bonus: None,
            bonus_recipient_id: None,
            hours_entered_at: None,
            invoices_sent_at: None,
            payments_done_at: None,
            archived: false,
            created_at: Utc::now(),
        })
    }

    /// Stamp a workflow step's completion timestamp. The first completion
    /// stamps; completing an already-completed step keeps the original
    /// timestamp.
    pub fn complete_step(&mut self, step: WorkflowStep, now: DateTime<Utc>) {
        let slot = match step {
            WorkflowStep::HoursEntered => &mut self.hours_entered_at,
            WorkflowStep::InvoicesSent => &mut self.invoices_sent_at,
            WorkflowStep::PaymentsDone => &mut self.payments_done_at,
        };
        if slot.is_none() {
            *slot = Some(now);
        }
    }

    pub fn archive(&mut self) {
        self.archived = true;
    }
}
