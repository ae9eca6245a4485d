use serde::{Deserialize, Serialize};

use crewpay_core::{ConsultantId, DomainError, DomainResult, InvoiceId, InvoiceLineItemId, Money};

/// Service name of the fixed bonus line appended to every generated invoice.
pub const BONUS_LINE_SERVICE: &str = "Consultant Bonus";

/// Historical default bonus when a cycle has no configured pool.
pub const DEFAULT_INVOICE_BONUS: Money = Money::from_cents(75_196);

/// One billed service line on a client invoice, possibly aggregating several
/// consultants under the same (service, rate, description) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    pub id: InvoiceLineItemId,
    pub invoice_id: InvoiceId,
    pub service_name: String,
    pub description: String,
    /// Count of consultants grouped under this line.
    pub quantity: i64,
    /// Per-unit price in cents.
    pub rate: Money,
    /// `quantity * rate`; recomputed on every edit, never client-supplied.
    pub amount: Money,
    /// Sort position on the invoice; the bonus line always sorts last.
    pub position: i64,
    pub consultant_ids: Vec<ConsultantId>,
}

impl InvoiceLineItem {
    /// Recompute `amount` after a quantity/rate edit.
    pub fn recompute_amount(&mut self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::validation(
                "invoice line quantity must be positive",
            ));
        }
        self.amount = self
            .rate
            .checked_mul(self.quantity)
            .ok_or_else(|| DomainError::invariant("invoice line amount overflow"))?;
        Ok(())
    }

    pub fn is_bonus_line(&self) -> bool {
        self.service_name == BONUS_LINE_SERVICE
    }
}
