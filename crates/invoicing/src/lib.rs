//! `crewpay-invoicing` — client invoice domain: status lifecycle, line items,
//! and the pure consultant-grouping algorithm used to generate an invoice
//! from a payroll cycle.

pub mod grouping;
pub mod invoice;
pub mod line_item;

pub use grouping::{draft_from_consultants, DraftLine, InvoiceDraft};
pub use invoice::{ClientInvoice, InvoiceStatus};
pub use line_item::{InvoiceLineItem, BONUS_LINE_SERVICE, DEFAULT_INVOICE_BONUS};
