//! `crewpay-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the domain error taxonomy, and integer-cents money.

pub mod error;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult};
pub use id::{
    ConsultantId, CycleId, CycleLineItemId, EquipmentItemId, InvoiceId, InvoiceLineItemId,
};
pub use money::Money;
