//! `crewpay-store` — SQLite-backed persistence.
//!
//! One repository per domain area, all over a shared `SqlitePool`. Every
//! multi-step write runs inside a single database transaction; the embedded
//! single-writer database serializes them, so no application-level locking
//! exists here.

pub mod consultants;
pub mod cycles;
pub mod error;
pub mod invoices;
pub mod schema;

pub use consultants::ConsultantRepo;
pub use cycles::CycleRepo;
pub use error::{StoreError, StoreResult};
pub use invoices::{ClientInvoiceService, CreateEligibility, LineItemPatch};
pub use schema::{connect, init_schema};

#[cfg(test)]
mod integration_tests;
