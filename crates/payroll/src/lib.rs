//! `crewpay-payroll` — monthly payroll cycles and their per-consultant
//! pay records.

pub mod cycle;
pub mod line_item;

pub use cycle::{PayrollCycle, WorkflowStep};
pub use line_item::CycleLineItem;
