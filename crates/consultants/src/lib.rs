//! `crewpay-consultants` — consultant domain: contract data, client-billing
//! overrides, termination lifecycle, equipment records.

pub mod consultant;
pub mod equipment;

pub use consultant::{
    Consultant, DEFAULT_SERVICE_DESCRIPTION, DEFAULT_SERVICE_NAME,
};
pub use equipment::EquipmentItem;
