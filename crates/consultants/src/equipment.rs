use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crewpay_core::{ConsultantId, DomainError, DomainResult, EquipmentItemId};

/// A piece of company equipment assigned to a consultant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: EquipmentItemId,
    pub consultant_id: ConsultantId,
    pub label: String,
    pub serial_number: Option<String>,
    pub assigned_on: NaiveDate,
    pub returned_on: Option<NaiveDate>,
}

impl EquipmentItem {
    pub fn new(
        consultant_id: ConsultantId,
        label: impl Into<String>,
        serial_number: Option<String>,
        assigned_on: NaiveDate,
    ) -> DomainResult<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(DomainError::validation("equipment label must not be empty"));
        }
        Ok(Self {
            id: EquipmentItemId::new(),
            consultant_id,
            label,
            serial_number,
            assigned_on,
            returned_on: None,
        })
    }

    pub fn is_returned(&self) -> bool {
        self.returned_on.is_some()
    }

    /// Record the return date. Stamps once; a second return is a conflict.
    pub fn mark_returned(&mut self, date: NaiveDate) -> DomainResult<()> {
        if self.is_returned() {
            return Err(DomainError::conflict(format!(
                "equipment {} was already returned",
                self.label
            )));
        }
        self.returned_on = Some(date);
        Ok(())
    }
}
