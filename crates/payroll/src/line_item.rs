use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crewpay_consultants::Consultant;
use crewpay_core::{ConsultantId, CycleId, CycleLineItemId, Money};

/// One consultant's pay record within a cycle.
///
/// Created when the cycle is created (one per active consultant), mutated as
/// payroll data comes in, and deleted only by cascading cycle deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleLineItem {
    pub id: CycleLineItemId,
    pub cycle_id: CycleId,
    pub consultant_id: ConsultantId,
    /// Pay rate at cycle creation time; later rate changes on the consultant
    /// do not affect an open cycle.
    pub rate_snapshot: Money,
    pub work_hours_override: Option<f64>,
    pub bonus_date: Option<NaiveDate>,
    pub bonus_announced_date: Option<NaiveDate>,
    /// Signed one-off correction applied on top of hours × rate.
    pub adjustment: Money,
    pub adjustment_note: Option<String>,
}

impl CycleLineItem {
    /// Snapshot a consultant into a freshly created cycle.
    pub fn snapshot(cycle_id: CycleId, consultant: &Consultant) -> Self {
        Self {
            id: CycleLineItemId::new(),
            cycle_id,
            consultant_id: consultant.id,
            rate_snapshot: consultant.hourly_rate,
            work_hours_override: None,
            bonus_date: None,
            bonus_announced_date: None,
            adjustment: Money::ZERO,
            adjustment_note: None,
        }
    }

    /// Hours that apply to this consultant: the per-line override, or the
    /// cycle's global default.
    pub fn effective_hours(&self, cycle_default: f64) -> f64 {
        self.work_hours_override.unwrap_or(cycle_default)
    }

    /// Gross payout for the month: hours × snapshot rate + adjustment,
    /// rounded to cents half-up.
    pub fn gross_pay(&self, cycle_default: f64) -> Money {
        let hours = self.effective_hours(cycle_default);
        let base = Money::from_cents((self.rate_snapshot.cents() as f64 * hours).round() as i64);
        base + self.adjustment
    }
}
