//! Grouping a cycle's consultants into billed invoice lines.
//!
//! Pure and deterministic: no IO, no clock. The store layer turns the
//! resulting draft into persisted rows inside one transaction.

use std::collections::BTreeMap;

use crewpay_consultants::Consultant;
use crewpay_core::{ConsultantId, DomainError, DomainResult, Money};

use crate::line_item::BONUS_LINE_SERVICE;

/// One not-yet-persisted invoice line produced by grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLine {
    pub service_name: String,
    pub description: String,
    pub quantity: i64,
    pub rate: Money,
    pub amount: Money,
    pub consultant_ids: Vec<ConsultantId>,
}

/// Grouped lines plus the bonus line, with precomputed totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub lines: Vec<DraftLine>,
    pub subtotal: Money,
}

/// Group consultants by (billed service name, unit price, base description)
/// into one line per distinct key, append the fixed bonus line, and compute
/// the subtotal.
///
/// Fails with a single validation error naming **every** consultant missing
/// a billing unit price, so the admin can fix all of them in one pass.
/// Grouping keys sort via `BTreeMap`, so line ordering is reproducible
/// across runs with identical input.
pub fn draft_from_consultants(
    consultants: &[Consultant],
    bonus: Money,
) -> DomainResult<InvoiceDraft> {
    let missing: Vec<&str> = consultants
        .iter()
        .filter(|c| c.client_invoice_unit_price.is_none())
        .map(|c| c.name.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(DomainError::validation(format!(
            "consultants missing a client invoice unit price: {}",
            missing.join(", ")
        )));
    }

    let mut groups: BTreeMap<(String, Money, String), Vec<&Consultant>> = BTreeMap::new();
    for consultant in consultants {
        // Checked above; unreachable without a price.
        let Some(unit_price) = consultant.client_invoice_unit_price else {
            continue;
        };
        let key = (
            consultant.billed_service_name().to_string(),
            unit_price,
            consultant.billed_description().to_string(),
        );
        groups.entry(key).or_default().push(consultant);
    }

    let mut lines = Vec::with_capacity(groups.len() + 1);
    for ((service_name, rate, base_description), members) in groups {
        let quantity = members.len() as i64;
        let amount = rate
            .checked_mul(quantity)
            .ok_or_else(|| DomainError::invariant("invoice line amount overflow"))?;
        let names = members
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(DraftLine {
            service_name,
            description: format!("{base_description} ({names})."),
            quantity,
            rate,
            amount,
            consultant_ids: members.iter().map(|c| c.id).collect(),
        });
    }

    lines.push(DraftLine {
        service_name: BONUS_LINE_SERVICE.to_string(),
        description: BONUS_LINE_SERVICE.to_string(),
        quantity: 1,
        rate: bonus,
        amount: bonus,
        consultant_ids: Vec::new(),
    });

    let subtotal = lines.iter().map(|l| l.amount).sum();
    Ok(InvoiceDraft { lines, subtotal })
}
