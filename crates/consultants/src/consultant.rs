use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crewpay_core::{ConsultantId, DomainError, DomainResult, Money};

/// Billed service name when no override and no role is set.
pub const DEFAULT_SERVICE_NAME: &str = "Uncategorized";

/// Billed line description when the whole fallback chain comes up empty.
pub const DEFAULT_SERVICE_DESCRIPTION: &str = "Consulting services";

/// A person under contract.
///
/// The `client_invoice_*` fields override what appears on client invoices and
/// are distinct from the payout `hourly_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultant {
    pub id: ConsultantId,
    pub name: String,
    pub email: String,
    pub role: String,
    /// Payout rate in cents per hour.
    pub hourly_rate: Money,
    pub active: bool,
    pub client_invoice_service_name: Option<String>,
    pub client_invoice_unit_price: Option<Money>,
    pub client_invoice_service_description: Option<String>,
    pub contract_signed_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub termination_reason: Option<String>,
    pub equipment_return_deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// One step of a billing-field fallback chain.
type FieldAccessor = fn(&Consultant) -> Option<&str>;

fn override_service_name(c: &Consultant) -> Option<&str> {
    c.client_invoice_service_name.as_deref()
}

fn role_as_service_name(c: &Consultant) -> Option<&str> {
    (!c.role.trim().is_empty()).then_some(c.role.as_str())
}

fn override_description(c: &Consultant) -> Option<&str> {
    c.client_invoice_service_description.as_deref()
}

/// Precedence for the billed service name. Kept as an explicit ordered list
/// so the precedence stays auditable and testable.
const SERVICE_NAME_CHAIN: &[FieldAccessor] = &[override_service_name, role_as_service_name];

/// Precedence for the billed base description.
const DESCRIPTION_CHAIN: &[FieldAccessor] =
    &[override_description, override_service_name, role_as_service_name];

fn resolve<'a>(chain: &[FieldAccessor], c: &'a Consultant, default: &'a str) -> &'a str {
    chain
        .iter()
        .find_map(|accessor| accessor(c))
        .unwrap_or(default)
}

impl Consultant {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        hourly_rate: Money,
    ) -> DomainResult<Self> {
        let name = name.into();
        let email = email.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("consultant name must not be empty"));
        }
        if !email.contains('@') {
            return Err(DomainError::validation(format!(
                "consultant email is not an address: {email}"
            )));
        }
        if hourly_rate.cents() <= 0 {
            return Err(DomainError::validation(
                "consultant hourly rate must be positive",
            ));
        }
        Ok(Self {
            id: ConsultantId::new(),
            name,
            email,
            role: role.into(),
            hourly_rate,
            active: true,
            client_invoice_service_name: None,
            client_invoice_unit_price: None,
            client_invoice_service_description: None,
            contract_signed_date: None,
            termination_date: None,
            termination_reason: None,
            equipment_return_deadline: None,
            created_at: Utc::now(),
        })
    }

    /// Service name as it should appear on a client invoice.
    pub fn billed_service_name(&self) -> &str {
        resolve(SERVICE_NAME_CHAIN, self, DEFAULT_SERVICE_NAME)
    }

    /// Base description for the consultant's invoice line, before the grouped
    /// consultant names are appended.
    pub fn billed_description(&self) -> &str {
        resolve(DESCRIPTION_CHAIN, self, DEFAULT_SERVICE_DESCRIPTION)
    }

    pub fn is_terminated(&self) -> bool {
        self.termination_date.is_some()
    }

    /// Terminate the contract. Stamps the termination date, reason and the
    /// equipment-return deadline (`return_days` after the termination date).
    /// A second termination is a conflict; callers wanting to amend a
    /// termination update the fields directly.
    pub fn terminate(
        &mut self,
        date: NaiveDate,
        reason: impl Into<String>,
        return_days: u64,
    ) -> DomainResult<()> {
        if self.is_terminated() {
            return Err(DomainError::conflict(format!(
                "consultant {} is already terminated",
                self.name
            )));
        }
        self.termination_date = Some(date);
        self.termination_reason = Some(reason.into());
        self.equipment_return_deadline = date.checked_add_days(Days::new(return_days));
        self.active = false;
        Ok(())
    }

    /// Undo a termination and mark the consultant active again.
    pub fn reactivate(&mut self) {
        self.termination_date = None;
        self.termination_reason = None;
        self.equipment_return_deadline = None;
        self.active = true;
    }
}
