//! Request DTOs and JSON mapping helpers.
//!
//! Money comes in over the wire as major units (`5410.77`) and is converted
//! at the boundary; domain types and responses carry cents.

use chrono::NaiveDate;
use serde::Deserialize;

use crewpay_core::Money;
use crewpay_payroll::WorkflowStep;

// -------------------------
// Consultants
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateConsultantRequest {
    pub name: String,
    pub email: String,
    pub role: String,
    pub hourly_rate: f64,
    pub client_invoice_service_name: Option<String>,
    pub client_invoice_unit_price: Option<f64>,
    pub client_invoice_service_description: Option<String>,
    pub contract_signed_date: Option<NaiveDate>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateConsultantRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub hourly_rate: Option<f64>,
    pub client_invoice_service_name: Option<String>,
    pub client_invoice_unit_price: Option<f64>,
    pub client_invoice_service_description: Option<String>,
    pub contract_signed_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct TerminateConsultantRequest {
    pub date: NaiveDate,
    pub reason: String,
    /// Days until assigned equipment must be back; defaults to 14.
    pub equipment_return_days: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignEquipmentRequest {
    pub label: String,
    pub serial_number: Option<String>,
    pub assigned_on: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ReturnEquipmentRequest {
    pub date: NaiveDate,
}

// -------------------------
// Payroll cycles
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateCycleRequest {
    pub month_label: String,
    pub work_hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCycleRequest {
    pub work_hours: Option<f64>,
    pub invoice_bonus: Option<f64>,
    pub bonus_recipient_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteStepRequest {
    pub step: WorkflowStep,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCycleLineItemRequest {
    pub work_hours_override: Option<f64>,
    pub adjustment: Option<f64>,
    pub adjustment_note: Option<String>,
    pub bonus_date: Option<NaiveDate>,
    pub bonus_announced_date: Option<NaiveDate>,
}

// -------------------------
// Client invoices
// -------------------------

#[derive(Debug, Deserialize, Default)]
pub struct CreateInvoiceFromCycleRequest {
    /// Defaults to today when absent (or when no body is sent at all).
    pub issue_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub issue_date: Option<NaiveDate>,
    pub tax: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceLineItemRequest {
    pub quantity: Option<i64>,
    pub rate: Option<f64>,
    pub description: Option<String>,
}

pub fn money(value: f64) -> Money {
    Money::from_major_units(value)
}
