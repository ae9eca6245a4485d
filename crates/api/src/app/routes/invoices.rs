use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use crewpay_core::{CycleId, InvoiceId, InvoiceLineItemId};
use crewpay_invoicing::{ClientInvoice, InvoiceLineItem, InvoiceStatus};
use crewpay_store::LineItemPatch;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices))
        .route("/from-cycle/:cycle_id", post(create_from_cycle))
        .route("/from-cycle/:cycle_id/check", get(check_from_cycle))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/:id/status", put(update_status))
        .route("/:id/line-items/:line_item_id", put(update_line_item))
        .route("/:id/sync-bonus", post(sync_bonus))
}

fn parse_invoice_id(raw: &str) -> Result<InvoiceId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id"))
}

fn parse_cycle_id(raw: &str) -> Result<CycleId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid cycle id"))
}

fn invoice_with_items(invoice: &ClientInvoice, items: &[InvoiceLineItem]) -> serde_json::Value {
    json!({ "invoice": invoice, "line_items": items })
}

pub async fn create_from_cycle(
    Extension(services): Extension<Arc<AppServices>>,
    Path(cycle_id): Path<String>,
    body: Option<Json<dto::CreateInvoiceFromCycleRequest>>,
) -> axum::response::Response {
    let cycle_id = match parse_cycle_id(&cycle_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let issue_date = body
        .and_then(|Json(b)| b.issue_date)
        .unwrap_or_else(|| Utc::now().date_naive());

    match services.invoices.create_from_cycle(cycle_id, issue_date).await {
        Ok((invoice, items)) => {
            (StatusCode::CREATED, Json(invoice_with_items(&invoice, &items))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Dry-run probe: reports whether invoice creation would succeed and why not.
pub async fn check_from_cycle(
    Extension(services): Extension<Arc<AppServices>>,
    Path(cycle_id): Path<String>,
) -> axum::response::Response {
    let cycle_id = match parse_cycle_id(&cycle_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.invoices.check_from_cycle(cycle_id).await {
        Ok(eligibility) => Json(eligibility).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.invoices.list().await {
        Ok(invoices) => Json(invoices).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.invoices.get(id).await {
        Ok((invoice, items)) => Json(invoice_with_items(&invoice, &items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateInvoiceRequest>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let tax = body.tax.map(dto::money);
    match services.invoices.update_fields(id, body.issue_date, tax).await {
        Ok((invoice, items)) => Json(invoice_with_items(&invoice, &items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateInvoiceStatusRequest>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status: InvoiceStatus = match body.status.parse() {
        Ok(s) => s,
        Err(e) => return errors::store_error_to_response(e.into()),
    };
    // A transition into SENT is where outbound delivery (PDF, email) would
    // hook in; this service only records the state change.
    match services.invoices.update_status(id, status, Utc::now()).await {
        Ok(invoice) => Json(invoice).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_line_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, line_item_id)): Path<(String, String)>,
    Json(body): Json<dto::UpdateInvoiceLineItemRequest>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let line_item_id: InvoiceLineItemId = match line_item_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid line item id")
        }
    };
    let patch = LineItemPatch {
        quantity: body.quantity,
        rate: body.rate.map(dto::money),
        description: body.description,
    };
    match services.invoices.update_line_item(id, line_item_id, patch).await {
        Ok((invoice, items)) => Json(invoice_with_items(&invoice, &items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Re-pull the bonus from the invoice's cycle and reconcile totals.
pub async fn sync_bonus(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.invoices.sync_bonus_from_cycle(id).await {
        Ok((invoice, items)) => Json(invoice_with_items(&invoice, &items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.invoices.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
