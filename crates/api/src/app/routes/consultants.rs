use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crewpay_consultants::{Consultant, EquipmentItem};
use crewpay_core::{ConsultantId, EquipmentItemId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

const DEFAULT_EQUIPMENT_RETURN_DAYS: u64 = 14;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_consultant).get(list_consultants))
        .route("/:id", get(get_consultant).put(update_consultant))
        .route("/:id/terminate", post(terminate_consultant))
        .route("/:id/reactivate", post(reactivate_consultant))
        .route("/:id/equipment", post(assign_equipment).get(list_equipment))
        .route("/:id/equipment/:item_id/return", post(return_equipment))
}

fn parse_consultant_id(raw: &str) -> Result<ConsultantId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid consultant id")
    })
}

#[derive(Debug, Deserialize)]
pub struct ListConsultantsQuery {
    /// When true, only consultants who have not been terminated.
    #[serde(default)]
    pub active: bool,
}

pub async fn create_consultant(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateConsultantRequest>,
) -> axum::response::Response {
    let mut consultant = match Consultant::new(
        body.name,
        body.email,
        body.role,
        dto::money(body.hourly_rate),
    ) {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e.into()),
    };
    consultant.client_invoice_service_name = body.client_invoice_service_name;
    consultant.client_invoice_unit_price = body.client_invoice_unit_price.map(dto::money);
    consultant.client_invoice_service_description = body.client_invoice_service_description;
    consultant.contract_signed_date = body.contract_signed_date;

    match services.consultants.create(&consultant).await {
        Ok(()) => (StatusCode::CREATED, Json(consultant)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_consultants(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ListConsultantsQuery>,
) -> axum::response::Response {
    match services.consultants.list(query.active).await {
        Ok(consultants) => Json(consultants).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_consultant(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_consultant_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.consultants.get(id).await {
        Ok(consultant) => Json(consultant).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_consultant(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateConsultantRequest>,
) -> axum::response::Response {
    let id = match parse_consultant_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let mut consultant = match services.consultants.get(id).await {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(name) = body.name {
        consultant.name = name;
    }
    if let Some(email) = body.email {
        consultant.email = email;
    }
    if let Some(role) = body.role {
        consultant.role = role;
    }
    if let Some(rate) = body.hourly_rate {
        consultant.hourly_rate = dto::money(rate);
    }
    if let Some(v) = body.client_invoice_service_name {
        consultant.client_invoice_service_name = Some(v);
    }
    if let Some(v) = body.client_invoice_unit_price {
        consultant.client_invoice_unit_price = Some(dto::money(v));
    }
    if let Some(v) = body.client_invoice_service_description {
        consultant.client_invoice_service_description = Some(v);
    }
    if let Some(v) = body.contract_signed_date {
        consultant.contract_signed_date = Some(v);
    }

    match services.consultants.update(&consultant).await {
        Ok(()) => Json(consultant).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn terminate_consultant(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::TerminateConsultantRequest>,
) -> axum::response::Response {
    let id = match parse_consultant_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let return_days = body
        .equipment_return_days
        .unwrap_or(DEFAULT_EQUIPMENT_RETURN_DAYS);
    match services
        .consultants
        .terminate(id, body.date, &body.reason, return_days)
        .await
    {
        Ok(consultant) => Json(consultant).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn reactivate_consultant(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_consultant_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.consultants.reactivate(id).await {
        Ok(consultant) => Json(consultant).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn assign_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AssignEquipmentRequest>,
) -> axum::response::Response {
    let id = match parse_consultant_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // The consultant must exist; a dangling assignment would otherwise only
    // surface as a foreign key error.
    if let Err(e) = services.consultants.get(id).await {
        return errors::store_error_to_response(e);
    }
    let item = match EquipmentItem::new(id, body.label, body.serial_number, body.assigned_on) {
        Ok(item) => item,
        Err(e) => return errors::store_error_to_response(e.into()),
    };
    match services.consultants.assign_equipment(&item).await {
        Ok(()) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_consultant_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.consultants.equipment_for(id).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn return_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, item_id)): Path<(String, String)>,
    Json(body): Json<dto::ReturnEquipmentRequest>,
) -> axum::response::Response {
    let consultant_id = match parse_consultant_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let item_id: EquipmentItemId = match item_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid equipment id")
        }
    };
    // The item must belong to the consultant in the path.
    let owned = match services.consultants.equipment_for(consultant_id).await {
        Ok(items) => items.iter().any(|i| i.id == item_id),
        Err(e) => return errors::store_error_to_response(e),
    };
    if !owned {
        return errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("equipment item {item_id} is not assigned to consultant {consultant_id}"),
        );
    }
    match services.consultants.return_equipment(item_id, body.date).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
