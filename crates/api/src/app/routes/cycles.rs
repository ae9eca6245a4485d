use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crewpay_core::{ConsultantId, CycleId, CycleLineItemId};
use crewpay_payroll::PayrollCycle;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_cycle).get(list_cycles))
        .route("/:id", get(get_cycle).put(update_cycle).delete(delete_cycle))
        .route("/:id/steps", post(complete_step))
        .route("/:id/archive", post(archive_cycle))
        .route("/:id/line-items/:line_item_id", put(update_line_item))
}

fn parse_cycle_id(raw: &str) -> Result<CycleId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid cycle id"))
}

#[derive(Debug, Deserialize)]
pub struct ListCyclesQuery {
    #[serde(default)]
    pub include_archived: bool,
}

/// Create a cycle and snapshot the currently active consultants into it.
pub async fn create_cycle(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateCycleRequest>,
) -> axum::response::Response {
    let cycle = match PayrollCycle::new(body.month_label, body.work_hours) {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e.into()),
    };
    let consultants = match services.consultants.list(true).await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };
    match services.cycles.create(&cycle, &consultants).await {
        Ok(line_items) => (
            StatusCode::CREATED,
            Json(json!({ "cycle": cycle, "line_items": line_items })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_cycles(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ListCyclesQuery>,
) -> axum::response::Response {
    match services.cycles.list(query.include_archived).await {
        Ok(cycles) => Json(cycles).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_cycle(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_cycle_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.cycles.get(id).await {
        Ok((cycle, line_items)) => {
            Json(json!({ "cycle": cycle, "line_items": line_items })).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_cycle(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCycleRequest>,
) -> axum::response::Response {
    let id = match parse_cycle_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (mut cycle, _) = match services.cycles.get(id).await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(hours) = body.work_hours {
        if hours <= 0.0 {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "work hours must be positive",
            );
        }
        cycle.work_hours = hours;
    }
    if let Some(bonus) = body.invoice_bonus {
        cycle.invoice_bonus = Some(dto::money(bonus));
    }
    if let Some(raw) = body.bonus_recipient_id {
        let recipient: ConsultantId = match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid bonus recipient id",
                )
            }
        };
        cycle.bonus_recipient_id = Some(recipient);
    }

    match services.cycles.update(&cycle).await {
        Ok(()) => Json(cycle).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Tick off one workflow step; the first completion stamps its timestamp.
pub async fn complete_step(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::CompleteStepRequest>,
) -> axum::response::Response {
    let id = match parse_cycle_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.cycles.complete_step(id, body.step, Utc::now()).await {
        Ok(cycle) => Json(cycle).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn archive_cycle(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_cycle_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.cycles.archive(id).await {
        Ok(cycle) => Json(cycle).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_line_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, line_item_id)): Path<(String, String)>,
    Json(body): Json<dto::UpdateCycleLineItemRequest>,
) -> axum::response::Response {
    let cycle_id = match parse_cycle_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let line_item_id: CycleLineItemId = match line_item_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid line item id")
        }
    };

    let mut item = match services.cycles.get_line_item(line_item_id).await {
        Ok(item) => item,
        Err(e) => return errors::store_error_to_response(e),
    };
    if item.cycle_id != cycle_id {
        return errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("line item {line_item_id} does not belong to cycle {cycle_id}"),
        );
    }

    if let Some(hours) = body.work_hours_override {
        item.work_hours_override = Some(hours);
    }
    if let Some(adjustment) = body.adjustment {
        item.adjustment = dto::money(adjustment);
    }
    if let Some(note) = body.adjustment_note {
        item.adjustment_note = Some(note);
    }
    if let Some(date) = body.bonus_date {
        item.bonus_date = Some(date);
    }
    if let Some(date) = body.bonus_announced_date {
        item.bonus_announced_date = Some(date);
    }

    match services.cycles.update_line_item(&item).await {
        Ok(()) => Json(item).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_cycle(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_cycle_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.cycles.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
