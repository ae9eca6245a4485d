//! Black-box tests over the full router and an in-memory database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn test_app() -> Router {
    crewpay_api::app::build_app("sqlite::memory:")
        .await
        .expect("in-memory database")
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_consultant(app: &Router, name: &str, unit_price: Option<f64>) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/consultants",
        Some(json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "role": "Senior Software Developer I",
            "hourly_rate": 95.00,
            "client_invoice_unit_price": unit_price,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn create_cycle(app: &Router, month: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/cycles",
        Some(json!({ "month_label": month, "work_hours": 160.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["cycle"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_ok() {
    let app = test_app().await;
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invoice_generation_flow() {
    let app = test_app().await;
    for name in ["Alice", "Bob", "Carol"] {
        create_consultant(&app, name, Some(5410.77)).await;
    }
    let cycle_id = create_cycle(&app, "2025-10").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/client-invoices/from-cycle/{cycle_id}"),
        Some(json!({ "issue_date": "2025-10-31" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["invoice"]["invoice_number"], 198);
    // 3 x 5410.77 + 751.96 default bonus, in cents.
    assert_eq!(body["invoice"]["subtotal"], 1_698_427);
    assert_eq!(body["invoice"]["status"], "DRAFT");
    assert_eq!(body["line_items"].as_array().unwrap().len(), 2);

    // A second invoice for the same cycle is refused.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/client-invoices/from-cycle/{cycle_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn check_reports_missing_billing_data() {
    let app = test_app().await;
    create_consultant(&app, "Alice", Some(5410.77)).await;
    create_consultant(&app, "Bob", None).await;
    let cycle_id = create_cycle(&app, "2025-10").await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/client-invoices/from-cycle/{cycle_id}/check"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eligible"], false);
    assert!(body["reasons"][0].as_str().unwrap().contains("Bob"));

    // And creation fails without writing anything.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/client-invoices/from-cycle/{cycle_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, invoices) = send(&app, "GET", "/api/client-invoices", None).await;
    assert_eq!(invoices.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn status_transitions_and_stamping() {
    let app = test_app().await;
    create_consultant(&app, "Alice", Some(5410.77)).await;
    let cycle_id = create_cycle(&app, "2025-10").await;
    let (_, created) = send(
        &app,
        "POST",
        &format!("/api/client-invoices/from-cycle/{cycle_id}"),
        None,
    )
    .await;
    let invoice_id = created["invoice"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/client-invoices/{invoice_id}/status"),
        Some(json!({ "status": "SENT" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "SENT");
    assert!(!body["sent_date"].is_null());

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/client-invoices/{invoice_id}/status"),
        Some(json!({ "status": "MAILED" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn updating_invoice_fields_applies_tax() {
    let app = test_app().await;
    create_consultant(&app, "Alice", Some(5410.77)).await;
    let cycle_id = create_cycle(&app, "2025-10").await;
    let (_, created) = send(
        &app,
        "POST",
        &format!("/api/client-invoices/from-cycle/{cycle_id}"),
        None,
    )
    .await;
    let invoice_id = created["invoice"]["id"].as_str().unwrap().to_string();
    let subtotal = created["invoice"]["subtotal"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/client-invoices/{invoice_id}"),
        Some(json!({ "issue_date": "2025-11-05", "tax": 100.00 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["invoice"]["issue_date"], "2025-11-05");
    assert_eq!(body["invoice"]["tax"], 10_000);
    assert_eq!(body["invoice"]["total"], subtotal + 10_000);
    assert_eq!(body["invoice"]["amount_due"], subtotal + 10_000);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/client-invoices/{invoice_id}"),
        Some(json!({ "tax": -1.00 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn unknown_ids_map_to_the_error_envelope() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/client-invoices/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let missing = uuid::Uuid::now_v7();
    let (status, body) = send(&app, "GET", &format!("/api/client-invoices/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(&app, "DELETE", &format!("/api/client-invoices/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn equipment_return_requires_the_owning_consultant() {
    let app = test_app().await;
    let alice = create_consultant(&app, "Alice", None).await;
    let bob = create_consultant(&app, "Bob", None).await;

    let (status, item) = send(
        &app,
        "POST",
        &format!("/api/consultants/{alice}/equipment"),
        Some(json!({ "label": "MacBook Pro 14", "assigned_on": "2025-03-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{item}");
    let item_id = item["id"].as_str().unwrap().to_string();

    // Returning through another consultant's path is refused.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/consultants/{bob}/equipment/{item_id}/return"),
        Some(json!({ "date": "2025-03-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/consultants/{alice}/equipment/{item_id}/return"),
        Some(json!({ "date": "2025-03-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["returned_on"], "2025-03-05");
}

#[tokio::test]
async fn terminate_consultant_over_http() {
    let app = test_app().await;
    let id = create_consultant(&app, "Alice", None).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/consultants/{id}/terminate"),
        Some(json!({ "date": "2025-10-15", "reason": "contract ended" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["active"], false);
    assert_eq!(body["equipment_return_deadline"], "2025-10-29");

    // Repeat termination conflicts.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/consultants/{id}/terminate"),
        Some(json!({ "date": "2025-10-16", "reason": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}
