//! End-to-end tests against the in-process router with in-memory storage.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use inovalog::{api, config::AppConfig, publisher::EventPublisher, repository::Repositories, seed};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with(repos: Repositories) -> Router {
    api::router(api::AppState::new(repos, EventPublisher::disabled(), &AppConfig::default()))
}

fn app() -> Router { app_with(Repositories::in_memory()) }

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn sample_items() -> Value {
    json!([
        { "description": "Arabica coffee", "tariff_code": "0901.11.10", "quantity": 200, "unit_weight": 12.5, "unit_price": 45.0 },
        { "description": "Robusta coffee", "tariff_code": "0901.11.90", "quantity": 150, "unit_weight": 12.0, "unit_price": 38.0 },
        { "description": "Cane sugar", "tariff_code": "1701.14.00", "quantity": 350, "unit_weight": 2.0, "unit_price": 12.0 }
    ])
}

fn amount(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.as_f64().unwrap(),
    }
}

async fn create_client(app: &Router) -> String {
    let (status, body) = call(app, Method::POST, "/api/clients", Some(json!({
        "name": "Hans Weber", "company": "Hamburg Kaffee GmbH", "email": "einkauf@hamburg.test", "country": "DE"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_works() {
    let (status, body) = call(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn totals_fob_adds_freight() {
    let (status, body) = call(&app(), Method::POST, "/api/totals", Some(json!({ "items": sample_items(), "incoterm": "fob" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(amount(&body["data"]["total_quantity"]), 700.0);
    assert_eq!(amount(&body["data"]["merchandise_value"]), 18900.0);
    assert_eq!(amount(&body["data"]["grand_total"]), 21400.0);
    assert!(body["data"]["lines"][0]["adjusted_unit_price"].is_null());
}

#[tokio::test]
async fn totals_cif_keeps_grand_total_at_merchandise() {
    let (_, body) = call(&app(), Method::POST, "/api/totals", Some(json!({ "items": sample_items(), "incoterm": "cif" }))).await;
    assert_eq!(amount(&body["data"]["grand_total"]), 18900.0);
    let adjusted = amount(&body["data"]["lines"][0]["adjusted_unit_price"]);
    assert!((adjusted - 50.952_380_952).abs() < 1e-6);
}

#[tokio::test]
async fn totals_rejects_bad_input() {
    let app = app();
    let (status, body) = call(&app, Method::POST, "/api/totals", Some(json!({ "items": [], "incoterm": "ddp" }))).await;
    assert!(status.is_client_error());
    assert_eq!(body["success"], false);

    let negative = json!([{ "description": "X", "quantity": -1, "unit_weight": 1, "unit_price": 1 }]);
    let (status, body) = call(&app, Method::POST, "/api/totals", Some(json!({ "items": negative, "incoterm": "fob" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("Validation"));
}

#[tokio::test]
async fn client_crud_and_search() {
    let app = app();
    let id = create_client(&app).await;

    let (status, body) = call(&app, Method::GET, "/api/clients?search=hamburg", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = call(&app, Method::PUT, &format!("/api/clients/{}", id), Some(json!({
        "name": "Hans Weber", "email": "hans@hamburg.test", "country": "DE", "active": false
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active"], false);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/clients/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = call(&app, Method::GET, &format!("/api/clients/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn invalid_client_is_rejected() {
    let (status, body) = call(&app(), Method::POST, "/api/clients", Some(json!({ "name": "", "email": "bad", "country": "DE" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn quote_to_order_to_documents() {
    let app = app();
    let client_id = create_client(&app).await;

    let (status, body) = call(&app, Method::POST, "/api/quotes", Some(json!({
        "client_id": client_id, "incoterm": "cif", "items": sample_items()
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let quote_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = call(&app, Method::GET, &format!("/api/quotes/{}/preview?locale=pt", quote_id), None).await;
    assert_eq!(body["data"]["view"]["title"], "Orçamento");
    assert_eq!(body["data"]["view"]["rows"][0][4], "$50.95");

    let (status, _) = call(&app, Method::POST, &format!("/api/quotes/{}/convert", quote_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app, Method::POST, &format!("/api/quotes/{}/approve", quote_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");

    let (status, body) = call(&app, Method::POST, &format!("/api/quotes/{}/convert", quote_id), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["quote_id"], quote_id.as_str());

    let (_, body) = call(&app, Method::GET, &format!("/api/orders/{}/totals", order_id), None).await;
    assert_eq!(amount(&body["data"]["grand_total"]), 18900.0);

    let (status, _) = call(&app, Method::POST, &format!("/api/orders/{}/ship", order_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    for step in ["confirm", "start-production"] {
        let (status, _) = call(&app, Method::POST, &format!("/api/orders/{}/{}", order_id, step), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = call(&app, Method::POST, &format!("/api/orders/{}/ship?tracking=MSKU7654321", order_id), None).await;
    assert_eq!(body["data"]["status"], "shipped");
    assert_eq!(body["data"]["tracking"], "MSKU7654321");

    let (status, body) = call(&app, Method::POST, "/api/generate-document", Some(json!({
        "kind": "commercial_invoice", "order_id": order_id
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["document"]["number"].as_str().unwrap().starts_with("CI-"));
    assert_eq!(body["data"]["document"]["client_id"], client_id.as_str());
    assert_eq!(body["data"]["view"]["title"], "Commercial Invoice");
    let document_id = body["data"]["document"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, Method::GET, &format!("/api/documents/{}?locale=pt", document_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["view"]["title"], "Fatura Comercial");
}

#[tokio::test]
async fn packing_list_requires_a_row() {
    let (status, body) = call(&app(), Method::POST, "/api/generate-document", Some(json!({
        "kind": "packing_list", "incoterm": "fob", "items": []
    }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn generate_proforma_from_items() {
    let (status, body) = call(&app(), Method::POST, "/api/generate-document", Some(json!({
        "kind": "proforma_invoice", "incoterm": "exw", "items": sample_items(), "freight_amount": "1000.00"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(amount(&body["data"]["totals"]["grand_total"]), 19900.0);
    let footer = body["data"]["view"]["footer"].as_array().unwrap();
    assert!(footer.iter().any(|r| r["label"] == "Freight" && r["value"] == "$1000.00"));
}

#[tokio::test]
async fn account_summary_tracks_payments() {
    let app = app();
    let client_id = create_client(&app).await;
    let (_, body) = call(&app, Method::POST, "/api/payments", Some(json!({
        "client_id": client_id, "description": "Advance", "amount": "5670.00", "due_date": "2000-01-01"
    }))).await;
    let payment_id = body["data"]["id"].as_str().unwrap().to_string();
    call(&app, Method::POST, "/api/payments", Some(json!({
        "client_id": client_id, "description": "Balance", "amount": "1000", "due_date": "2999-01-01"
    }))).await;

    let (_, body) = call(&app, Method::GET, &format!("/api/clients/{}/account", client_id), None).await;
    assert_eq!(amount(&body["data"]["outstanding"]), 6670.0);
    assert_eq!(amount(&body["data"]["overdue"]), 5670.0);
    assert_eq!(body["data"]["overdue_count"], 1);

    let (status, _) = call(&app, Method::POST, &format!("/api/payments/{}/pay", payment_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::POST, &format!("/api/payments/{}/pay", payment_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = call(&app, Method::GET, &format!("/api/clients/{}/account", client_id), None).await;
    assert_eq!(amount(&body["data"]["paid"]), 5670.0);
    assert_eq!(amount(&body["data"]["outstanding"]), 1000.0);
    assert_eq!(body["data"]["overdue_count"], 0);
}

#[tokio::test]
async fn demo_data_is_browsable() {
    let repos = Repositories::in_memory();
    seed::load_demo_data(&repos).await.unwrap();
    let app = app_with(repos);

    let (_, body) = call(&app, Method::GET, "/api/quotes", None).await;
    let quote_id = body["data"][0]["id"].as_str().unwrap().to_string();
    let (_, body) = call(&app, Method::GET, &format!("/api/quotes/{}/preview", quote_id), None).await;
    assert_eq!(body["data"]["view"]["footer"].as_array().unwrap().last().unwrap()["value"], "$18900.00");

    let (_, body) = call(&app, Method::GET, "/api/products?search=0901", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn packing_list_rows_can_be_edited() {
    let app = app();
    let (_, body) = call(&app, Method::POST, "/api/generate-document", Some(json!({
        "kind": "packing_list", "incoterm": "fob",
        "items": [{ "description": "Arabica coffee", "quantity": 200, "unit_weight": 12.5, "unit_price": 45.0 }]
    }))).await;
    let id = body["data"]["document"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, Method::DELETE, &format!("/api/documents/{}/items/0", id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let (status, _) = call(&app, Method::POST, &format!("/api/documents/{}/items", id), Some(json!({
        "description": "Cane sugar", "quantity": 350, "unit_weight": 2.0, "unit_price": 12.0
    }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::PATCH, &format!("/api/documents/{}/items/1", id), Some(json!({ "quantity": 100 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&body["data"]["totals"]["total_quantity"]), 300.0);
    assert_eq!(amount(&body["data"]["totals"]["total_weight"]), 2700.0);

    let (status, body) = call(&app, Method::DELETE, &format!("/api/documents/{}/items/0", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["document"]["items"].as_array().unwrap().len(), 1);

    let (status, _) = call(&app, Method::PATCH, &format!("/api/documents/{}/items/5", id), Some(json!({ "quantity": 1 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn quote_can_be_sent_once() {
    let app = app();
    let client_id = create_client(&app).await;
    let (_, body) = call(&app, Method::POST, "/api/quotes", Some(json!({
        "client_id": client_id, "incoterm": "fob", "items": sample_items()
    }))).await;
    let quote_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, Method::POST, &format!("/api/quotes/{}/send", quote_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "sent");
    let (status, _) = call(&app, Method::POST, &format!("/api/quotes/{}/send", quote_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn oversized_figures_are_rejected_with_envelope() {
    let app = app();
    let huge = json!([{ "description": "Bulk", "quantity": "79228162514264337593543950335", "unit_weight": 1, "unit_price": "2" }]);
    let (status, body) = call(&app, Method::POST, "/api/totals", Some(json!({ "items": huge, "incoterm": "cif" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let largest = json!([{ "description": "Bulk", "quantity": "1000000000000", "unit_weight": "1000000000000", "unit_price": "1000000000000" }]);
    let (status, body) = call(&app, Method::POST, "/api/totals", Some(json!({ "items": largest, "incoterm": "fob" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["merchandise_value"], "1000000000000000000000000");
}

#[tokio::test]
async fn approved_quote_converts_only_once() {
    let app = app();
    let client_id = create_client(&app).await;
    let (_, body) = call(&app, Method::POST, "/api/quotes", Some(json!({
        "client_id": client_id, "incoterm": "cfr", "items": sample_items()
    }))).await;
    let quote_id = body["data"]["id"].as_str().unwrap().to_string();
    call(&app, Method::POST, &format!("/api/quotes/{}/approve", quote_id), None).await;

    let (status, _) = call(&app, Method::POST, &format!("/api/quotes/{}/convert", quote_id), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = call(&app, Method::POST, &format!("/api/quotes/{}/convert", quote_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (_, body) = call(&app, Method::GET, "/api/orders", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = call(&app, Method::GET, &format!("/api/quotes/{}", quote_id), None).await;
    assert_eq!(body["data"]["status"], "converted");
}

#[tokio::test]
async fn expired_quote_is_stored_as_expired() {
    let app = app();
    let client_id = create_client(&app).await;
    let (_, body) = call(&app, Method::POST, "/api/quotes", Some(json!({
        "client_id": client_id, "incoterm": "fob", "items": sample_items(), "valid_until": "2000-01-01"
    }))).await;
    let quote_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, Method::POST, &format!("/api/quotes/{}/approve", quote_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("expired"));
    let (_, body) = call(&app, Method::GET, &format!("/api/quotes/{}", quote_id), None).await;
    assert_eq!(body["data"]["status"], "expired");
}

#[tokio::test]
async fn malformed_path_and_query_use_envelope() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/api/clients/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("UUID"));

    let id = uuid::Uuid::now_v7();
    let (status, body) = call(&app, Method::DELETE, &format!("/api/documents/{}/items/first", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = call(&app, Method::GET, &format!("/api/documents/{}?locale=fr", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn records_must_reference_known_parties() {
    let app = app();
    let unknown = uuid::Uuid::now_v7().to_string();
    let (status, body) = call(&app, Method::POST, "/api/quotes", Some(json!({
        "client_id": unknown, "incoterm": "fob", "items": sample_items()
    }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let client_id = create_client(&app).await;
    let (status, _) = call(&app, Method::POST, "/api/payments", Some(json!({
        "client_id": client_id, "order_id": unknown, "description": "Advance", "amount": "10", "due_date": "2999-01-01"
    }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = call(&app, Method::GET, "/api/quotes", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}
