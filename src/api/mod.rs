//! HTTP boundary
//!
//! Every response uses the portal envelope: `{ "success": true, "data": ... }`
//! on success, `{ "success": false, "message": ... }` on failure.

mod documents;
mod records;
mod workflow;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::domain::aggregates::{Client, Editable, Exporter, Order, Payment, Product, Quote};
use crate::domain::value_objects::Locale;
use crate::publisher::EventPublisher;
use crate::repository::{Repositories, Repository};
use crate::InovalogError;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub events: EventPublisher,
    pub freight_amount: Decimal,
    pub default_locale: Locale,
}

impl AppState {
    pub fn new(repos: Repositories, events: EventPublisher, config: &AppConfig) -> Self {
        Self { repos, events, freight_amount: config.freight_amount, default_locale: config.default_locale }
    }
}

/// Other records a record points at.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct References {
    pub client_id: Option<Uuid>,
    pub exporter_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
}

/// Ties a record type to its repository so CRUD handlers can stay generic.
pub trait Resource: Editable {
    fn repository(state: &AppState) -> &Arc<dyn Repository<Self>>;

    fn references(&self) -> References { References::default() }
}

impl Resource for Client {
    fn repository(state: &AppState) -> &Arc<dyn Repository<Self>> { &state.repos.clients }
}
impl Resource for Exporter {
    fn repository(state: &AppState) -> &Arc<dyn Repository<Self>> { &state.repos.exporters }
}
impl Resource for Product {
    fn repository(state: &AppState) -> &Arc<dyn Repository<Self>> { &state.repos.products }
    fn references(&self) -> References { References { exporter_id: self.exporter_id, ..Default::default() } }
}
impl Resource for Quote {
    fn repository(state: &AppState) -> &Arc<dyn Repository<Self>> { &state.repos.quotes }
    fn references(&self) -> References {
        References { client_id: Some(self.client_id), exporter_id: self.exporter_id, order_id: None }
    }
}
impl Resource for Order {
    fn repository(state: &AppState) -> &Arc<dyn Repository<Self>> { &state.repos.orders }
    fn references(&self) -> References {
        References { client_id: Some(self.client_id), exporter_id: self.exporter_id, order_id: None }
    }
}
impl Resource for Payment {
    fn repository(state: &AppState) -> &Arc<dyn Repository<Self>> { &state.repos.payments }
    fn references(&self) -> References {
        References { client_id: Some(self.client_id), exporter_id: None, order_id: self.order_id }
    }
}

/// `axum::extract::Path` answering malformed segments with the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

/// `axum::extract::Query` answering malformed parameters with the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

pub fn router(state: AppState) -> Router {
    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "inovalog"})) }));
    let app = records::crud::<Client>(app, "/api/clients");
    let app = records::crud::<Exporter>(app, "/api/exporters");
    let app = records::crud::<Product>(app, "/api/products");
    let app = records::crud::<Quote>(app, "/api/quotes");
    let app = records::crud::<Order>(app, "/api/orders");
    let app = records::crud::<Payment>(app, "/api/payments");

    app.route("/api/totals", post(documents::totals))
        .route("/api/generate-document", post(documents::generate))
        .route("/api/documents", get(documents::list))
        .route("/api/documents/:id", get(documents::find))
        .route("/api/documents/:id/items", post(documents::add_item))
        .route("/api/documents/:id/items/:index", patch(documents::update_item).delete(documents::remove_item))
        .route("/api/clients/:id/account", get(workflow::client_account))
        .route("/api/quotes/:id/preview", get(workflow::quote_preview))
        .route("/api/quotes/:id/send", post(workflow::send_quote))
        .route("/api/quotes/:id/approve", post(workflow::approve_quote))
        .route("/api/quotes/:id/reject", post(workflow::reject_quote))
        .route("/api/quotes/:id/convert", post(workflow::convert_quote))
        .route("/api/orders/:id/totals", get(workflow::order_totals))
        .route("/api/orders/:id/confirm", post(workflow::confirm_order))
        .route("/api/orders/:id/start-production", post(workflow::start_production))
        .route("/api/orders/:id/ship", post(workflow::ship_order))
        .route("/api/orders/:id/deliver", post(workflow::deliver_order))
        .route("/api/orders/:id/cancel", post(workflow::cancel_order))
        .route("/api/payments/:id/pay", post(workflow::pay))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self { Self { success: true, data: Some(data), message: None } }
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

pub(crate) fn ok<T>(data: T) -> ApiResult<T> { Ok(Json(Envelope::ok(data))) }

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Domain(InovalogError),
}

impl From<InovalogError> for ApiError {
    fn from(err: InovalogError) -> Self { Self::Domain(err) }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self { Self::Domain(err.into()) }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Domain(err) => {
                let status = match &err {
                    InovalogError::NotFound { .. } => StatusCode::NOT_FOUND,
                    InovalogError::Validation(_)
                    | InovalogError::LastRow
                    | InovalogError::RowNotFound(_)
                    | InovalogError::NoItems => StatusCode::UNPROCESSABLE_ENTITY,
                    InovalogError::InvalidTransition { .. } => StatusCode::CONFLICT,
                    InovalogError::Storage(_) | InovalogError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                }
                (status, err.to_string())
            }
        };
        let body = Envelope::<()> { success: false, data: None, message: Some(message) };
        (status, Json(body)).into_response()
    }
}
