//! Totals preview and trade document generation

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{ok, ApiError, ApiResult, AppState, Envelope, Path, Query};
use crate::domain::aggregates::{Document, DocumentKind, ItemList, LineItem, LineItemPatch};
use crate::domain::events::{DocumentEvent, DomainEvent};
use crate::domain::totals::{compute_totals, DocumentTotals};
use crate::domain::value_objects::{amount_in_range, Incoterm, Locale};
use crate::render::{render, DocumentView, ViewKind};
use crate::repository::Repository;
use crate::Result;

#[derive(Debug, Deserialize, Validate)]
pub struct TotalsRequest {
    #[validate]
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub incoterm: Incoterm,
    #[validate(custom = "amount_in_range")]
    pub freight_amount: Option<Decimal>,
}

pub(super) async fn totals(State(s): State<AppState>, body: std::result::Result<Json<TotalsRequest>, JsonRejection>) -> ApiResult<DocumentTotals> {
    let Json(r) = body?;
    r.validate()?;
    ok(compute_totals(&r.items, r.incoterm, r.freight_amount.unwrap_or(s.freight_amount)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateDocumentRequest {
    pub kind: DocumentKind,
    /// Defaults to the order's incoterm, then FOB.
    pub incoterm: Option<Incoterm>,
    /// When empty and `order_id` is set, the order's items are used.
    #[validate]
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub client_id: Option<Uuid>,
    pub exporter_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    #[validate(custom = "amount_in_range")]
    pub freight_amount: Option<Decimal>,
    pub locale: Option<Locale>,
}

#[derive(Debug, Serialize)]
pub struct RenderedDocument {
    pub document: Document,
    pub totals: DocumentTotals,
    pub view: DocumentView,
}

impl RenderedDocument {
    fn new(document: Document, locale: Locale) -> Self {
        let totals = document.totals();
        let view = render(ViewKind::Document(document.kind), &document.number, &totals, locale);
        Self { document, totals, view }
    }
}

pub(super) async fn generate(
    State(s): State<AppState>,
    body: std::result::Result<Json<GenerateDocumentRequest>, JsonRejection>,
) -> std::result::Result<(StatusCode, Json<Envelope<RenderedDocument>>), ApiError> {
    let Json(r) = body?;
    r.validate()?;

    let order = match r.order_id {
        Some(id) => Some(s.repos.orders.get(id).await?),
        None => None,
    };
    if let Some(id) = r.exporter_id { s.repos.exporters.get(id).await?; }
    let client_id = r.client_id.or(order.as_ref().map(|o| o.client_id));
    if let Some(id) = client_id { s.repos.clients.get(id).await?; }

    let (items, incoterm, freight) = match &order {
        Some(o) if r.items.is_empty() => (o.items.clone(), r.incoterm.unwrap_or(o.incoterm), r.freight_amount.or(o.freight_amount)),
        Some(o) => (r.items, r.incoterm.unwrap_or(o.incoterm), r.freight_amount.or(o.freight_amount)),
        None => (r.items, r.incoterm.unwrap_or_default(), r.freight_amount),
    };
    let locale = r.locale.unwrap_or(s.default_locale);

    let mut document = Document::generate(r.kind, incoterm, items, freight.unwrap_or(s.freight_amount), locale)?;
    document.client_id = client_id;
    document.exporter_id = r.exporter_id.or(order.as_ref().and_then(|o| o.exporter_id));
    document.order_id = r.order_id;
    let document = s.repos.documents.create(document).await?;

    let rendered = RenderedDocument::new(document, locale);
    tracing::info!(number = %rendered.document.number, kind = ?rendered.document.kind, grand_total = %rendered.totals.grand_total, "document generated");
    s.events.publish(&DomainEvent::Document(DocumentEvent::Generated {
        document_id: rendered.document.id,
        kind: rendered.document.kind,
        number: rendered.document.number.clone(),
        grand_total: rendered.totals.grand_total,
    })).await;
    Ok((StatusCode::CREATED, Json(Envelope::ok(rendered))))
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentParams {
    pub search: Option<String>,
    pub locale: Option<Locale>,
}

pub(super) async fn list(State(s): State<AppState>, Query(p): Query<DocumentParams>) -> ApiResult<Vec<Document>> {
    let documents = match p.search.as_deref() {
        Some(term) => s.repos.documents.search(term).await?,
        None => s.repos.documents.list().await?,
    };
    ok(documents)
}

pub(super) async fn find(State(s): State<AppState>, Path(id): Path<Uuid>, Query(p): Query<DocumentParams>) -> ApiResult<RenderedDocument> {
    let document = s.repos.documents.get(id).await?;
    let locale = p.locale.unwrap_or(document.locale);
    ok(RenderedDocument::new(document, locale))
}

pub(super) async fn add_item(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    body: std::result::Result<Json<LineItem>, JsonRejection>,
) -> ApiResult<RenderedDocument> {
    let Json(item) = body?;
    item.validate()?;
    ok(edit_rows(&s, id, |rows| { rows.add_row(item); Ok(()) }).await?)
}

pub(super) async fn update_item(
    State(s): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    body: std::result::Result<Json<LineItemPatch>, JsonRejection>,
) -> ApiResult<RenderedDocument> {
    let Json(patch) = body?;
    patch.validate()?;
    ok(edit_rows(&s, id, |rows| rows.update_row(index, patch).map(|_| ())).await?)
}

pub(super) async fn remove_item(State(s): State<AppState>, Path((id, index)): Path<(Uuid, usize)>) -> ApiResult<RenderedDocument> {
    ok(edit_rows(&s, id, |rows| rows.remove_row(index).map(|_| ())).await?)
}

/// Applies one editor operation to a stored document and re-renders it.
async fn edit_rows(s: &AppState, id: Uuid, edit: impl FnOnce(&mut ItemList) -> Result<()>) -> Result<RenderedDocument> {
    let mut document = s.repos.documents.get(id).await?;
    let mut rows = ItemList::for_kind(document.kind).with_rows(std::mem::take(&mut document.items));
    edit(&mut rows)?;
    document.items = rows.into_rows();
    let document = s.repos.documents.update(document).await?;
    tracing::info!(number = %document.number, rows = document.items.len(), "document rows edited");
    let locale = document.locale;
    Ok(RenderedDocument::new(document, locale))
}
