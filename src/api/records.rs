//! Generic CRUD over any [`Resource`]

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{ok, ApiError, ApiResult, AppState, Envelope, Path, Query, Resource};
use crate::domain::aggregates::Editable;
use crate::domain::events::{DomainEvent, RecordEvent};
use crate::repository::{Record, Repository};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

pub(super) fn crud<T: Resource>(router: Router<AppState>, base: &str) -> Router<AppState> {
    router
        .route(base, get(list::<T>).post(create::<T>))
        .route(&format!("{}/:id", base), get(find::<T>).put(update::<T>).delete(delete::<T>))
}

async fn list<T: Resource>(State(s): State<AppState>, Query(p): Query<SearchParams>) -> ApiResult<Vec<T>> {
    let repo = T::repository(&s);
    let records = match p.search.as_deref() {
        Some(term) => repo.search(term).await?,
        None => repo.list().await?,
    };
    ok(records)
}

async fn find<T: Resource>(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<T> {
    ok(T::repository(&s).get(id).await?)
}

async fn create<T: Resource>(
    State(s): State<AppState>,
    body: Result<Json<T::Input>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<T>>), ApiError> {
    let Json(input) = body?;
    input.validate()?;
    let record = T::from_input(input)?;
    check_references(&s, &record).await?;
    let record = T::repository(&s).create(record).await?;
    tracing::info!(collection = T::COLLECTION, id = %record.id(), "record created");
    s.events.publish(&DomainEvent::Record(RecordEvent::Created { collection: T::COLLECTION, id: record.id() })).await;
    Ok((StatusCode::CREATED, Json(Envelope::ok(record))))
}

async fn update<T: Resource>(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<T::Input>, JsonRejection>,
) -> ApiResult<T> {
    let Json(input) = body?;
    input.validate()?;
    let repo = T::repository(&s);
    let mut record = repo.get(id).await?;
    record.apply_input(input)?;
    check_references(&s, &record).await?;
    let record = repo.update(record).await?;
    s.events.publish(&DomainEvent::Record(RecordEvent::Updated { collection: T::COLLECTION, id })).await;
    ok(record)
}

async fn delete<T: Resource>(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    T::repository(&s).delete(id).await?;
    tracing::info!(collection = T::COLLECTION, %id, "record deleted");
    s.events.publish(&DomainEvent::Record(RecordEvent::Deleted { collection: T::COLLECTION, id })).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Every client, exporter or order a record points at must exist.
async fn check_references<T: Resource>(s: &AppState, record: &T) -> crate::Result<()> {
    let refs = record.references();
    if let Some(id) = refs.client_id { s.repos.clients.get(id).await?; }
    if let Some(id) = refs.exporter_id { s.repos.exporters.get(id).await?; }
    if let Some(id) = refs.order_id { s.repos.orders.get(id).await?; }
    Ok(())
}
