//! Quote approval, order progression, payments and account balances

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ok, ApiError, ApiResult, AppState, Envelope, Path, Query};
use crate::domain::aggregates::{AccountSummary, Order, Payment, Quote};
use crate::domain::totals::DocumentTotals;
use crate::domain::value_objects::Locale;
use crate::render::{render, DocumentView, ViewKind};
use crate::repository::Repository;
use crate::{InovalogError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct PreviewParams {
    pub locale: Option<Locale>,
}

#[derive(Debug, Serialize)]
pub struct QuotePreview {
    pub quote: Quote,
    pub totals: DocumentTotals,
    pub view: DocumentView,
}

pub(super) async fn quote_preview(State(s): State<AppState>, Path(id): Path<Uuid>, Query(p): Query<PreviewParams>) -> ApiResult<QuotePreview> {
    let quote = s.repos.quotes.get(id).await?;
    let totals = quote.totals(s.freight_amount);
    let view = render(ViewKind::Quote, &quote.number, &totals, p.locale.unwrap_or(s.default_locale));
    ok(QuotePreview { quote, totals, view })
}

pub(super) async fn send_quote(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Quote> {
    ok(save_quote(&s, id, Quote::send).await?)
}

/// A quote past its validity date is stored as expired before the approval is refused.
pub(super) async fn approve_quote(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Quote> {
    let today = Utc::now().date_naive();
    let mut quote = s.repos.quotes.get(id).await?;
    if quote.expire_if_due(today) {
        let quote = s.repos.quotes.update(quote).await?;
        tracing::info!(quote = %id, number = %quote.number, "quote expired before approval");
        return Err(InovalogError::InvalidTransition { action: "approve", state: "quote is expired".into() }.into());
    }
    let freight = s.freight_amount;
    ok(commit_quote(&s, quote, |q| q.approve(today, freight)).await?)
}

pub(super) async fn reject_quote(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Quote> {
    ok(save_quote(&s, id, Quote::reject).await?)
}

pub(super) async fn convert_quote(State(s): State<AppState>, Path(id): Path<Uuid>) -> std::result::Result<(StatusCode, Json<Envelope<Order>>), ApiError> {
    let mut quote = s.repos.quotes.get(id).await?;
    let order = s.repos.orders.create(Order::from_quote(&mut quote)?).await?;
    let events = quote.take_events();
    s.repos.quotes.update(quote).await?;
    tracing::info!(quote = %id, order = %order.id, number = %order.number, "quote converted to order");
    s.events.publish_all(events).await;
    Ok((StatusCode::CREATED, Json(Envelope::ok(order))))
}

async fn save_quote(s: &AppState, id: Uuid, action: impl FnOnce(&mut Quote) -> Result<()>) -> Result<Quote> {
    let quote = s.repos.quotes.get(id).await?;
    commit_quote(s, quote, action).await
}

async fn commit_quote(s: &AppState, mut quote: Quote, action: impl FnOnce(&mut Quote) -> Result<()>) -> Result<Quote> {
    action(&mut quote)?;
    let events = quote.take_events();
    let quote = s.repos.quotes.update(quote).await?;
    tracing::info!(quote = %quote.id, status = ?quote.status, "quote status changed");
    s.events.publish_all(events).await;
    Ok(quote)
}

pub(super) async fn order_totals(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<DocumentTotals> {
    ok(s.repos.orders.get(id).await?.totals(s.freight_amount))
}

#[derive(Debug, Default, Deserialize)]
pub struct ShipParams {
    pub tracking: Option<String>,
}

pub(super) async fn confirm_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Order> {
    ok(save_order(&s, id, Order::confirm).await?)
}

pub(super) async fn start_production(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Order> {
    ok(save_order(&s, id, Order::start_production).await?)
}

pub(super) async fn ship_order(State(s): State<AppState>, Path(id): Path<Uuid>, Query(p): Query<ShipParams>) -> ApiResult<Order> {
    ok(save_order(&s, id, |o| o.ship(p.tracking)).await?)
}

pub(super) async fn deliver_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Order> {
    ok(save_order(&s, id, Order::deliver).await?)
}

pub(super) async fn cancel_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Order> {
    ok(save_order(&s, id, Order::cancel).await?)
}

async fn save_order(s: &AppState, id: Uuid, action: impl FnOnce(&mut Order) -> Result<()>) -> Result<Order> {
    let mut order = s.repos.orders.get(id).await?;
    action(&mut order)?;
    let events = order.take_events();
    let order = s.repos.orders.update(order).await?;
    tracing::info!(order = %id, status = order.status.as_str(), "order status changed");
    s.events.publish_all(events).await;
    Ok(order)
}

pub(super) async fn pay(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Payment> {
    let mut payment = s.repos.payments.get(id).await?;
    let event = payment.mark_paid(Utc::now().date_naive())?;
    let payment = s.repos.payments.update(payment).await?;
    tracing::info!(payment = %id, amount = %payment.amount, "payment settled");
    s.events.publish(&event).await;
    ok(payment)
}

pub(super) async fn client_account(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<AccountSummary> {
    s.repos.clients.get(id).await?;
    let payments = s.repos.payments.list().await?;
    ok(AccountSummary::from_payments(id, &payments, Utc::now().date_naive()))
}
