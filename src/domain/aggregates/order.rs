//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{document_number, Editable, LineItem, Quote, QuoteStatus};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::totals::{compute_totals, DocumentTotals};
use crate::domain::value_objects::{amount_in_range, Incoterm};
use crate::repository::Record;
use crate::{InovalogError, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub exporter_id: Option<Uuid>,
    pub quote_id: Option<Uuid>,
    pub incoterm: Incoterm,
    pub items: Vec<LineItem>,
    pub freight_amount: Option<Decimal>,
    pub status: OrderStatus,
    pub tracking: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus { #[default] Pending, Confirmed, InProduction, Shipped, Delivered, Cancelled }

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProduction => "in_production",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct OrderInput {
    pub client_id: Uuid,
    pub exporter_id: Option<Uuid>,
    #[serde(default)]
    pub incoterm: Incoterm,
    #[validate]
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[validate(custom = "amount_in_range")]
    pub freight_amount: Option<Decimal>,
    pub notes: Option<String>,
}

impl Order {
    /// Turns an approved quote into a pending order carrying the same items and
    /// terms. The quote moves to converted and cannot be converted again.
    pub fn from_quote(quote: &mut Quote) -> Result<Self> {
        if quote.status != QuoteStatus::Approved {
            return Err(InovalogError::InvalidTransition { action: "convert", state: format!("quote is {:?}", quote.status).to_lowercase() });
        }
        let mut order = Self::from_input(OrderInput {
            client_id: quote.client_id, exporter_id: quote.exporter_id, incoterm: quote.incoterm,
            items: quote.items.clone(), freight_amount: quote.freight_amount, notes: quote.notes.clone(),
        })?;
        order.quote_id = Some(quote.id);
        quote.mark_converted(order.id)?;
        Ok(order)
    }

    pub fn totals(&self, default_freight: Decimal) -> DocumentTotals {
        compute_totals(&self.items, self.incoterm, self.freight_amount.unwrap_or(default_freight))
    }

    pub fn confirm(&mut self) -> Result<()> {
        if self.items.is_empty() { return Err(InovalogError::NoItems); }
        self.transition("confirm", &[OrderStatus::Pending], OrderStatus::Confirmed)
    }

    pub fn start_production(&mut self) -> Result<()> {
        self.transition("start production", &[OrderStatus::Confirmed], OrderStatus::InProduction)
    }

    pub fn ship(&mut self, tracking: Option<String>) -> Result<()> {
        self.transition("ship", &[OrderStatus::Confirmed, OrderStatus::InProduction], OrderStatus::Shipped)?;
        if tracking.is_some() { self.tracking = tracking; }
        Ok(())
    }

    pub fn deliver(&mut self) -> Result<()> {
        self.transition("deliver", &[OrderStatus::Shipped], OrderStatus::Delivered)
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.transition(
            "cancel",
            &[OrderStatus::Pending, OrderStatus::Confirmed, OrderStatus::InProduction, OrderStatus::Shipped],
            OrderStatus::Cancelled,
        )
    }

    fn transition(&mut self, action: &'static str, allowed: &[OrderStatus], to: OrderStatus) -> Result<()> {
        if !allowed.contains(&self.status) {
            return Err(InovalogError::InvalidTransition { action, state: format!("order is {}", self.status.as_str()) });
        }
        let from = std::mem::replace(&mut self.status, to);
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id, from, to, at: Utc::now() }));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

impl Record for Order {
    const COLLECTION: &'static str = "orders";
    fn id(&self) -> Uuid { self.id }
    fn created_at(&self) -> DateTime<Utc> { self.created_at }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.number.as_str(), self.status.as_str(), self.incoterm.as_str()];
        fields.extend(self.tracking.as_deref());
        fields.extend(self.notes.as_deref());
        fields
    }
}

impl Editable for Order {
    type Input = OrderInput;

    fn from_input(input: OrderInput) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(), number: document_number("ORD"), client_id: input.client_id, exporter_id: input.exporter_id,
            quote_id: None, incoterm: input.incoterm, items: input.items, freight_amount: input.freight_amount,
            status: OrderStatus::Pending, tracking: None, notes: input.notes, created_at: now, updated_at: now, events: vec![],
        })
    }

    /// Items and terms are only editable while the order is pending.
    fn apply_input(&mut self, input: OrderInput) -> Result<()> {
        if self.status != OrderStatus::Pending {
            return Err(InovalogError::InvalidTransition { action: "edit", state: format!("order is {}", self.status.as_str()) });
        }
        self.client_id = input.client_id;
        self.exporter_id = input.exporter_id;
        self.incoterm = input.incoterm;
        self.items = input.items;
        self.freight_amount = input.freight_amount;
        self.notes = input.notes;
        Ok(())
    }
}
