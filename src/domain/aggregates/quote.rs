//! Quote Aggregate

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{document_number, Editable, LineItem};
use crate::domain::events::{DomainEvent, QuoteEvent};
use crate::domain::totals::{compute_totals, DocumentTotals};
use crate::domain::value_objects::{amount_in_range, Incoterm};
use crate::repository::Record;
use crate::{InovalogError, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub exporter_id: Option<Uuid>,
    pub incoterm: Incoterm,
    pub items: Vec<LineItem>,
    /// Overrides the configured flat freight charge.
    pub freight_amount: Option<Decimal>,
    pub valid_until: Option<NaiveDate>,
    pub status: QuoteStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus { #[default] Draft, Sent, Approved, Rejected, Expired, Converted }

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct QuoteInput {
    pub client_id: Uuid,
    pub exporter_id: Option<Uuid>,
    #[serde(default)]
    pub incoterm: Incoterm,
    #[validate]
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[validate(custom = "amount_in_range")]
    pub freight_amount: Option<Decimal>,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Quote {
    pub fn totals(&self, default_freight: Decimal) -> DocumentTotals {
        compute_totals(&self.items, self.incoterm, self.freight_amount.unwrap_or(default_freight))
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.status == QuoteStatus::Expired || self.valid_until.is_some_and(|d| d < today)
    }

    pub fn send(&mut self) -> Result<()> {
        if self.status != QuoteStatus::Draft { return Err(self.invalid("send")); }
        self.status = QuoteStatus::Sent;
        Ok(())
    }

    /// Marks an open quote whose validity date has passed as expired.
    /// Returns whether the status changed.
    pub fn expire_if_due(&mut self, today: NaiveDate) -> bool {
        let due = self.is_open() && self.valid_until.is_some_and(|d| d < today);
        if due { self.status = QuoteStatus::Expired; }
        due
    }

    pub fn approve(&mut self, today: NaiveDate, default_freight: Decimal) -> Result<()> {
        if !self.is_open() { return Err(self.invalid("approve")); }
        if self.items.is_empty() { return Err(InovalogError::NoItems); }
        if self.is_expired(today) {
            return Err(InovalogError::InvalidTransition { action: "approve", state: "quote is past its validity date".into() });
        }
        self.status = QuoteStatus::Approved;
        let grand_total = self.totals(default_freight).grand_total;
        self.raise_event(DomainEvent::Quote(QuoteEvent::Approved { quote_id: self.id, grand_total }));
        Ok(())
    }

    pub fn reject(&mut self) -> Result<()> {
        if !self.is_open() { return Err(self.invalid("reject")); }
        self.status = QuoteStatus::Rejected;
        self.raise_event(DomainEvent::Quote(QuoteEvent::Rejected { quote_id: self.id }));
        Ok(())
    }

    /// Records that an order was created from this approved quote.
    pub(crate) fn mark_converted(&mut self, order_id: Uuid) -> Result<()> {
        if self.status != QuoteStatus::Approved { return Err(self.invalid("convert")); }
        self.status = QuoteStatus::Converted;
        self.raise_event(DomainEvent::Quote(QuoteEvent::Converted { quote_id: self.id, order_id }));
        Ok(())
    }

    /// Draft and sent quotes can still be edited, approved or rejected.
    pub fn is_open(&self) -> bool { matches!(self.status, QuoteStatus::Draft | QuoteStatus::Sent) }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }

    fn invalid(&self, action: &'static str) -> InovalogError {
        InovalogError::InvalidTransition { action, state: format!("quote is {:?}", self.status).to_lowercase() }
    }
}

impl Record for Quote {
    const COLLECTION: &'static str = "quotes";
    fn id(&self) -> Uuid { self.id }
    fn created_at(&self) -> DateTime<Utc> { self.created_at }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.number.as_str(), self.incoterm.as_str()];
        fields.extend(self.notes.as_deref());
        fields.extend(self.items.iter().map(|i| i.description.as_str()));
        fields
    }
}

impl Editable for Quote {
    type Input = QuoteInput;

    fn from_input(input: QuoteInput) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(), number: document_number("QT"), client_id: input.client_id, exporter_id: input.exporter_id,
            incoterm: input.incoterm, items: input.items, freight_amount: input.freight_amount, valid_until: input.valid_until,
            status: QuoteStatus::Draft, notes: input.notes, created_at: now, updated_at: now, events: vec![],
        })
    }

    fn apply_input(&mut self, input: QuoteInput) -> Result<()> {
        if !self.is_open() { return Err(self.invalid("edit")); }
        self.client_id = input.client_id;
        self.exporter_id = input.exporter_id;
        self.incoterm = input.incoterm;
        self.items = input.items;
        self.freight_amount = input.freight_amount;
        self.valid_until = input.valid_until;
        self.notes = input.notes;
        Ok(())
    }
}
