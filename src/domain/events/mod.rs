//! Domain events
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{DocumentKind, OrderStatus};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    Record(RecordEvent),
    Quote(QuoteEvent),
    Order(OrderEvent),
    Document(DocumentEvent),
    Payment(PaymentEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecordEvent {
    Created { collection: &'static str, id: Uuid },
    Updated { collection: &'static str, id: Uuid },
    Deleted { collection: &'static str, id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum QuoteEvent {
    Approved { quote_id: Uuid, grand_total: Decimal },
    Rejected { quote_id: Uuid },
    Converted { quote_id: Uuid, order_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OrderEvent {
    StatusChanged { order_id: Uuid, from: OrderStatus, to: OrderStatus, at: DateTime<Utc> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DocumentEvent {
    Generated { document_id: Uuid, kind: DocumentKind, number: String, grand_total: Decimal },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PaymentEvent {
    Settled { payment_id: Uuid, client_id: Uuid, amount: Decimal },
}

impl DomainEvent {
    /// NATS subject suffix, e.g. `orders.status_changed`.
    pub fn subject(&self) -> String {
        match self {
            Self::Record(RecordEvent::Created { collection, .. }) => format!("{}.created", collection),
            Self::Record(RecordEvent::Updated { collection, .. }) => format!("{}.updated", collection),
            Self::Record(RecordEvent::Deleted { collection, .. }) => format!("{}.deleted", collection),
            Self::Quote(QuoteEvent::Approved { .. }) => "quotes.approved".into(),
            Self::Quote(QuoteEvent::Rejected { .. }) => "quotes.rejected".into(),
            Self::Quote(QuoteEvent::Converted { .. }) => "quotes.converted".into(),
            Self::Order(OrderEvent::StatusChanged { .. }) => "orders.status_changed".into(),
            Self::Document(DocumentEvent::Generated { .. }) => "documents.generated".into(),
            Self::Payment(PaymentEvent::Settled { .. }) => "payments.settled".into(),
        }
    }
}
