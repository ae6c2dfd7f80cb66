//! Payments and client account balances

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Editable;
use crate::domain::events::{DomainEvent, PaymentEvent};
use crate::domain::value_objects::amount_in_range;
use crate::repository::Record;
use crate::{InovalogError, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub order_id: Option<Uuid>,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid_on: Option<NaiveDate>,
    pub method: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus { #[default] Pending, Paid, Cancelled }

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct PaymentInput {
    pub client_id: Uuid,
    pub order_id: Option<Uuid>,
    #[validate(length(min = 1, max = 300))]
    pub description: String,
    #[validate(custom = "amount_in_range")]
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub method: Option<String>,
    pub cancelled: Option<bool>,
}

impl Payment {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == PaymentStatus::Pending && self.due_date < today
    }

    pub fn mark_paid(&mut self, on: NaiveDate) -> Result<DomainEvent> {
        if self.status != PaymentStatus::Pending {
            return Err(InovalogError::InvalidTransition { action: "settle", state: format!("payment is {:?}", self.status).to_lowercase() });
        }
        self.status = PaymentStatus::Paid;
        self.paid_on = Some(on);
        Ok(DomainEvent::Payment(PaymentEvent::Settled { payment_id: self.id, client_id: self.client_id, amount: self.amount }))
    }
}

impl Record for Payment {
    const COLLECTION: &'static str = "payments";
    fn id(&self) -> Uuid { self.id }
    fn created_at(&self) -> DateTime<Utc> { self.created_at }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.description.as_str()];
        fields.extend(self.method.as_deref());
        fields
    }
}

impl Editable for Payment {
    type Input = PaymentInput;

    fn from_input(input: PaymentInput) -> Result<Self> {
        let now = Utc::now();
        let status = if input.cancelled == Some(true) { PaymentStatus::Cancelled } else { PaymentStatus::Pending };
        Ok(Self {
            id: Uuid::now_v7(), client_id: input.client_id, order_id: input.order_id, description: input.description,
            amount: input.amount, due_date: input.due_date, paid_on: None, method: input.method, status,
            created_at: now, updated_at: now,
        })
    }

    fn apply_input(&mut self, input: PaymentInput) -> Result<()> {
        if self.status == PaymentStatus::Paid {
            return Err(InovalogError::InvalidTransition { action: "edit", state: "payment is paid".into() });
        }
        self.client_id = input.client_id;
        self.order_id = input.order_id;
        self.description = input.description;
        self.amount = input.amount;
        self.due_date = input.due_date;
        self.method = input.method;
        if let Some(cancelled) = input.cancelled {
            self.status = if cancelled { PaymentStatus::Cancelled } else { PaymentStatus::Pending };
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub client_id: Uuid,
    pub billed: Decimal,
    pub paid: Decimal,
    pub outstanding: Decimal,
    pub overdue: Decimal,
    pub overdue_count: usize,
}

impl AccountSummary {
    /// Cancelled payments are ignored; payments of other clients are skipped.
    pub fn from_payments(client_id: Uuid, payments: &[Payment], today: NaiveDate) -> Self {
        payments
            .iter()
            .filter(|p| p.client_id == client_id && p.status != PaymentStatus::Cancelled)
            .fold(Self { client_id, ..Default::default() }, |mut acc, p| {
                acc.billed += p.amount;
                if p.status == PaymentStatus::Paid { acc.paid += p.amount; }
                if p.is_overdue(today) {
                    acc.overdue += p.amount;
                    acc.overdue_count += 1;
                }
                acc.outstanding = acc.billed - acc.paid;
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(client_id: Uuid, amount: i64, due: (i32, u32, u32)) -> Payment {
        Payment::from_input(PaymentInput {
            client_id, order_id: None, description: "Deposit".into(), amount: Decimal::from(amount),
            due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(), method: Some("wire".into()), cancelled: None,
        }).unwrap()
    }

    #[test]
    fn test_account_summary() {
        let client = Uuid::now_v7();
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let mut paid = payment(client, 1000, (2025, 5, 1));
        paid.mark_paid(today).unwrap();
        let overdue = payment(client, 400, (2025, 6, 1));
        let upcoming = payment(client, 250, (2025, 7, 1));
        let mut cancelled = payment(client, 9999, (2025, 1, 1));
        cancelled.status = PaymentStatus::Cancelled;
        let other = payment(Uuid::now_v7(), 77, (2025, 1, 1));

        let summary = AccountSummary::from_payments(client, &[paid, overdue, upcoming, cancelled, other], today);
        assert_eq!(summary.billed, Decimal::from(1650));
        assert_eq!(summary.paid, Decimal::from(1000));
        assert_eq!(summary.outstanding, Decimal::from(650));
        assert_eq!(summary.overdue, Decimal::from(400));
        assert_eq!(summary.overdue_count, 1);
    }

    #[test]
    fn test_cannot_settle_twice() {
        let mut p = payment(Uuid::now_v7(), 10, (2025, 1, 1));
        let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert!(p.is_overdue(today));
        p.mark_paid(today).unwrap();
        assert!(!p.is_overdue(today));
        assert!(p.mark_paid(today).is_err());
    }
}
