//! Trade documents generated from line items

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{document_number, LineItem};
use crate::domain::totals::{compute_totals, DocumentTotals};
use crate::domain::value_objects::{Incoterm, Locale};
use crate::repository::Record;
use crate::{InovalogError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    ProformaInvoice,
    CommercialInvoice,
    PackingList,
    BillOfLading,
}

impl DocumentKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::ProformaInvoice => "PI",
            Self::CommercialInvoice => "CI",
            Self::PackingList => "PL",
            Self::BillOfLading => "BL",
        }
    }

    pub fn min_rows(&self) -> usize {
        match self {
            Self::CommercialInvoice | Self::PackingList => 1,
            Self::ProformaInvoice | Self::BillOfLading => 0,
        }
    }

    /// Packing lists and bills of lading describe cargo, not value.
    pub fn shows_prices(&self) -> bool {
        matches!(self, Self::ProformaInvoice | Self::CommercialInvoice)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub number: String,
    pub kind: DocumentKind,
    pub client_id: Option<Uuid>,
    pub exporter_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub incoterm: Incoterm,
    pub items: Vec<LineItem>,
    pub freight_amount: Decimal,
    pub locale: Locale,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Freezes the item list and the freight charge in effect at generation time.
    pub fn generate(kind: DocumentKind, incoterm: Incoterm, items: Vec<LineItem>, freight_amount: Decimal, locale: Locale) -> Result<Self> {
        if items.len() < kind.min_rows() {
            return Err(InovalogError::LastRow);
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(), number: document_number(kind.prefix()), kind, client_id: None, exporter_id: None,
            order_id: None, incoterm, items, freight_amount, locale, created_at: now, updated_at: now,
        })
    }

    pub fn totals(&self) -> DocumentTotals { compute_totals(&self.items, self.incoterm, self.freight_amount) }
}

impl Record for Document {
    const COLLECTION: &'static str = "documents";
    fn id(&self) -> Uuid { self.id }
    fn created_at(&self) -> DateTime<Utc> { self.created_at }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.number.as_str(), self.kind.prefix()];
        fields.extend(self.items.iter().map(|i| i.description.as_str()));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::totals::DEFAULT_FREIGHT_AMOUNT;

    #[test]
    fn test_packing_list_needs_a_row() {
        assert!(matches!(
            Document::generate(DocumentKind::PackingList, Incoterm::Fob, vec![], DEFAULT_FREIGHT_AMOUNT, Locale::En),
            Err(InovalogError::LastRow)
        ));
        let pi = Document::generate(DocumentKind::ProformaInvoice, Incoterm::Fob, vec![], DEFAULT_FREIGHT_AMOUNT, Locale::Pt).unwrap();
        assert!(pi.number.starts_with("PI-"));
        assert_eq!(pi.totals().grand_total, Decimal::ZERO);
    }
}
