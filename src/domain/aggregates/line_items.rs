//! Line items and the editable item list behind documents and quotes

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::DocumentKind;
use crate::domain::totals::{compute_totals, DocumentTotals};
use crate::domain::value_objects::{amount_in_range, Incoterm};
use crate::{InovalogError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LineItem {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    /// NCM / HS code, kept as typed.
    #[serde(default)]
    pub tariff_code: String,
    #[validate(custom = "amount_in_range")]
    pub quantity: Decimal,
    #[validate(custom = "amount_in_range")]
    pub unit_weight: Decimal,
    #[validate(custom = "amount_in_range")]
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
}

impl LineItem {
    pub fn new(description: impl Into<String>, tariff_code: impl Into<String>, quantity: Decimal, unit_weight: Decimal, unit_price: Decimal) -> Self {
        Self { description: description.into(), tariff_code: tariff_code.into(), quantity, unit_weight, unit_price, product_id: None }
    }

    pub fn line_total(&self) -> Decimal { self.unit_price.saturating_mul(self.quantity) }
    pub fn line_weight(&self) -> Decimal { self.unit_weight.saturating_mul(self.quantity) }
}

/// Partial edit of one row; absent fields keep their value.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct LineItemPatch {
    pub description: Option<String>,
    pub tariff_code: Option<String>,
    #[validate(custom = "amount_in_range")]
    pub quantity: Option<Decimal>,
    #[validate(custom = "amount_in_range")]
    pub unit_weight: Option<Decimal>,
    #[validate(custom = "amount_in_range")]
    pub unit_price: Option<Decimal>,
}

#[derive(Clone, Debug, Default)]
pub struct ItemList {
    rows: Vec<LineItem>,
    min_rows: usize,
}

impl ItemList {
    pub fn new(min_rows: usize) -> Self { Self { rows: vec![], min_rows } }

    /// Commercial invoices and packing lists always keep at least one row.
    pub fn for_kind(kind: DocumentKind) -> Self { Self::new(kind.min_rows()) }

    pub fn with_rows(mut self, rows: Vec<LineItem>) -> Self { self.rows = rows; self }

    pub fn rows(&self) -> &[LineItem] { &self.rows }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn into_rows(self) -> Vec<LineItem> { self.rows }

    pub fn add_row(&mut self, item: LineItem) -> usize {
        self.rows.push(item);
        self.rows.len() - 1
    }

    pub fn update_row(&mut self, index: usize, patch: LineItemPatch) -> Result<&LineItem> {
        let row = self.rows.get_mut(index).ok_or(InovalogError::RowNotFound(index))?;
        if let Some(description) = patch.description { row.description = description; }
        if let Some(tariff_code) = patch.tariff_code { row.tariff_code = tariff_code; }
        if let Some(quantity) = patch.quantity { row.quantity = quantity; }
        if let Some(unit_weight) = patch.unit_weight { row.unit_weight = unit_weight; }
        if let Some(unit_price) = patch.unit_price { row.unit_price = unit_price; }
        Ok(row)
    }

    pub fn remove_row(&mut self, index: usize) -> Result<LineItem> {
        if index >= self.rows.len() { return Err(InovalogError::RowNotFound(index)); }
        if self.rows.len() <= self.min_rows { return Err(InovalogError::LastRow); }
        Ok(self.rows.remove(index))
    }

    pub fn totals(&self, incoterm: Incoterm, freight_amount: Decimal) -> DocumentTotals {
        compute_totals(&self.rows, incoterm, freight_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::totals::DEFAULT_FREIGHT_AMOUNT;

    fn coffee(qty: i64) -> LineItem {
        LineItem::new("Green coffee", "0901.11.10", Decimal::from(qty), Decimal::new(60, 0), Decimal::new(180, 0))
    }

    #[test]
    fn test_editor_recomputes_after_edits() {
        let mut list = ItemList::for_kind(DocumentKind::ProformaInvoice);
        list.add_row(coffee(10));
        list.add_row(coffee(5));
        assert_eq!(list.totals(Incoterm::Fob, DEFAULT_FREIGHT_AMOUNT).merchandise_value, Decimal::new(2700, 0));
        list.update_row(1, LineItemPatch { quantity: Some(Decimal::ZERO), ..Default::default() }).unwrap();
        let totals = list.totals(Incoterm::Fob, DEFAULT_FREIGHT_AMOUNT);
        assert_eq!(totals.merchandise_value, Decimal::new(1800, 0));
        assert_eq!(totals.total_weight, Decimal::new(600, 0));
    }

    #[test]
    fn test_commercial_invoice_keeps_last_row() {
        let mut list = ItemList::for_kind(DocumentKind::CommercialInvoice);
        list.add_row(coffee(1));
        list.add_row(coffee(2));
        assert_eq!(list.remove_row(0).unwrap().quantity, Decimal::ONE);
        assert!(matches!(list.remove_row(0), Err(InovalogError::LastRow)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_proforma_can_be_emptied() {
        let mut list = ItemList::for_kind(DocumentKind::ProformaInvoice);
        list.add_row(coffee(1));
        list.remove_row(0).unwrap();
        assert!(list.is_empty());
        assert!(matches!(list.remove_row(0), Err(InovalogError::RowNotFound(0))));
    }

    #[test]
    fn test_negative_quantity_fails_validation() {
        let mut item = coffee(1);
        item.quantity = Decimal::new(-1, 0);
        assert!(item.validate().is_err());
        assert!(coffee(3).validate().is_ok());
        item.quantity = Decimal::MAX;
        assert!(item.validate().is_err());
    }
}
