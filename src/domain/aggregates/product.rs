//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Editable, LineItem};
use crate::domain::value_objects::{amount_in_range, Sku};
use crate::repository::Record;
use crate::{InovalogError, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub sku: Sku,
    pub name: String,
    pub description: String,
    pub tariff_code: String,
    pub unit_weight: Decimal,
    pub unit_price: Decimal,
    pub exporter_id: Option<Uuid>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus { #[default] Draft, Active, Archived }

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tariff_code: String,
    #[validate(custom = "amount_in_range")]
    pub unit_weight: Decimal,
    #[validate(custom = "amount_in_range")]
    pub unit_price: Decimal,
    pub exporter_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
}

impl Product {
    pub fn publish(&mut self) -> Result<()> {
        if self.name.is_empty() { return Err(InovalogError::Validation("product name missing".into())); }
        self.status = ProductStatus::Active;
        Ok(())
    }

    pub fn archive(&mut self) { self.status = ProductStatus::Archived; }

    /// Seeds an editor row with this product's catalog figures.
    pub fn to_line_item(&self, quantity: Decimal) -> LineItem {
        LineItem {
            description: self.name.clone(), tariff_code: self.tariff_code.clone(), quantity,
            unit_weight: self.unit_weight, unit_price: self.unit_price, product_id: Some(self.id),
        }
    }
}

impl Record for Product {
    const COLLECTION: &'static str = "products";
    fn id(&self) -> Uuid { self.id }
    fn created_at(&self) -> DateTime<Utc> { self.created_at }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
    fn search_fields(&self) -> Vec<&str> { vec![self.sku.as_str(), self.name.as_str(), self.tariff_code.as_str()] }
}

impl Editable for Product {
    type Input = ProductInput;

    fn from_input(input: ProductInput) -> Result<Self> {
        let now = Utc::now();
        let mut product = Self {
            id: Uuid::now_v7(), sku: Sku::new(input.sku)?, name: input.name, description: input.description,
            tariff_code: input.tariff_code, unit_weight: input.unit_weight, unit_price: input.unit_price,
            exporter_id: input.exporter_id, status: ProductStatus::Draft, created_at: now, updated_at: now,
        };
        match input.status {
            Some(ProductStatus::Active) => product.publish()?,
            Some(ProductStatus::Archived) => product.archive(),
            _ => {}
        }
        Ok(product)
    }

    fn apply_input(&mut self, input: ProductInput) -> Result<()> {
        self.sku = Sku::new(input.sku)?;
        self.name = input.name;
        self.description = input.description;
        self.tariff_code = input.tariff_code;
        self.unit_weight = input.unit_weight;
        self.unit_price = input.unit_price;
        self.exporter_id = input.exporter_id;
        match input.status {
            Some(ProductStatus::Active) => self.publish()?,
            Some(ProductStatus::Archived) => self.archive(),
            Some(ProductStatus::Draft) => self.status = ProductStatus::Draft,
            None => {}
        }
        Ok(())
    }
}
