//! Exporter aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Address, Editable};
use crate::repository::Record;
use crate::Result;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exporter {
    pub id: Uuid,
    pub legal_name: String,
    /// CNPJ for Brazilian exporters.
    pub tax_id: String,
    pub country: String,
    pub address: Option<Address>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct ExporterInput {
    #[validate(length(min = 1, max = 200))]
    pub legal_name: String,
    #[validate(length(min = 1, max = 40))]
    pub tax_id: String,
    #[validate(length(min = 2, max = 80))]
    pub country: String,
    pub address: Option<Address>,
    #[validate(email)]
    pub contact_email: Option<String>,
}

impl Record for Exporter {
    const COLLECTION: &'static str = "exporters";
    fn id(&self) -> Uuid { self.id }
    fn created_at(&self) -> DateTime<Utc> { self.created_at }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
    fn search_fields(&self) -> Vec<&str> { vec![self.legal_name.as_str(), self.tax_id.as_str(), self.country.as_str()] }
}

impl Editable for Exporter {
    type Input = ExporterInput;

    fn from_input(input: ExporterInput) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(), legal_name: input.legal_name, tax_id: input.tax_id, country: input.country,
            address: input.address, contact_email: input.contact_email, created_at: now, updated_at: now,
        })
    }

    fn apply_input(&mut self, input: ExporterInput) -> Result<()> {
        self.legal_name = input.legal_name;
        self.tax_id = input.tax_id;
        self.country = input.country;
        self.address = input.address;
        self.contact_email = input.contact_email;
        Ok(())
    }
}
