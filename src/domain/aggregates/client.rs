//! Client (importer) aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Editable;
use crate::repository::Record;
use crate::Result;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub zip: String,
    pub country: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub country: String,
    pub tax_id: Option<String>,
    pub address: Option<Address>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct ClientInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub company: Option<String>,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 2, max = 80))]
    pub country: String,
    pub tax_id: Option<String>,
    pub address: Option<Address>,
    pub active: Option<bool>,
}

impl Record for Client {
    const COLLECTION: &'static str = "clients";
    fn id(&self) -> Uuid { self.id }
    fn created_at(&self) -> DateTime<Utc> { self.created_at }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str(), self.country.as_str()];
        fields.extend(self.company.as_deref());
        fields.extend(self.tax_id.as_deref());
        fields
    }
}

impl Editable for Client {
    type Input = ClientInput;

    fn from_input(input: ClientInput) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(), name: input.name, company: input.company, email: input.email, phone: input.phone,
            country: input.country, tax_id: input.tax_id, address: input.address, active: input.active.unwrap_or(true),
            created_at: now, updated_at: now,
        })
    }

    fn apply_input(&mut self, input: ClientInput) -> Result<()> {
        self.name = input.name;
        self.company = input.company;
        self.email = input.email;
        self.phone = input.phone;
        self.country = input.country;
        self.tax_id = input.tax_id;
        self.address = input.address;
        if let Some(active) = input.active { self.active = active; }
        Ok(())
    }
}
