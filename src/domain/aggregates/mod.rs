//! Aggregates module
pub mod client;
pub mod document;
pub mod exporter;
pub mod line_items;
pub mod order;
pub mod payment;
pub mod product;
pub mod quote;

pub use client::{Address, Client, ClientInput};
pub use document::{Document, DocumentKind};
pub use exporter::{Exporter, ExporterInput};
pub use line_items::{ItemList, LineItem, LineItemPatch};
pub use order::{Order, OrderInput, OrderStatus};
pub use payment::{AccountSummary, Payment, PaymentInput, PaymentStatus};
pub use product::{Product, ProductInput, ProductStatus};
pub use quote::{Quote, QuoteInput, QuoteStatus};

use serde::de::DeserializeOwned;
use validator::Validate;

use crate::repository::Record;
use crate::Result;

/// A record that can be created and edited through a validated request body.
pub trait Editable: Record {
    type Input: DeserializeOwned + Validate + Send + 'static;

    fn from_input(input: Self::Input) -> Result<Self>;
    fn apply_input(&mut self, input: Self::Input) -> Result<()>;
}

pub(crate) fn document_number(prefix: &str) -> String {
    format!("{}-{:08}", prefix, rand::random::<u32>() % 100_000_000)
}
