//! InovaLog Export Portal
//!
//! Backend for an export/logistics portal shared by an administrator console
//! and a client portal.
//!
//! ## Features
//! - Freight-aware totals for proforma/commercial invoices, packing lists and bills of lading
//! - Quotes with approval and conversion into orders
//! - Order workflow from confirmation to delivery
//! - Client payments and account summaries
//! - Exporter and product catalog
//! - Localized document views (English, Portuguese)

pub mod api;
pub mod config;
pub mod domain;
pub mod publisher;
pub mod render;
pub mod repository;
pub mod seed;

use thiserror::Error;

pub use domain::totals::{compute_totals, DocumentTotals, LineTotals, DEFAULT_FREIGHT_AMOUNT};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum InovalogError {
    #[error("{collection} {id} not found")]
    NotFound { collection: &'static str, id: uuid::Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("At least one row is required")]
    LastRow,

    #[error("Row {0} not found")]
    RowNotFound(usize),

    #[error("No items")]
    NoItems,

    #[error("Cannot {action} when {state}")]
    InvalidTransition { action: &'static str, state: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for InovalogError {
    fn from(err: sqlx::Error) -> Self { Self::Storage(err.to_string()) }
}

impl From<serde_json::Error> for InovalogError {
    fn from(err: serde_json::Error) -> Self { Self::Storage(err.to_string()) }
}

impl From<validator::ValidationErrors> for InovalogError {
    fn from(err: validator::ValidationErrors) -> Self { Self::Validation(err.to_string()) }
}

pub type Result<T> = std::result::Result<T, InovalogError>;
