//! Storage abstraction for portal records
//!
//! Every collection (clients, orders, quotes, ...) implements [`Record`] and is
//! stored behind a [`Repository`]. Handlers and services only see the trait, so
//! the backing store is picked once at startup.

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::aggregates::{Client, Document, Exporter, Order, Payment, Product, Quote};
use crate::Result;

pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, also used as the storage discriminator.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn touch(&mut self);
    /// Fields scanned by [`Repository::search`].
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty() || self.search_fields().iter().any(|field| field.to_lowercase().contains(&term))
    }
}

#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// All records in creation order.
    async fn list(&self) -> Result<Vec<T>>;

    async fn find(&self, id: Uuid) -> Result<Option<T>>;

    /// Case-insensitive substring search; a blank term lists everything.
    async fn search(&self, term: &str) -> Result<Vec<T>>;

    async fn create(&self, record: T) -> Result<T>;

    /// Replaces the stored record with the same id and bumps `updated_at`.
    async fn update(&self, record: T) -> Result<T>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<T> {
        self.find(id).await?.ok_or(crate::InovalogError::NotFound { collection: T::COLLECTION, id })
    }
}

pub type ClientRepository = dyn Repository<Client>;
pub type ExporterRepository = dyn Repository<Exporter>;
pub type ProductRepository = dyn Repository<Product>;
pub type QuoteRepository = dyn Repository<Quote>;
pub type OrderRepository = dyn Repository<Order>;
pub type PaymentRepository = dyn Repository<Payment>;
pub type DocumentRepository = dyn Repository<Document>;

/// One repository per collection.
#[derive(Clone)]
pub struct Repositories {
    pub clients: Arc<ClientRepository>,
    pub exporters: Arc<ExporterRepository>,
    pub products: Arc<ProductRepository>,
    pub quotes: Arc<QuoteRepository>,
    pub orders: Arc<OrderRepository>,
    pub payments: Arc<PaymentRepository>,
    pub documents: Arc<DocumentRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            clients: Arc::new(MemoryRepository::<Client>::default()),
            exporters: Arc::new(MemoryRepository::<Exporter>::default()),
            products: Arc::new(MemoryRepository::<Product>::default()),
            quotes: Arc::new(MemoryRepository::<Quote>::default()),
            orders: Arc::new(MemoryRepository::<Order>::default()),
            payments: Arc::new(MemoryRepository::<Payment>::default()),
            documents: Arc::new(MemoryRepository::<Document>::default()),
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            clients: Arc::new(PgRepository::<Client>::new(pool.clone())),
            exporters: Arc::new(PgRepository::<Exporter>::new(pool.clone())),
            products: Arc::new(PgRepository::<Product>::new(pool.clone())),
            quotes: Arc::new(PgRepository::<Quote>::new(pool.clone())),
            orders: Arc::new(PgRepository::<Order>::new(pool.clone())),
            payments: Arc::new(PgRepository::<Payment>::new(pool.clone())),
            documents: Arc::new(PgRepository::<Document>::new(pool)),
        }
    }
}
