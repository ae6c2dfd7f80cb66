use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Record, Repository};
use crate::{InovalogError, Result};

/// Process-local store, used for development, demos and tests.
pub struct MemoryRepository<T> {
    records: RwLock<Vec<T>>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self { Self { records: RwLock::new(Vec::new()) } }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn list(&self) -> Result<Vec<T>> {
        Ok(self.records.read().await.clone())
    }

    async fn find(&self, id: Uuid) -> Result<Option<T>> {
        Ok(self.records.read().await.iter().find(|r| r.id() == id).cloned())
    }

    async fn search(&self, term: &str) -> Result<Vec<T>> {
        Ok(self.records.read().await.iter().filter(|r| r.matches(term)).cloned().collect())
    }

    async fn create(&self, record: T) -> Result<T> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(InovalogError::Storage(format!("duplicate {} id {}", T::COLLECTION, record.id())));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, mut record: T) -> Result<T> {
        let mut records = self.records.write().await;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or(InovalogError::NotFound { collection: T::COLLECTION, id: record.id() })?;
        record.touch();
        *slot = record.clone();
        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(InovalogError::NotFound { collection: T::COLLECTION, id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Client, ClientInput, Editable};

    fn client(name: &str, email: &str) -> Client {
        Client::from_input(ClientInput { name: name.into(), email: email.into(), country: "BR".into(), ..Default::default() }).unwrap()
    }

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let repo = MemoryRepository::<Client>::default();
        let a = repo.create(client("Acme Imports", "buy@acme.test")).await.unwrap();
        let b = repo.create(client("Lisbon Foods", "ops@lisbon.test")).await.unwrap();
        assert_eq!(repo.list().await.unwrap().iter().map(|c| c.id).collect::<Vec<_>>(), vec![a.id, b.id]);

        let mut renamed = a.clone();
        renamed.name = "Acme Global".into();
        let saved = repo.update(renamed).await.unwrap();
        assert!(saved.updated_at >= a.updated_at);
        assert_eq!(repo.get(a.id).await.unwrap().name, "Acme Global");

        repo.delete(b.id).await.unwrap();
        assert!(repo.find(b.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(b.id).await, Err(InovalogError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let repo = MemoryRepository::<Client>::default();
        repo.create(client("Acme Imports", "buy@acme.test")).await.unwrap();
        repo.create(client("Lisbon Foods", "ops@lisbon.test")).await.unwrap();
        assert_eq!(repo.search("LISBON").await.unwrap().len(), 1);
        assert_eq!(repo.search("").await.unwrap().len(), 2);
        assert!(repo.search("tokyo").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let repo = MemoryRepository::<Client>::default();
        assert!(matches!(repo.update(client("Ghost", "g@h.test")).await, Err(InovalogError::NotFound { .. })));
    }
}
