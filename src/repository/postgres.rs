use async_trait::async_trait;
use sqlx::PgPool;
use std::marker::PhantomData;
use tracing::instrument;
use uuid::Uuid;

use super::{Record, Repository};
use crate::{InovalogError, Result};

/// Stores every collection as JSONB rows in the shared `records` table.
pub struct PgRepository<T> {
    pool: PgPool,
    _record: PhantomData<fn() -> T>,
}

impl<T> PgRepository<T> {
    pub fn new(pool: PgPool) -> Self { Self { pool, _record: PhantomData } }
}

fn decode<T: Record>(rows: Vec<(serde_json::Value,)>) -> Result<Vec<T>> {
    rows.into_iter().map(|(data,)| serde_json::from_value(data).map_err(InovalogError::from)).collect()
}

#[async_trait]
impl<T: Record> Repository<T> for PgRepository<T> {
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn list(&self) -> Result<Vec<T>> {
        let rows = sqlx::query_as::<_, (serde_json::Value,)>("SELECT data FROM records WHERE collection = $1 ORDER BY created_at, id")
            .bind(T::COLLECTION).fetch_all(&self.pool).await?;
        decode(rows)
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn find(&self, id: Uuid) -> Result<Option<T>> {
        let row = sqlx::query_as::<_, (serde_json::Value,)>("SELECT data FROM records WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION).bind(id).fetch_optional(&self.pool).await?;
        row.map(|(data,)| serde_json::from_value(data).map_err(InovalogError::from)).transpose()
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn search(&self, term: &str) -> Result<Vec<T>> {
        // the ILIKE prefilter over the whole document narrows rows; `matches` decides
        let pattern = like_pattern(term);
        let rows = sqlx::query_as::<_, (serde_json::Value,)>("SELECT data FROM records WHERE collection = $1 AND data::text ILIKE $2 ORDER BY created_at, id")
            .bind(T::COLLECTION).bind(pattern).fetch_all(&self.pool).await?;
        Ok(decode::<T>(rows)?.into_iter().filter(|r| r.matches(term)).collect())
    }

    #[instrument(skip(self, record), fields(collection = T::COLLECTION, id = %record.id()))]
    async fn create(&self, record: T) -> Result<T> {
        sqlx::query("INSERT INTO records (collection, id, data, created_at, updated_at) VALUES ($1, $2, $3, $4, NOW())")
            .bind(T::COLLECTION).bind(record.id()).bind(serde_json::to_value(&record)?).bind(record.created_at())
            .execute(&self.pool).await?;
        Ok(record)
    }

    #[instrument(skip(self, record), fields(collection = T::COLLECTION, id = %record.id()))]
    async fn update(&self, mut record: T) -> Result<T> {
        record.touch();
        let result = sqlx::query("UPDATE records SET data = $3, updated_at = NOW() WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION).bind(record.id()).bind(serde_json::to_value(&record)?)
            .execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(InovalogError::NotFound { collection: T::COLLECTION, id: record.id() });
        }
        Ok(record)
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM records WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(InovalogError::NotFound { collection: T::COLLECTION, id });
        }
        Ok(())
    }
}

/// Substring pattern for `ILIKE` with the backslash escape character and the
/// wildcards taken literally.
fn like_pattern(term: &str) -> String {
    let escaped = term.trim().replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}
