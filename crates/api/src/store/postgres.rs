//! `PostgreSQL` store backend.
//!
//! All collections share a single `document` table keyed by
//! `(collection, id)` with the document body in a JSONB column. A
//! `BIGSERIAL` sequence column preserves insertion order for listing.
//!
//! Compare-and-set is expressed directly in SQL: the `UPDATE` matches the
//! full expected JSONB body, so a concurrent writer makes the row count
//! come back zero and the caller retries against fresh state.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{DocumentStore, StoreError};

/// `PostgreSQL` JSONB document store.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database.
    ///
    /// # Errors
    ///
    /// Returns an error when the pool cannot be established.
    pub async fn connect(database_url: &SecretString) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `document` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the DDL statement fails.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS document (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data JSONB NOT NULL,
                seq BIGSERIAL,
                PRIMARY KEY (collection, id)
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query("SELECT data FROM document WHERE collection = $1 ORDER BY seq")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| row.try_get("data").map_err(StoreError::from))
            .collect()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT data FROM document WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get("data").map_err(StoreError::from))
            .transpose()
    }

    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query(
            "SELECT data FROM document
             WHERE collection = $1 AND data->($2::text) = $3
             ORDER BY seq",
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| row.try_get("data").map_err(StoreError::from))
            .collect()
    }

    async fn insert(&self, collection: &str, mut document: Value) -> Result<Value, StoreError> {
        let id = match document.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                if let Some(object) = document.as_object_mut() {
                    object.insert("id".to_owned(), Value::String(id.clone()));
                }
                id
            }
        };

        sqlx::query("INSERT INTO document (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(&document)
            .execute(&self.pool)
            .await?;
        Ok(document)
    }

    async fn put_if_unchanged(
        &self,
        collection: &str,
        id: &str,
        expected: &Value,
        updated: Value,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE document SET data = $4
             WHERE collection = $1 AND id = $2 AND data = $3",
        )
        .bind(collection)
        .bind(id)
        .bind(expected)
        .bind(&updated)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM document WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
