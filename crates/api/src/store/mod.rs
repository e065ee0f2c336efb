//! Document store abstraction.
//!
//! The API persists every entity as a JSON document in one of four named
//! collections (`books`, `users`, `carts`, `orders`). Two backends implement
//! the same [`DocumentStore`] trait:
//!
//! - [`JsonFileStore`] - the whole database in one JSON file on disk
//! - [`PgStore`] - a `PostgreSQL` JSONB document table
//!
//! Every stored document carries its `id` (a UUID string) as a top-level
//! field.
//!
//! # Read-modify-write
//!
//! The trait deliberately has no plain `put` method. Updates go through
//! [`put_if_unchanged`](DocumentStore::put_if_unchanged) (compare-and-set on
//! the full document) and the [`apply_to_document`] helper, which runs a
//! bounded optimistic retry loop. Concurrent writers to the same document
//! therefore cannot silently lose each other's updates.

pub mod json_file;
pub mod postgres;

pub use json_file::JsonFileStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Collection names, matching the original flat-file layout.
pub mod collections {
    pub const BOOKS: &str = "books";
    pub const USERS: &str = "users";
    pub const CARTS: &str = "carts";
    pub const ORDERS: &str = "orders";
}

/// Maximum optimistic-retry attempts in [`apply_to_document`].
const MAX_CAS_ATTEMPTS: u32 = 5;

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error from the JSON backend.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error from the Postgres backend.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored document does not decode into the expected shape.
    #[error("data corruption in {collection}: {message}")]
    Corrupt { collection: String, message: String },

    /// The optimistic retry loop kept losing the compare-and-set race.
    #[error("document {collection}/{id} under contention, gave up after {attempts} attempts")]
    Contention {
        collection: String,
        id: String,
        attempts: u32,
    },
}

/// A keyed JSON document collection set.
///
/// All methods address documents by collection name and the `id` field.
/// Implementations must be safe to share across request handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List every document in a collection, in insertion order.
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Fetch one document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Find documents whose top-level `field` equals `value`, in insertion order.
    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert a new document, returning it as stored.
    ///
    /// If the document has no non-empty string `id` field, a fresh UUID is
    /// assigned and injected.
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, StoreError>;

    /// Replace a document only if its current contents equal `expected`.
    ///
    /// Returns `false` when the document is missing or has changed since
    /// `expected` was read (the compare-and-set lost).
    async fn put_if_unchanged(
        &self,
        collection: &str,
        id: &str,
        expected: &Value,
        updated: Value,
    ) -> Result<bool, StoreError>;

    /// Delete a document by id. Returns `false` if it did not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

// =============================================================================
// Typed helpers
// =============================================================================

fn decode<T: DeserializeOwned>(collection: &str, value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
        collection: collection.to_owned(),
        message: e.to_string(),
    })
}

/// Fetch and decode one document.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` if the stored document does not match `T`.
pub async fn get_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(collection, id).await? {
        Some(value) => Ok(Some(decode(collection, value)?)),
        None => Ok(None),
    }
}

/// List and decode every document in a collection.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` if any stored document does not match `T`.
pub async fn list_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<T>, StoreError> {
    store
        .list(collection)
        .await?
        .into_iter()
        .map(|value| decode(collection, value))
        .collect()
}

/// Find and decode every document whose `field` equals `value`.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` if any stored document does not match `T`.
pub async fn find_eq_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    field: &str,
    value: &Value,
) -> Result<Vec<T>, StoreError> {
    store
        .find_eq(collection, field, value)
        .await?
        .into_iter()
        .map(|v| decode(collection, v))
        .collect()
}

/// Find and decode the first document whose `field` equals `value`.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` if the stored document does not match `T`.
pub async fn find_one_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    field: &str,
    value: &Value,
) -> Result<Option<T>, StoreError> {
    let mut matches = store.find_eq(collection, field, value).await?;
    if matches.is_empty() {
        return Ok(None);
    }
    Ok(Some(decode(collection, matches.swap_remove(0))?))
}

/// Insert a typed document, returning it as stored.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if the document cannot be encoded,
/// `StoreError::Corrupt` if the stored form does not decode back into `T`.
pub async fn insert_as<T: Serialize + DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    document: &T,
) -> Result<T, StoreError> {
    let value = serde_json::to_value(document)?;
    let stored = store.insert(collection, value).await?;
    decode(collection, stored)
}

/// Error from [`apply_to_document`]: either the store failed, or the mutator
/// rejected the current document state.
#[derive(Debug)]
pub enum ApplyError<E> {
    /// The underlying store operation failed.
    Store(StoreError),
    /// The mutator returned an error; the document was not modified.
    Rejected(E),
}

impl<E> From<StoreError> for ApplyError<E> {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Atomically apply a mutation to one document.
///
/// Reads the document, decodes it into `T`, runs `mutate`, and writes the
/// result back with a compare-and-set against the originally-read contents.
/// Lost races are retried (re-reading the fresh document) up to a bounded
/// number of attempts.
///
/// Returns `Ok(None)` when the document does not exist.
///
/// # Errors
///
/// - `ApplyError::Rejected` when `mutate` returns an error
/// - `ApplyError::Store(StoreError::Contention)` when every attempt lost the race
pub async fn apply_to_document<T, E, F>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    mut mutate: F,
) -> Result<Option<T>, ApplyError<E>>
where
    T: Serialize + DeserializeOwned,
    F: FnMut(&mut T) -> Result<(), E>,
{
    for _ in 0..MAX_CAS_ATTEMPTS {
        let Some(current) = store.get(collection, id).await? else {
            return Ok(None);
        };

        let mut document: T = decode(collection, current.clone())?;
        mutate(&mut document).map_err(ApplyError::Rejected)?;

        let updated = serde_json::to_value(&document).map_err(StoreError::from)?;
        if store
            .put_if_unchanged(collection, id, &current, updated)
            .await?
        {
            return Ok(Some(document));
        }
    }

    Err(ApplyError::Store(StoreError::Contention {
        collection: collection.to_owned(),
        id: id.to_owned(),
        attempts: MAX_CAS_ATTEMPTS,
    }))
}
