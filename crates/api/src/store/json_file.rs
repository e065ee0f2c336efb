//! Flat-file JSON store backend.
//!
//! Holds the entire database in memory as a map of collection name to
//! document list, mirroring the on-disk layout of the seed file:
//!
//! ```json
//! { "books": [...], "users": [...], "carts": [...], "orders": [...] }
//! ```
//!
//! Every mutation rewrites the whole file through a temp-file-then-rename
//! dance, so a crash mid-write never leaves a truncated database behind.
//! A single async mutex serializes mutations; the compare-and-set contract
//! of [`DocumentStore::put_if_unchanged`] holds trivially under it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{DocumentStore, StoreError};

type Database = HashMap<String, Vec<Value>>;

/// Single-file JSON document store.
pub struct JsonFileStore {
    path: PathBuf,
    db: Mutex<Database>,
}

impl JsonFileStore {
    /// Open (or create) the store backed by the given file.
    ///
    /// A missing file starts the store empty; it is created on first write.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or is not
    /// valid JSON of the expected shape.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let db = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Database::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            db: Mutex::new(db),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, db: &Database) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(db)?;
        // Write-then-rename keeps the previous file intact on failure.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn doc_id(document: &Value) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let db = self.db.lock().await;
        Ok(db.get(collection).cloned().unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let db = self.db.lock().await;
        Ok(db
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| doc_id(d) == Some(id)))
            .cloned())
    }

    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let db = self.db.lock().await;
        Ok(db
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| d.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, mut document: Value) -> Result<Value, StoreError> {
        if doc_id(&document).is_none_or(str::is_empty)
            && let Some(object) = document.as_object_mut()
        {
            object.insert(
                "id".to_owned(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }

        let mut db = self.db.lock().await;
        db.entry(collection.to_owned())
            .or_default()
            .push(document.clone());
        self.persist(&db).await?;
        Ok(document)
    }

    async fn put_if_unchanged(
        &self,
        collection: &str,
        id: &str,
        expected: &Value,
        updated: Value,
    ) -> Result<bool, StoreError> {
        let mut db = self.db.lock().await;
        let Some(docs) = db.get_mut(collection) else {
            return Ok(false);
        };
        let Some(slot) = docs.iter_mut().find(|d| doc_id(d) == Some(id)) else {
            return Ok(false);
        };
        if *slot != *expected {
            return Ok(false);
        }
        *slot = updated;
        self.persist(&db).await?;
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut db = self.db.lock().await;
        let Some(docs) = db.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| doc_id(d) != Some(id));
        if docs.len() == before {
            return Ok(false);
        }
        self.persist(&db).await?;
        Ok(true)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn temp_store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_insert_assigns_id_when_missing() {
        let (_dir, store) = temp_store().await;
        let stored = store.insert("books", json!({"name": "Dune"})).await.unwrap();
        let id = stored.get("id").and_then(Value::as_str).unwrap();
        assert!(!id.is_empty());
        assert_eq!(store.get("books", id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_insert_keeps_provided_id() {
        let (_dir, store) = temp_store().await;
        let stored = store
            .insert("books", json!({"id": "b1", "name": "Dune"}))
            .await
            .unwrap();
        assert_eq!(doc_id(&stored), Some("b1"));
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let (_dir, store) = temp_store().await;
        for name in ["a", "b", "c"] {
            store.insert("books", json!({"name": name})).await.unwrap();
        }
        let names: Vec<_> = store
            .list("books")
            .await
            .unwrap()
            .iter()
            .map(|d| d.get("name").and_then(Value::as_str).unwrap().to_owned())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_find_eq_matches_field() {
        let (_dir, store) = temp_store().await;
        store
            .insert("carts", json!({"id": "c1", "userId": "u1"}))
            .await
            .unwrap();
        store
            .insert("carts", json!({"id": "c2", "userId": "u2"}))
            .await
            .unwrap();

        let matches = store
            .find_eq("carts", "userId", &json!("u2"))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(doc_id(&matches[0]), Some("c2"));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_none() {
        let (_dir, store) = temp_store().await;
        store
            .insert("books", json!({"id": "b1", "name": "Dune"}))
            .await
            .unwrap();
        assert!(store.delete("books", "b1").await.unwrap());
        assert!(!store.delete("books", "b1").await.unwrap());
        assert_eq!(store.get("books", "b1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reopen_reads_persisted_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store
            .insert("books", json!({"id": "b1", "name": "Dune"}))
            .await
            .unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let book = reopened.get("books", "b1").await.unwrap().unwrap();
        assert_eq!(book.get("name"), Some(&json!("Dune")));
    }
}
