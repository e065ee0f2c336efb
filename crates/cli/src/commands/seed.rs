//! Fixture loading.
//!
//! Reads a JSON file shaped like the flat-file database and inserts every
//! document into the configured backend. Documents keep their fixture ids,
//! so seeding is only meant for empty stores.

use serde_json::Value;

use super::{CommandError, store_from_env};

/// Load every collection in the fixture into the configured store.
pub async fn run(file: &str) -> Result<(), CommandError> {
    let bytes = tokio::fs::read(file).await?;
    let fixture: Value = serde_json::from_slice(&bytes)
        .map_err(|e| CommandError::Fixture(format!("{file} is not valid JSON: {e}")))?;
    let Value::Object(collections) = fixture else {
        return Err(CommandError::Fixture(format!(
            "{file} must be a JSON object of collections"
        )));
    };

    let store = store_from_env().await?;

    for (collection, documents) in collections {
        let Value::Array(documents) = documents else {
            return Err(CommandError::Fixture(format!(
                "collection {collection} must be an array"
            )));
        };

        let count = documents.len();
        for document in documents {
            store.insert(&collection, document).await?;
        }
        tracing::info!(collection = %collection, count, "seeded collection");
    }

    tracing::info!("Seeding complete");
    Ok(())
}
