//! Postgres schema creation.
//!
//! The document table is not created automatically on server startup; run
//! this once against a fresh database.

use paperback_api::store::PgStore;
use secrecy::SecretString;

use super::CommandError;

/// Create the `document` table.
pub async fn run() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let store = PgStore::connect(&url).await?;

    tracing::info!("Creating document table...");
    store.ensure_schema().await?;

    tracing::info!("Migration complete");
    Ok(())
}
