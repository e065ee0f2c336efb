//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use paperback_api::store::{DocumentStore, JsonFileStore, PgStore};
use secrecy::SecretString;

/// Errors shared by the subcommands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidEnvVar(&'static str, String),

    #[error(transparent)]
    Store(#[from] paperback_api::store::StoreError),

    #[error("Auth error: {0}")]
    Auth(#[from] paperback_api::services::auth::AuthError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("{0}")]
    Validation(String),
}

/// Open the store backend the API is configured for.
///
/// Reads `PAPERBACK_STORE_BACKEND` (default `json`), `PAPERBACK_STORE_PATH`,
/// and `DATABASE_URL`, mirroring the server's configuration.
pub async fn store_from_env() -> Result<Box<dyn DocumentStore>, CommandError> {
    dotenvy::dotenv().ok();

    let backend = std::env::var("PAPERBACK_STORE_BACKEND").unwrap_or_else(|_| "json".to_owned());
    match backend.as_str() {
        "json" => {
            let path = std::env::var("PAPERBACK_STORE_PATH")
                .unwrap_or_else(|_| "data/api.json".to_owned());
            Ok(Box::new(JsonFileStore::open(path).await?))
        }
        "postgres" => {
            let url = std::env::var("DATABASE_URL")
                .map(SecretString::from)
                .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))?;
            Ok(Box::new(PgStore::connect(&url).await?))
        }
        other => Err(CommandError::InvalidEnvVar(
            "PAPERBACK_STORE_BACKEND",
            other.to_owned(),
        )),
    }
}
