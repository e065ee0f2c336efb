//! Admin account creation.

use chrono::Utc;
use paperback_api::models::UserRecord;
use paperback_api::services::auth::{MIN_PASSWORD_LENGTH, hash_password};
use paperback_api::store::{collections, find_one_as, insert_as};
use paperback_core::types::{Email, Role, UserId};
use serde_json::Value;

use super::{CommandError, store_from_env};

/// Create a new admin account in the configured store.
pub async fn create_account(email: &str, password: &str, name: &str) -> Result<(), CommandError> {
    let email = Email::parse(email)
        .map_err(|e| CommandError::Validation(format!("invalid email: {e}")))?;
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(CommandError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let store = store_from_env().await?;

    let existing: Option<UserRecord> = find_one_as(
        store.as_ref(),
        collections::USERS,
        "email",
        &Value::String(email.to_string()),
    )
    .await?;
    if existing.is_some() {
        return Err(CommandError::Validation(format!(
            "an account with email {email} already exists"
        )));
    }

    let now = Utc::now();
    let record = UserRecord {
        id: UserId::generate(),
        email,
        password_hash: hash_password(password)?,
        full_name: name.to_owned(),
        phone: None,
        role: Role::Admin,
        created_at: now,
        updated_at: now,
    };
    let stored = insert_as(store.as_ref(), collections::USERS, &record).await?;

    tracing::info!(user_id = %stored.id, email = %stored.email, "admin account created");
    Ok(())
}
