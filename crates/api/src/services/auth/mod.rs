//! User registration and login.
//!
//! Passwords are hashed with Argon2id. Successful registration and login
//! both return a signed bearer token alongside the public user projection.

pub mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenService};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use paperback_core::types::{Email, Role, UserId};
use serde_json::Value;

use crate::models::UserRecord;
use crate::store::{DocumentStore, collections, find_one_as, insert_as};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` when hashing fails internally.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Authentication service over the document store.
pub struct AuthService<'a> {
    store: &'a dyn DocumentStore,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, tokens: &'a TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a new account and issue a token for it.
    ///
    /// Uniqueness is checked by email lookup before inserting; the flat-file
    /// layout has no unique index, so a racing duplicate registration is not
    /// ruled out, matching the original behavior.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidEmail` / `AuthError::WeakPassword` on bad input
    /// - `AuthError::UserAlreadyExists` when the email is taken
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        phone: Option<String>,
    ) -> Result<(UserRecord, String), AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let existing: Option<UserRecord> = find_one_as(
            self.store,
            collections::USERS,
            "email",
            &Value::String(email.to_string()),
        )
        .await?;
        if existing.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let now = Utc::now();
        let record = UserRecord {
            id: UserId::generate(),
            email,
            password_hash: hash_password(password)?,
            full_name: full_name.to_owned(),
            phone,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };

        let stored = insert_as(self.store, collections::USERS, &record).await?;
        let token = self.tokens.issue(&stored)?;
        Ok((stored, token))
    }

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for both an unknown email and
    /// a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<(UserRecord, String), AuthError> {
        let user: UserRecord = find_one_as(
            self.store,
            collections::USERS,
            "email",
            &Value::String(email.to_owned()),
        )
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        Ok((user, token))
    }
}
