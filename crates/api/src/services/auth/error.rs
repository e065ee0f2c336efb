//! Authentication error types.

use paperback_core::types::EmailError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email address failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    UserAlreadyExists,

    /// The password failed strength validation.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// The bearer token is missing, malformed, expired, or forged.
    #[error("invalid or expired token")]
    InvalidToken,

    /// A token could not be signed.
    #[error("token issuance failed: {0}")]
    TokenIssuance(#[from] jsonwebtoken::errors::Error),

    /// The document store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Password hashing or verification failed internally.
    #[error("password hashing failed")]
    PasswordHash,
}
