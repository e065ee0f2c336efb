//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with the configured secret. Claims carry the
//! user id, email, and role; request handlers trust the verified claims
//! without a store round-trip.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use paperback_core::types::Role;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::models::UserRecord;

/// Claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: u64,
    /// Expiry, seconds since the epoch.
    pub exp: u64,
}

/// Signs and verifies bearer tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenService {
    /// Build a token service from the signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_secs: u64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs,
        }
    }

    /// Issue a signed token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenIssuance` when signing fails.
    pub fn issue(&self, user: &UserRecord) -> Result<String, AuthError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            role: user.role,
            iat: now,
            exp: now + self.ttl_secs,
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any signature, shape, or expiry
    /// failure.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use paperback_core::types::{Email, UserId};

    fn user(role: Role) -> UserRecord {
        UserRecord {
            id: UserId::from("u1"),
            email: Email::parse("alice@example.com").unwrap(),
            password_hash: "$argon2id$fake".to_owned(),
            full_name: "Alice".to_owned(),
            phone: None,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn secret() -> SecretString {
        SecretString::from("kY8#mP2$vQ9@nR4!xT7&wZ1*uA5^bC3%")
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = TokenService::new(&secret(), 3600);
        let token = tokens.issue(&user(Role::Admin)).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let tokens = TokenService::new(&secret(), 3600);
        let other = TokenService::new(
            &SecretString::from("zX4!cV8@bN2#mQ6$kL0%jH9^gF3&dS7*"),
            3600,
        );
        let token = tokens.issue(&user(Role::User)).unwrap();
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let tokens = TokenService::new(&secret(), 3600);
        assert!(matches!(
            tokens.verify("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }
}
