//! Bearer-token authentication extractors.
//!
//! Handlers opt into authentication by taking [`RequireAuth`] (any verified
//! user) or [`RequireAdmin`] as an argument. The extractors verify the
//! `Authorization: Bearer` header against the token service; the claims are
//! trusted as-is without a store round-trip.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use paperback_core::types::{Email, Role, UserId};

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, as carried in the verified token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Email,
    pub role: Role,
}

impl Identity {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Extractor requiring a valid bearer token.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Identity);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_owned()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header".to_owned()))?;

        let claims = state
            .tokens()
            .verify(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_owned()))?;

        let email = Email::parse(&claims.email)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_owned()))?;

        Ok(Self(Identity {
            user_id: UserId::from(claims.sub),
            email,
            role: claims.role,
        }))
    }
}

/// Extractor requiring a valid bearer token with the admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Identity);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(identity) = RequireAuth::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            return Err(ApiError::PermissionDenied("Admin role required".to_owned()));
        }
        Ok(Self(identity))
    }
}
