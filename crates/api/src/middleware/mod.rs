//! Request extractors.

pub mod auth;

pub use auth::{Identity, RequireAdmin, RequireAuth};
