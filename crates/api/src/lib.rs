//! Paperback REST API.
//!
//! A mock bookstore backend: public catalog, bearer-token auth, one cart
//! per user, and orders with point-in-time price snapshots. Persistence
//! goes through a pluggable document store (flat JSON file or Postgres).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod engine;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use config::ApiConfig;
pub use error::ApiError;
pub use state::AppState;
