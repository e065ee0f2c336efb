//! Cart and order engines.
//!
//! These hold the business rules: cart merging and quantity semantics, price
//! snapshotting, order totals, ownership checks, and status transitions.
//! Route handlers stay thin and delegate here.

pub mod cart;
pub mod order;

pub use cart::CartEngine;
pub use order::{OrderEngine, StatusTransitionPolicy};

use thiserror::Error;

use crate::store::{ApplyError, StoreError};

/// Errors surfaced by the engines.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request is malformed or semantically invalid.
    #[error("{0}")]
    InvalidArgument(String),

    /// The referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The caller is not allowed to perform this operation.
    #[error("{0}")]
    PermissionDenied(String),

    /// The document store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ApplyError<Self>> for EngineError {
    fn from(err: ApplyError<Self>) -> Self {
        match err {
            ApplyError::Store(e) => Self::Store(e),
            ApplyError::Rejected(e) => e,
        }
    }
}
