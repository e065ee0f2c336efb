//! Book catalog documents.

use chrono::{DateTime, Utc};
use paperback_core::types::BookId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A book in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-form category map carried through as-is.
    #[serde(default = "empty_object")]
    pub categories: Value,
    pub list_price: f64,
    pub original_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Book {
    /// Price a buyer actually pays: the discount price when present,
    /// otherwise the original price.
    #[must_use]
    pub fn effective_price(&self) -> f64 {
        self.discount_price.unwrap_or(self.original_price)
    }
}
