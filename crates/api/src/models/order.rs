//! Order documents and views.

use chrono::{DateTime, Utc};
use paperback_core::types::{BookId, OrderId, OrderStatus, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Book;

/// A line in a placed order. `price` and `name` are snapshots taken at
/// placement time; later catalog edits do not touch them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub book_id: BookId,
    pub quantity: u32,
    pub price: f64,
    pub name: String,
}

/// A placed order as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub status: OrderStatus,
    /// Opaque address object carried through as-is.
    pub shipping_address: Value,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order line with the current catalog book attached, when it still
/// exists. The snapshot fields stay authoritative either way.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    #[serde(flatten)]
    pub item: OrderItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}

/// Order response body with enriched items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItemView>,
    pub total_price: f64,
    pub status: OrderStatus,
    pub shipping_address: Value,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderView {
    /// Attach catalog books to an order's lines.
    #[must_use]
    pub fn enrich(order: Order, mut lookup: impl FnMut(&BookId) -> Option<Book>) -> Self {
        let items = order
            .items
            .into_iter()
            .map(|item| {
                let book = lookup(&item.book_id);
                OrderItemView { item, book }
            })
            .collect();
        Self {
            id: order.id,
            user_id: order.user_id,
            items,
            total_price: order.total_price,
            status: order.status,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
