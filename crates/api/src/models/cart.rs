//! Shopping cart documents and views.

use chrono::{DateTime, Utc};
use paperback_core::types::{BookId, CartId, CartItemId, UserId};
use serde::{Deserialize, Serialize};

use super::Book;

/// A line in a stored cart. Carries only the book reference; prices are
/// joined in at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub book_id: BookId,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

/// A user's cart as stored. One cart per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Fresh empty cart for a user.
    #[must_use]
    pub fn new_for_user(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: CartId::generate(),
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A cart line enriched with its book's current catalog data.
///
/// Book price fields keep their catalog casing on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: CartItemId,
    pub book_id: BookId,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
    pub name: String,
    #[serde(rename = "list_price")]
    pub list_price: f64,
    #[serde(rename = "original_price")]
    pub original_price: f64,
    #[serde(rename = "discount_price", skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
}

impl CartItemView {
    /// Join a stored line with its catalog book.
    #[must_use]
    pub fn from_item(item: CartItem, book: &Book) -> Self {
        Self {
            id: item.id,
            book_id: item.book_id,
            quantity: item.quantity,
            added_at: item.added_at,
            name: book.name.clone(),
            list_price: book.list_price,
            original_price: book.original_price,
            discount_price: book.discount_price,
        }
    }
}

/// Cart response body with enriched items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItemView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_deserializes_without_items() {
        let cart: Cart = serde_json::from_value(json!({
            "id": "c1",
            "userId": "u1",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_item_view_keeps_catalog_price_casing() {
        let book: Book = serde_json::from_value(json!({
            "id": "b1",
            "name": "Dune",
            "list_price": 18.0,
            "original_price": 20.0,
            "discount_price": 15.0,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        let item = CartItem {
            id: CartItemId::from("i1"),
            book_id: BookId::from("b1"),
            quantity: 2,
            added_at: Utc::now(),
        };

        let value = serde_json::to_value(CartItemView::from_item(item, &book)).unwrap();
        assert_eq!(value.get("bookId").unwrap(), "b1");
        assert_eq!(value.get("original_price").unwrap(), 20.0);
        assert_eq!(value.get("discount_price").unwrap(), 15.0);
    }
}
