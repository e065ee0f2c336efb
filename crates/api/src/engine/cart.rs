//! Cart engine.
//!
//! Every cart mutation in the system goes through this module, so the
//! merge-by-book and quantity rules live in exactly one place:
//!
//! - one cart per user, created lazily on first access
//! - adding a book already in the cart increments its line, never duplicates
//! - setting a line's quantity to zero removes the line
//! - stored carts keep only book references; prices are joined at read time

use chrono::Utc;
use paperback_core::types::{BookId, CartItemId, UserId};
use serde_json::Value;

use super::EngineError;
use crate::models::{Book, Cart, CartItem, CartItemView, CartView};
use crate::store::{
    DocumentStore, apply_to_document, collections, find_one_as, get_as, insert_as,
};

/// Cart operations over the document store.
pub struct CartEngine<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CartEngine<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    async fn find_cart(&self, user_id: &UserId) -> Result<Option<Cart>, EngineError> {
        Ok(find_one_as(
            self.store,
            collections::CARTS,
            "userId",
            &Value::String(user_id.to_string()),
        )
        .await?)
    }

    async fn find_or_create_cart(&self, user_id: &UserId) -> Result<Cart, EngineError> {
        if let Some(cart) = self.find_cart(user_id).await? {
            return Ok(cart);
        }
        let cart = Cart::new_for_user(user_id.clone());
        Ok(insert_as(self.store, collections::CARTS, &cart).await?)
    }

    /// Fetch the user's cart, creating an empty one if none exists, with
    /// catalog data joined onto each line.
    ///
    /// Lines whose book has since been deleted are dropped from the view;
    /// the stored cart is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` on store failure.
    pub async fn get_cart(&self, user_id: &UserId) -> Result<CartView, EngineError> {
        let cart = self.find_or_create_cart(user_id).await?;

        let mut items = Vec::with_capacity(cart.items.len());
        for item in cart.items {
            let book: Option<Book> =
                get_as(self.store, collections::BOOKS, item.book_id.as_str()).await?;
            match book {
                Some(book) => items.push(CartItemView::from_item(item, &book)),
                None => {
                    tracing::debug!(book_id = %item.book_id, "cart references missing book, omitting line");
                }
            }
        }

        Ok(CartView {
            id: cart.id,
            user_id: cart.user_id,
            items,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        })
    }

    /// Add a book to the user's cart, merging with an existing line for the
    /// same book.
    ///
    /// # Errors
    ///
    /// - `EngineError::InvalidArgument` when `book_id` is missing or the
    ///   quantity is absent, zero, or negative
    /// - `EngineError::NotFound` when the book does not exist
    pub async fn add_item(
        &self,
        user_id: &UserId,
        book_id: Option<BookId>,
        quantity: Option<i64>,
    ) -> Result<Cart, EngineError> {
        let book_id = book_id.ok_or_else(|| {
            EngineError::InvalidArgument("bookId and quantity are required".to_owned())
        })?;
        let quantity = match quantity {
            Some(q) if q > 0 => u32::try_from(q).map_err(|_| {
                EngineError::InvalidArgument("quantity is too large".to_owned())
            })?,
            _ => {
                return Err(EngineError::InvalidArgument(
                    "quantity must be a positive integer".to_owned(),
                ));
            }
        };

        let book: Option<Book> =
            get_as(self.store, collections::BOOKS, book_id.as_str()).await?;
        if book.is_none() {
            return Err(EngineError::NotFound(format!(
                "Book with ID {book_id} not found"
            )));
        }

        let cart = self.find_or_create_cart(user_id).await?;
        let updated = apply_to_document(
            self.store,
            collections::CARTS,
            cart.id.as_str(),
            |cart: &mut Cart| {
                let now = Utc::now();
                if let Some(line) = cart.items.iter_mut().find(|i| i.book_id == book_id) {
                    // Merging must not wrap the stored quantity.
                    line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                        EngineError::InvalidArgument("quantity is too large".to_owned())
                    })?;
                } else {
                    cart.items.push(CartItem {
                        id: CartItemId::generate(),
                        book_id: book_id.clone(),
                        quantity,
                        added_at: now,
                    });
                }
                cart.updated_at = now;
                Ok::<(), EngineError>(())
            },
        )
        .await
        .map_err(EngineError::from)?;

        updated.ok_or_else(|| EngineError::NotFound("Cart not found".to_owned()))
    }

    /// Set the quantity of one cart line. Zero removes the line.
    ///
    /// # Errors
    ///
    /// - `EngineError::InvalidArgument` on a negative quantity
    /// - `EngineError::NotFound` when the cart or the line does not exist
    pub async fn set_item_quantity(
        &self,
        user_id: &UserId,
        item_id: &CartItemId,
        quantity: i64,
    ) -> Result<Cart, EngineError> {
        if quantity < 0 {
            return Err(EngineError::InvalidArgument(
                "quantity must not be negative".to_owned(),
            ));
        }
        let quantity = u32::try_from(quantity)
            .map_err(|_| EngineError::InvalidArgument("quantity is too large".to_owned()))?;

        let cart = self
            .find_cart(user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Cart not found".to_owned()))?;

        let updated = apply_to_document(
            self.store,
            collections::CARTS,
            cart.id.as_str(),
            |cart: &mut Cart| {
                let Some(index) = cart.items.iter().position(|i| &i.id == item_id) else {
                    return Err(EngineError::NotFound("Cart item not found".to_owned()));
                };
                if quantity == 0 {
                    cart.items.remove(index);
                } else if let Some(line) = cart.items.get_mut(index) {
                    line.quantity = quantity;
                }
                cart.updated_at = Utc::now();
                Ok(())
            },
        )
        .await
        .map_err(EngineError::from)?;

        updated.ok_or_else(|| EngineError::NotFound("Cart not found".to_owned()))
    }

    /// Remove one line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` when the cart or the line does not
    /// exist.
    pub async fn remove_item(
        &self,
        user_id: &UserId,
        item_id: &CartItemId,
    ) -> Result<Cart, EngineError> {
        let cart = self
            .find_cart(user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Cart not found".to_owned()))?;

        let updated = apply_to_document(
            self.store,
            collections::CARTS,
            cart.id.as_str(),
            |cart: &mut Cart| {
                let before = cart.items.len();
                cart.items.retain(|i| &i.id != item_id);
                if cart.items.len() == before {
                    return Err(EngineError::NotFound("Cart item not found".to_owned()));
                }
                cart.updated_at = Utc::now();
                Ok(())
            },
        )
        .await
        .map_err(EngineError::from)?;

        updated.ok_or_else(|| EngineError::NotFound("Cart not found".to_owned()))
    }

    /// Empty the user's cart. A user without a cart is already empty.
    ///
    /// Used by order placement after a successful checkout.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` on store failure.
    pub async fn clear_items(&self, user_id: &UserId) -> Result<(), EngineError> {
        let Some(cart) = self.find_cart(user_id).await? else {
            return Ok(());
        };

        apply_to_document(
            self.store,
            collections::CARTS,
            cart.id.as_str(),
            |cart: &mut Cart| {
                cart.items.clear();
                cart.updated_at = Utc::now();
                Ok::<(), EngineError>(())
            },
        )
        .await
        .map_err(EngineError::from)?;
        Ok(())
    }
}
