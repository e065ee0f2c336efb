//! Order engine.
//!
//! Order placement snapshots book names and effective prices into the order
//! document, so later catalog edits never change what a customer was
//! charged. After a successful placement the user's cart is cleared on a
//! best-effort basis: a failure there is logged and swallowed, the order
//! stands.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use paperback_core::types::{BookId, OrderId, OrderStatus, Role, UserId};
use serde::Deserialize;
use serde_json::Value;

use super::{CartEngine, EngineError};
use crate::models::{Book, Order, OrderItem, OrderView};
use crate::store::{
    DocumentStore, apply_to_document, collections, find_eq_as, get_as, insert_as, list_as,
};

/// Decides which status transitions are legal.
///
/// The default policy allows any transition between defined statuses,
/// matching the original service's behavior. A restricted policy can be
/// injected to enforce a lifecycle graph without touching the engine.
#[derive(Debug, Clone, Default)]
pub struct StatusTransitionPolicy {
    rules: Option<HashMap<OrderStatus, HashSet<OrderStatus>>>,
}

impl StatusTransitionPolicy {
    /// Policy that allows every transition.
    #[must_use]
    pub const fn permissive() -> Self {
        Self { rules: None }
    }

    /// Policy restricted to an explicit transition table.
    #[must_use]
    pub fn restricted(rules: HashMap<OrderStatus, HashSet<OrderStatus>>) -> Self {
        Self { rules: Some(rules) }
    }

    /// Whether moving from `from` to `to` is allowed.
    #[must_use]
    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        self.rules.as_ref().is_none_or(|rules| {
            rules
                .get(&from)
                .is_some_and(|targets| targets.contains(&to))
        })
    }
}

/// One requested order line, pre-validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[serde(default)]
    pub book_id: Option<BookId>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// A checkout request body, pre-validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub shipping_address: Option<Value>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Order operations over the document store.
pub struct OrderEngine<'a> {
    store: &'a dyn DocumentStore,
    policy: StatusTransitionPolicy,
}

impl<'a> OrderEngine<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            policy: StatusTransitionPolicy::permissive(),
        }
    }

    #[must_use]
    pub const fn with_policy(store: &'a dyn DocumentStore, policy: StatusTransitionPolicy) -> Self {
        Self { store, policy }
    }

    /// Place an order.
    ///
    /// Validates the request, snapshots each book's name and effective price
    /// (discount price when set, otherwise the original price), sums the
    /// total left to right, stores the order as pending, then clears the
    /// user's cart best-effort.
    ///
    /// # Errors
    ///
    /// - `EngineError::InvalidArgument` on an empty item list, a missing
    ///   shipping address or payment method, or a malformed line
    /// - `EngineError::NotFound` when a referenced book does not exist
    pub async fn place_order(
        &self,
        user_id: &UserId,
        request: PlaceOrderRequest,
    ) -> Result<Order, EngineError> {
        if request.items.is_empty() {
            return Err(EngineError::InvalidArgument(
                "Order must contain at least one item".to_owned(),
            ));
        }
        let shipping_address = match request.shipping_address {
            Some(Value::Null) | None => {
                return Err(EngineError::InvalidArgument(
                    "Shipping address is required".to_owned(),
                ));
            }
            Some(address) => address,
        };
        let payment_method = request.payment_method.ok_or_else(|| {
            EngineError::InvalidArgument("Payment method is required".to_owned())
        })?;

        let mut items = Vec::with_capacity(request.items.len());
        let mut total_price = 0.0_f64;
        for line in request.items {
            let (Some(book_id), Some(quantity)) = (line.book_id, line.quantity) else {
                return Err(EngineError::InvalidArgument(
                    "Each item must have a bookId and quantity".to_owned(),
                ));
            };
            if quantity < 1 {
                return Err(EngineError::InvalidArgument(
                    "Each item must have a bookId and quantity".to_owned(),
                ));
            }
            let quantity = u32::try_from(quantity).map_err(|_| {
                EngineError::InvalidArgument("quantity is too large".to_owned())
            })?;

            let book: Book = get_as(self.store, collections::BOOKS, book_id.as_str())
                .await?
                .ok_or_else(|| {
                    EngineError::NotFound(format!("Book with ID {book_id} not found"))
                })?;

            let price = book.effective_price();
            total_price += price * f64::from(quantity);
            items.push(OrderItem {
                book_id,
                quantity,
                price,
                name: book.name,
            });
        }

        let now = Utc::now();
        let order = Order {
            id: OrderId::generate(),
            user_id: user_id.clone(),
            items,
            total_price,
            status: OrderStatus::Pending,
            shipping_address,
            payment_method,
            created_at: now,
            updated_at: now,
        };
        let order = insert_as(self.store, collections::ORDERS, &order).await?;

        // Best-effort: the order stands even if the cart cannot be cleared.
        if let Err(error) = CartEngine::new(self.store).clear_items(user_id).await {
            tracing::warn!(
                user_id = %user_id,
                order_id = %order.id,
                error = %error,
                "failed to clear cart after order placement"
            );
        }

        Ok(order)
    }

    /// Fetch one order, enforcing ownership for non-admins.
    ///
    /// # Errors
    ///
    /// - `EngineError::NotFound` when the order does not exist
    /// - `EngineError::PermissionDenied` when a non-admin reads someone
    ///   else's order
    pub async fn get_order(
        &self,
        actor_id: &UserId,
        actor_role: Role,
        order_id: &OrderId,
    ) -> Result<OrderView, EngineError> {
        let order: Order = get_as(self.store, collections::ORDERS, order_id.as_str())
            .await?
            .ok_or_else(|| EngineError::NotFound("Order not found".to_owned()))?;

        if !actor_role.is_admin() && order.user_id != *actor_id {
            return Err(EngineError::PermissionDenied(
                "You can only view your own orders".to_owned(),
            ));
        }

        self.enrich(order).await
    }

    /// List orders visible to the caller.
    ///
    /// Non-admins always see only their own orders regardless of the
    /// `filter_user_id` they pass. The status filter compares raw strings
    /// after the user filter; an unknown status simply matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` on store failure.
    pub async fn list_orders(
        &self,
        actor_id: &UserId,
        actor_role: Role,
        filter_user_id: Option<UserId>,
        filter_status: Option<String>,
    ) -> Result<Vec<OrderView>, EngineError> {
        let scope_user = if actor_role.is_admin() {
            filter_user_id
        } else {
            Some(actor_id.clone())
        };

        let orders: Vec<Order> = match scope_user {
            Some(user_id) => {
                find_eq_as(
                    self.store,
                    collections::ORDERS,
                    "userId",
                    &Value::String(user_id.to_string()),
                )
                .await?
            }
            None => list_as(self.store, collections::ORDERS).await?,
        };

        let mut views = Vec::new();
        for order in orders {
            if let Some(status) = &filter_status
                && order.status.to_string() != *status
            {
                continue;
            }
            views.push(self.enrich(order).await?);
        }
        Ok(views)
    }

    /// Update an order's status. Admin only.
    ///
    /// # Errors
    ///
    /// - `EngineError::PermissionDenied` for non-admin callers
    /// - `EngineError::InvalidArgument` for an unknown status or a
    ///   transition the policy forbids
    /// - `EngineError::NotFound` when the order does not exist
    pub async fn update_order_status(
        &self,
        actor_role: Role,
        order_id: &OrderId,
        status: &str,
    ) -> Result<Order, EngineError> {
        if !actor_role.is_admin() {
            return Err(EngineError::PermissionDenied(
                "Only admins can update order status".to_owned(),
            ));
        }

        let new_status: OrderStatus = status.parse().map_err(|_| {
            let valid = OrderStatus::ALL.map(|s| s.to_string()).join(", ");
            EngineError::InvalidArgument(format!("Invalid status. Must be one of: {valid}"))
        })?;

        let policy = self.policy.clone();
        let updated = apply_to_document(
            self.store,
            collections::ORDERS,
            order_id.as_str(),
            |order: &mut Order| {
                if !policy.allows(order.status, new_status) {
                    return Err(EngineError::InvalidArgument(format!(
                        "Cannot change status from {} to {new_status}",
                        order.status
                    )));
                }
                order.status = new_status;
                order.updated_at = Utc::now();
                Ok(())
            },
        )
        .await
        .map_err(EngineError::from)?;

        updated.ok_or_else(|| EngineError::NotFound("Order not found".to_owned()))
    }

    async fn enrich(&self, order: Order) -> Result<OrderView, EngineError> {
        let mut books: HashMap<BookId, Option<Book>> = HashMap::new();
        for item in &order.items {
            if !books.contains_key(&item.book_id) {
                let book = get_as(self.store, collections::BOOKS, item.book_id.as_str()).await?;
                books.insert(item.book_id.clone(), book);
            }
        }
        Ok(OrderView::enrich(order, |id| {
            books.get(id).cloned().flatten()
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;
    use serde_json::json;

    async fn setup() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db.json"))
            .await
            .unwrap();
        store
            .insert(
                collections::BOOKS,
                json!({
                    "id": "b1",
                    "name": "Dune",
                    "list_price": 18.0,
                    "original_price": 20.0,
                    "discount_price": 15.0,
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-01T00:00:00Z",
                }),
            )
            .await
            .unwrap();
        store
            .insert(
                collections::BOOKS,
                json!({
                    "id": "b2",
                    "name": "Hyperion",
                    "list_price": 12.0,
                    "original_price": 12.0,
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-01T00:00:00Z",
                }),
            )
            .await
            .unwrap();
        (dir, store)
    }

    fn uid() -> UserId {
        UserId::from("u1")
    }

    fn request(items: Vec<(&str, i64)>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            items: items
                .into_iter()
                .map(|(id, qty)| OrderItemRequest {
                    book_id: Some(BookId::from(id)),
                    quantity: Some(qty),
                })
                .collect(),
            shipping_address: Some(json!({"city": "Lyon"})),
            payment_method: Some("card".to_owned()),
        }
    }

    #[tokio::test]
    async fn test_place_order_snapshots_effective_prices() {
        let (_dir, store) = setup().await;
        let engine = OrderEngine::new(&store);

        let order = engine
            .place_order(&uid(), request(vec![("b1", 2), ("b2", 1)]))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        // b1 uses its discount price, b2 falls back to original.
        assert!((order.items[0].price - 15.0).abs() < f64::EPSILON);
        assert!((order.items[1].price - 12.0).abs() < f64::EPSILON);
        assert!((order.total_price - 42.0).abs() < f64::EPSILON);
        assert_eq!(order.items[0].name, "Dune");
    }

    #[tokio::test]
    async fn test_snapshot_survives_catalog_edit() {
        let (_dir, store) = setup().await;
        let engine = OrderEngine::new(&store);

        let order = engine
            .place_order(&uid(), request(vec![("b1", 1)]))
            .await
            .unwrap();
        store.delete(collections::BOOKS, "b1").await.unwrap();

        let view = engine
            .get_order(&uid(), Role::User, &order.id)
            .await
            .unwrap();
        assert!((view.items[0].item.price - 15.0).abs() < f64::EPSILON);
        assert!(view.items[0].book.is_none());
    }

    #[tokio::test]
    async fn test_place_order_validation() {
        let (_dir, store) = setup().await;
        let engine = OrderEngine::new(&store);

        let empty = PlaceOrderRequest {
            items: vec![],
            shipping_address: Some(json!({})),
            payment_method: Some("card".to_owned()),
        };
        assert!(matches!(
            engine.place_order(&uid(), empty).await,
            Err(EngineError::InvalidArgument(_))
        ));

        let mut no_address = request(vec![("b1", 1)]);
        no_address.shipping_address = None;
        assert!(matches!(
            engine.place_order(&uid(), no_address).await,
            Err(EngineError::InvalidArgument(_))
        ));

        let mut null_address = request(vec![("b1", 1)]);
        null_address.shipping_address = Some(Value::Null);
        assert!(matches!(
            engine.place_order(&uid(), null_address).await,
            Err(EngineError::InvalidArgument(_))
        ));

        let mut no_payment = request(vec![("b1", 1)]);
        no_payment.payment_method = None;
        assert!(matches!(
            engine.place_order(&uid(), no_payment).await,
            Err(EngineError::InvalidArgument(_))
        ));

        assert!(matches!(
            engine.place_order(&uid(), request(vec![("b1", 0)])).await,
            Err(EngineError::InvalidArgument(_))
        ));

        assert!(matches!(
            engine.place_order(&uid(), request(vec![("missing", 1)])).await,
            Err(EngineError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_place_order_clears_cart() {
        let (_dir, store) = setup().await;
        let carts = CartEngine::new(&store);
        carts
            .add_item(&uid(), Some(BookId::from("b1")), Some(2))
            .await
            .unwrap();

        OrderEngine::new(&store)
            .place_order(&uid(), request(vec![("b1", 2)]))
            .await
            .unwrap();

        let cart = carts.get_cart(&uid()).await.unwrap();
        assert!(cart.items.is_empty());
    }

    #[tokio::test]
    async fn test_get_order_enforces_ownership() {
        let (_dir, store) = setup().await;
        let engine = OrderEngine::new(&store);
        let order = engine
            .place_order(&uid(), request(vec![("b1", 1)]))
            .await
            .unwrap();

        let other = UserId::from("u2");
        assert!(matches!(
            engine.get_order(&other, Role::User, &order.id).await,
            Err(EngineError::PermissionDenied(_))
        ));
        assert!(engine.get_order(&other, Role::Admin, &order.id).await.is_ok());
        assert!(matches!(
            engine
                .get_order(&uid(), Role::User, &OrderId::from("missing"))
                .await,
            Err(EngineError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_orders_scopes_non_admin_to_self() {
        let (_dir, store) = setup().await;
        let engine = OrderEngine::new(&store);
        engine
            .place_order(&uid(), request(vec![("b1", 1)]))
            .await
            .unwrap();
        engine
            .place_order(&UserId::from("u2"), request(vec![("b2", 1)]))
            .await
            .unwrap();

        // Non-admin asking for someone else's orders still gets their own.
        let mine = engine
            .list_orders(&uid(), Role::User, Some(UserId::from("u2")), None)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, uid());

        let all = engine
            .list_orders(&uid(), Role::Admin, None, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let filtered = engine
            .list_orders(&uid(), Role::Admin, Some(UserId::from("u2")), None)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[tokio::test]
    async fn test_list_orders_status_filter() {
        let (_dir, store) = setup().await;
        let engine = OrderEngine::new(&store);
        let order = engine
            .place_order(&uid(), request(vec![("b1", 1)]))
            .await
            .unwrap();
        engine
            .update_order_status(Role::Admin, &order.id, "shipped")
            .await
            .unwrap();
        engine
            .place_order(&uid(), request(vec![("b2", 1)]))
            .await
            .unwrap();

        let shipped = engine
            .list_orders(&uid(), Role::User, None, Some("shipped".to_owned()))
            .await
            .unwrap();
        assert_eq!(shipped.len(), 1);

        // Unknown status matches nothing rather than erroring.
        let unknown = engine
            .list_orders(&uid(), Role::User, None, Some("returned".to_owned()))
            .await
            .unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_update_status_requires_admin_and_known_status() {
        let (_dir, store) = setup().await;
        let engine = OrderEngine::new(&store);
        let order = engine
            .place_order(&uid(), request(vec![("b1", 1)]))
            .await
            .unwrap();

        assert!(matches!(
            engine
                .update_order_status(Role::User, &order.id, "shipped")
                .await,
            Err(EngineError::PermissionDenied(_))
        ));
        assert!(matches!(
            engine
                .update_order_status(Role::Admin, &order.id, "returned")
                .await,
            Err(EngineError::InvalidArgument(_))
        ));

        let updated = engine
            .update_order_status(Role::Admin, &order.id, "delivered")
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_restricted_policy_blocks_transition() {
        let (_dir, store) = setup().await;
        let mut rules = HashMap::new();
        rules.insert(
            OrderStatus::Pending,
            HashSet::from([OrderStatus::Processing, OrderStatus::Cancelled]),
        );
        let engine = OrderEngine::with_policy(&store, StatusTransitionPolicy::restricted(rules));

        let order = engine
            .place_order(&uid(), request(vec![("b1", 1)]))
            .await
            .unwrap();

        assert!(matches!(
            engine
                .update_order_status(Role::Admin, &order.id, "delivered")
                .await,
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(
            engine
                .update_order_status(Role::Admin, &order.id, "processing")
                .await
                .is_ok()
        );
    }
}
