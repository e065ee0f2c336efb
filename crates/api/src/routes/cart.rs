//! Cart handlers. All cart logic lives in the cart engine; these just
//! decode requests and pick response shapes.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use paperback_core::types::{BookId, CartItemId};
use serde::Deserialize;

use crate::engine::CartEngine;
use crate::error::ApiError;
use crate::middleware::RequireAuth;
use crate::models::{Cart, CartView};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show))
        .route("/items", post(add_item))
        .route("/items/{itemId}", axum::routing::patch(set_quantity).delete(remove_item))
}

async fn show(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<CartView>, ApiError> {
    let cart = CartEngine::new(state.store())
        .get_cart(&identity.user_id)
        .await?;
    Ok(Json(cart))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody {
    #[serde(default)]
    book_id: Option<BookId>,
    #[serde(default)]
    quantity: Option<i64>,
}

async fn add_item(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<AddItemBody>,
) -> Result<Json<Cart>, ApiError> {
    let cart = CartEngine::new(state.store())
        .add_item(&identity.user_id, body.book_id, body.quantity)
        .await?;
    Ok(Json(cart))
}

#[derive(Debug, Deserialize)]
struct SetQuantityBody {
    quantity: i64,
}

async fn set_quantity(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<CartItemId>,
    Json(body): Json<SetQuantityBody>,
) -> Result<Json<Cart>, ApiError> {
    let cart = CartEngine::new(state.store())
        .set_item_quantity(&identity.user_id, &item_id, body.quantity)
        .await?;
    Ok(Json(cart))
}

async fn remove_item(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<CartItemId>,
) -> Result<Json<Cart>, ApiError> {
    let cart = CartEngine::new(state.store())
        .remove_item(&identity.user_id, &item_id)
        .await?;
    Ok(Json(cart))
}
