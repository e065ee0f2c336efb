//! Order handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use paperback_core::types::{OrderId, UserId};
use serde::Deserialize;

use crate::engine::order::PlaceOrderRequest;
use crate::engine::OrderEngine;
use crate::error::ApiError;
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderView};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(index))
        .route("/{id}", get(show))
        .route("/{id}/status", patch(update_status))
}

async fn create(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = OrderEngine::new(state.store())
        .place_order(&identity.user_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    #[serde(default)]
    user_id: Option<UserId>,
    #[serde(default)]
    status: Option<String>,
}

async fn index(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let orders = OrderEngine::new(state.store())
        .list_orders(
            &identity.user_id,
            identity.role,
            query.user_id,
            query.status,
        )
        .await?;
    Ok(Json(orders))
}

async fn show(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>, ApiError> {
    let order = OrderEngine::new(state.store())
        .get_order(&identity.user_id, identity.role, &id)
        .await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusBody {
    status: String,
}

async fn update_status(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<Order>, ApiError> {
    let order = OrderEngine::new(state.store())
        .update_order_status(identity.role, &id, &body.status)
        .await?;
    Ok(Json(order))
}
