//! Book catalog handlers.
//!
//! Reads are public; writes require any authenticated user.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use paperback_core::types::BookId;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::RequireAuth;
use crate::models::Book;
use crate::state::AppState;
use crate::store::{apply_to_document, collections, get_as, insert_as, list_as};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn index(State(state): State<AppState>) -> Result<Json<Vec<Book>>, ApiError> {
    let books = list_as(state.store(), collections::BOOKS).await?;
    Ok(Json(books))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<Json<Book>, ApiError> {
    let book: Book = get_as(state.store(), collections::BOOKS, id.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_owned()))?;
    Ok(Json(book))
}

#[derive(Debug, Deserialize)]
struct CreateBookBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    categories: Option<Value>,
    #[serde(default)]
    list_price: Option<f64>,
    #[serde(default)]
    original_price: Option<f64>,
    #[serde(default)]
    discount_price: Option<f64>,
}

async fn create(
    RequireAuth(_identity): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateBookBody>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(name), Some(original_price)) = (body.name, body.original_price) else {
        return Err(ApiError::InvalidArgument(
            "Name and original price are required".to_owned(),
        ));
    };
    if original_price < 0.0
        || body.list_price.is_some_and(|p| p < 0.0)
        || body.discount_price.is_some_and(|p| p < 0.0)
    {
        return Err(ApiError::InvalidArgument(
            "Prices must not be negative".to_owned(),
        ));
    }

    let now = Utc::now();
    let book = Book {
        id: BookId::generate(),
        name,
        description: body.description.unwrap_or_default(),
        categories: body
            .categories
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        list_price: body.list_price.unwrap_or(original_price),
        original_price,
        discount_price: body.discount_price,
        created_at: now,
        updated_at: now,
    };
    let stored = insert_as(state.store(), collections::BOOKS, &book).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[derive(Debug, Deserialize)]
struct UpdateBookBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    categories: Option<Value>,
    #[serde(default)]
    list_price: Option<f64>,
    #[serde(default, with = "double_option")]
    discount_price: Option<Option<f64>>,
    #[serde(default)]
    original_price: Option<f64>,
}

/// Distinguishes an absent field from an explicit `null` so a `null`
/// discount price clears the discount.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer).map(Some)
    }
}

async fn update(
    RequireAuth(_identity): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    Json(body): Json<UpdateBookBody>,
) -> Result<Json<Book>, ApiError> {
    if body.original_price.is_some_and(|p| p < 0.0)
        || body.list_price.is_some_and(|p| p < 0.0)
        || body.discount_price.flatten().is_some_and(|p| p < 0.0)
    {
        return Err(ApiError::InvalidArgument(
            "Prices must not be negative".to_owned(),
        ));
    }

    let updated = apply_to_document(
        state.store(),
        collections::BOOKS,
        id.as_str(),
        |book: &mut Book| {
            if let Some(name) = body.name.clone() {
                book.name = name;
            }
            if let Some(description) = body.description.clone() {
                book.description = description;
            }
            if let Some(categories) = body.categories.clone() {
                book.categories = categories;
            }
            if let Some(list_price) = body.list_price {
                book.list_price = list_price;
            }
            if let Some(original_price) = body.original_price {
                book.original_price = original_price;
            }
            if let Some(discount_price) = body.discount_price {
                book.discount_price = discount_price;
            }
            book.updated_at = Utc::now();
            Ok::<(), ApiError>(())
        },
    )
    .await
    .map_err(ApiError::from)?;

    updated
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Book not found".to_owned()))
}

async fn remove(
    RequireAuth(_identity): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete(collections::BOOKS, id.as_str()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Book not found".to_owned()))
    }
}
