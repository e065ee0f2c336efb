//! Registration and login handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    email: String,
    password: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = AuthService::new(state.store(), state.tokens());
    let (record, token) = auth
        .register(&body.email, &body.password, &body.full_name, body.phone)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "accessToken": token, "user": User::from(record) })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = AuthService::new(state.store(), state.tokens());
    let (record, token) = auth.login(&body.email, &body.password).await?;
    Ok(Json(
        json!({ "accessToken": token, "user": User::from(record) }),
    ))
}
