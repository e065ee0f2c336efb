//! User account handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use paperback_core::types::{Role, UserId};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{User, UserRecord};
use crate::state::AppState;
use crate::store::{apply_to_document, collections, find_one_as, get_as, list_as};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/me", get(me))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct IndexQuery {
    #[serde(default)]
    email: Option<String>,
}

/// With `?email=` any authenticated user can look up one account; the full
/// listing is admin only.
async fn index(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Json<Value>, ApiError> {
    if let Some(email) = query.email {
        let user: UserRecord = find_one_as(
            state.store(),
            collections::USERS,
            "email",
            &Value::String(email),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_owned()))?;
        return Ok(Json(serde_json::to_value(User::from(user)).map_err(
            |e| ApiError::Internal(format!("response encoding failed: {e}")),
        )?));
    }

    if !identity.is_admin() {
        return Err(ApiError::PermissionDenied("Admin role required".to_owned()));
    }
    let users: Vec<UserRecord> = list_as(state.store(), collections::USERS).await?;
    let users: Vec<User> = users.into_iter().map(User::from).collect();
    Ok(Json(serde_json::to_value(users).map_err(|e| {
        ApiError::Internal(format!("response encoding failed: {e}"))
    })?))
}

async fn me(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let user: UserRecord = get_as(state.store(), collections::USERS, identity.user_id.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_owned()))?;
    Ok(Json(User::from(user)))
}

async fn show(
    RequireAuth(_identity): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError> {
    let user: UserRecord = get_as(state.store(), collections::USERS, id.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_owned()))?;
    Ok(Json(User::from(user)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserBody {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    role: Option<Role>,
}

/// Users may edit their own profile; admins may edit anyone. Only admins
/// may change roles.
async fn update(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserBody>,
) -> Result<Json<User>, ApiError> {
    if !identity.is_admin() && identity.user_id != id {
        return Err(ApiError::PermissionDenied(
            "You can only update your own profile".to_owned(),
        ));
    }
    if body.role.is_some() && !identity.is_admin() {
        return Err(ApiError::PermissionDenied(
            "Only admins can change roles".to_owned(),
        ));
    }

    let updated = apply_to_document(
        state.store(),
        collections::USERS,
        id.as_str(),
        |user: &mut UserRecord| {
            if let Some(full_name) = body.full_name.clone() {
                user.full_name = full_name;
            }
            if let Some(phone) = body.phone.clone() {
                user.phone = Some(phone);
            }
            if let Some(role) = body.role {
                user.role = role;
            }
            user.updated_at = Utc::now();
            Ok::<(), ApiError>(())
        },
    )
    .await
    .map_err(ApiError::from)?;

    updated
        .map(|user| Json(User::from(user)))
        .ok_or_else(|| ApiError::NotFound("User not found".to_owned()))
}

async fn remove(
    RequireAdmin(_identity): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    if state.store().delete(collections::USERS, id.as_str()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("User not found".to_owned()))
    }
}
