//! HTTP route tree.
//!
//! ```text
//! POST   /auth/register          create account, returns token
//! POST   /auth/login             verify credentials, returns token
//! GET    /books                  public catalog listing
//! GET    /books/{id}             public book detail
//! POST   /books                  auth: create book
//! PUT    /books/{id}             auth: partial update
//! DELETE /books/{id}             auth: delete
//! GET    /users                  auth (?email=) / admin (full list)
//! GET    /users/me               auth: own profile
//! GET    /users/{id}             auth: profile by id
//! PUT    /users/{id}             auth: self or admin
//! DELETE /users/{id}             admin
//! GET    /cart                   auth: own cart with catalog data
//! POST   /cart/items             auth: add book to cart
//! PATCH  /cart/items/{itemId}    auth: set line quantity (0 removes)
//! DELETE /cart/items/{itemId}    auth: remove line
//! POST   /orders                 auth: place order
//! GET    /orders                 auth (?userId=&status=)
//! GET    /orders/{id}            auth: own order, admin: any
//! PATCH  /orders/{id}/status     admin
//! GET    /health                 liveness
//! GET    /health/ready           readiness (store ping)
//! ```

mod auth;
mod books;
mod cart;
mod orders;
mod users;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Liveness probe. Does not touch any dependency.
async fn health() -> &'static str {
    "ok"
}

/// Readiness probe. Verifies the document store is reachable.
async fn ready(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::http::StatusCode {
    match state.store().ping().await {
        Ok(()) => axum::http::StatusCode::OK,
        Err(_) => axum::http::StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// All API routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/books", books::router())
        .nest("/users", users::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .route("/health", get(health))
        .route("/health/ready", get(ready))
}

/// The complete application: routes, tracing, and CORS.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
