//! Catalog routes: public reads, auth-gated writes.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use paperback_integration_tests::TestContext;
use serde_json::json;

#[tokio::test]
async fn catalog_reads_are_public() {
    let ctx = TestContext::new().await;
    ctx.seed_book("b1", "Dune", 20.0, Some(15.0)).await;

    let (status, body) = ctx.request("GET", "/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = ctx.request("GET", "/books/b1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Dune");
    assert_eq!(body["discount_price"], 15.0);

    let (status, _) = ctx.request("GET", "/books/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn writes_require_authentication() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .request(
            "POST",
            "/books",
            None,
            Some(json!({"name": "Dune", "original_price": 20.0})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_validates_and_defaults_list_price() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.register_user("alice@example.com").await;

    let (status, _) = ctx
        .request(
            "POST",
            "/books",
            Some(&token),
            Some(json!({"name": "Dune"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .request(
            "POST",
            "/books",
            Some(&token),
            Some(json!({"name": "Dune", "original_price": -1.0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx
        .request(
            "POST",
            "/books",
            Some(&token),
            Some(json!({"name": "Dune", "original_price": 20.0})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["list_price"], 20.0);
    assert!(body["id"].as_str().is_some());
}

#[tokio::test]
async fn update_merges_partially() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.register_user("alice@example.com").await;
    ctx.seed_book("b1", "Dune", 20.0, None).await;

    let (status, body) = ctx
        .request(
            "PUT",
            "/books/b1",
            Some(&token),
            Some(json!({"discount_price": 12.5})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Dune");
    assert_eq!(body["discount_price"], 12.5);

    let (status, _) = ctx
        .request(
            "PUT",
            "/books/missing",
            Some(&token),
            Some(json!({"name": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_no_content_then_not_found() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.register_user("alice@example.com").await;
    ctx.seed_book("b1", "Dune", 20.0, None).await;

    let (status, _) = ctx.request("DELETE", "/books/b1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.request("DELETE", "/books/b1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
