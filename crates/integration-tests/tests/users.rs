//! User account routes: lookup, profile updates, admin gating.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use paperback_integration_tests::TestContext;
use serde_json::json;

#[tokio::test]
async fn me_returns_own_profile_without_hash() {
    let ctx = TestContext::new().await;
    let (user_id, token) = ctx.register_user("alice@example.com").await;

    let (status, body) = ctx.request("GET", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id.as_str());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn email_lookup_is_open_to_any_user_but_listing_is_admin_only() {
    let ctx = TestContext::new().await;
    ctx.register_user("alice@example.com").await;
    let (_, bob) = ctx.register_user("bob@example.com").await;

    let (status, body) = ctx
        .request("GET", "/users?email=alice@example.com", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");

    let (status, _) = ctx
        .request("GET", "/users?email=nobody@example.com", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.request("GET", "/users", Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = ctx.admin_token();
    let (status, body) = ctx.request("GET", "/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn users_update_themselves_but_not_others_or_roles() {
    let ctx = TestContext::new().await;
    let (alice_id, alice) = ctx.register_user("alice@example.com").await;
    let (_, bob) = ctx.register_user("bob@example.com").await;
    let uri = format!("/users/{alice_id}");

    let (status, body) = ctx
        .request("PUT", &uri, Some(&alice), Some(json!({"fullName": "Alice B"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fullName"], "Alice B");

    let (status, _) = ctx
        .request("PUT", &uri, Some(&bob), Some(json!({"fullName": "Hacked"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Self-service role escalation is blocked.
    let (status, _) = ctx
        .request("PUT", &uri, Some(&alice), Some(json!({"role": "admin"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = ctx.admin_token();
    let (status, body) = ctx
        .request("PUT", &uri, Some(&admin), Some(json!({"role": "admin"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn deletion_is_admin_only() {
    let ctx = TestContext::new().await;
    let (alice_id, alice) = ctx.register_user("alice@example.com").await;
    let uri = format!("/users/{alice_id}");

    let (status, _) = ctx.request("DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = ctx.admin_token();
    let (status, _) = ctx.request("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.request("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
