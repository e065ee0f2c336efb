//! Order routes: placement, snapshots, ownership, status updates.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use paperback_integration_tests::TestContext;
use serde_json::json;

fn order_body(items: serde_json::Value) -> serde_json::Value {
    json!({
        "items": items,
        "shippingAddress": {"street": "1 Main St", "city": "Lyon"},
        "paymentMethod": "card",
    })
}

#[tokio::test]
async fn place_order_snapshots_prices_and_clears_cart() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.register_user("alice@example.com").await;
    ctx.seed_book("b1", "Dune", 20.0, Some(15.0)).await;
    ctx.seed_book("b2", "Hyperion", 12.0, None).await;

    ctx.request(
        "POST",
        "/cart/items",
        Some(&token),
        Some(json!({"bookId": "b1", "quantity": 2})),
    )
    .await;

    let (status, body) = ctx
        .request(
            "POST",
            "/orders",
            Some(&token),
            Some(order_body(json!([
                {"bookId": "b1", "quantity": 2},
                {"bookId": "b2", "quantity": 1},
            ]))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    // Discounted book uses its discount price, the other falls back.
    assert_eq!(body["items"][0]["price"], 15.0);
    assert_eq!(body["items"][1]["price"], 12.0);
    assert_eq!(body["totalPrice"], 42.0);
    assert_eq!(body["items"][0]["name"], "Dune");

    // Checkout emptied the cart.
    let (_, cart) = ctx.request("GET", "/cart", Some(&token), None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn place_order_validation() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.register_user("alice@example.com").await;
    ctx.seed_book("b1", "Dune", 20.0, None).await;

    let cases = [
        order_body(json!([])),
        json!({"items": [{"bookId": "b1", "quantity": 1}], "paymentMethod": "card"}),
        json!({
            "items": [{"bookId": "b1", "quantity": 1}],
            "shippingAddress": null,
            "paymentMethod": "card",
        }),
        json!({"items": [{"bookId": "b1", "quantity": 1}], "shippingAddress": {}}),
        order_body(json!([{"bookId": "b1", "quantity": 0}])),
        order_body(json!([{"quantity": 1}])),
    ];
    for body in cases {
        let (status, _) = ctx.request("POST", "/orders", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = ctx
        .request(
            "POST",
            "/orders",
            Some(&token),
            Some(order_body(json!([{"bookId": "missing", "quantity": 1}]))),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_snapshot_survives_book_deletion() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.register_user("alice@example.com").await;
    ctx.seed_book("b1", "Dune", 20.0, Some(15.0)).await;

    let (_, order) = ctx
        .request(
            "POST",
            "/orders",
            Some(&token),
            Some(order_body(json!([{"bookId": "b1", "quantity": 1}]))),
        )
        .await;
    let order_id = order["id"].as_str().unwrap().to_owned();

    ctx.request("DELETE", "/books/b1", Some(&token), None).await;

    let (status, body) = ctx
        .request("GET", &format!("/orders/{order_id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["price"], 15.0);
    assert_eq!(body["items"][0]["name"], "Dune");
    assert!(body["items"][0].get("book").is_none());
}

#[tokio::test]
async fn users_cannot_read_each_others_orders() {
    let ctx = TestContext::new().await;
    let (_, alice) = ctx.register_user("alice@example.com").await;
    let (_, bob) = ctx.register_user("bob@example.com").await;
    ctx.seed_book("b1", "Dune", 20.0, None).await;

    let (_, order) = ctx
        .request(
            "POST",
            "/orders",
            Some(&alice),
            Some(order_body(json!([{"bookId": "b1", "quantity": 1}]))),
        )
        .await;
    let order_id = order["id"].as_str().unwrap().to_owned();

    let (status, _) = ctx
        .request("GET", &format!("/orders/{order_id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = ctx.admin_token();
    let (status, _) = ctx
        .request("GET", &format!("/orders/{order_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn listing_scopes_non_admins_to_their_own_orders() {
    let ctx = TestContext::new().await;
    let (alice_id, alice) = ctx.register_user("alice@example.com").await;
    let (bob_id, bob) = ctx.register_user("bob@example.com").await;
    ctx.seed_book("b1", "Dune", 20.0, None).await;

    for token in [&alice, &bob] {
        ctx.request(
            "POST",
            "/orders",
            Some(token),
            Some(order_body(json!([{"bookId": "b1", "quantity": 1}]))),
        )
        .await;
    }

    // Alice asking for Bob's orders still only sees her own.
    let (_, body) = ctx
        .request(
            "GET",
            &format!("/orders?userId={bob_id}"),
            Some(&alice),
            None,
        )
        .await;
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["userId"], alice_id.as_str());

    let admin = ctx.admin_token();
    let (_, body) = ctx.request("GET", "/orders", Some(&admin), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = ctx
        .request(
            "GET",
            &format!("/orders?userId={bob_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn status_filter_applies_after_user_scoping() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.register_user("alice@example.com").await;
    ctx.seed_book("b1", "Dune", 20.0, None).await;

    let (_, order) = ctx
        .request(
            "POST",
            "/orders",
            Some(&token),
            Some(order_body(json!([{"bookId": "b1", "quantity": 1}]))),
        )
        .await;
    let order_id = order["id"].as_str().unwrap().to_owned();
    ctx.request(
        "POST",
        "/orders",
        Some(&token),
        Some(order_body(json!([{"bookId": "b1", "quantity": 1}]))),
    )
    .await;

    let admin = ctx.admin_token();
    ctx.request(
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(&admin),
        Some(json!({"status": "shipped"})),
    )
    .await;

    let (_, body) = ctx
        .request("GET", "/orders?status=shipped", Some(&token), None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Unknown status matches nothing rather than erroring.
    let (status, body) = ctx
        .request("GET", "/orders?status=returned", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn only_admins_update_status_and_only_to_known_values() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.register_user("alice@example.com").await;
    ctx.seed_book("b1", "Dune", 20.0, None).await;

    let (_, order) = ctx
        .request(
            "POST",
            "/orders",
            Some(&token),
            Some(order_body(json!([{"bookId": "b1", "quantity": 1}]))),
        )
        .await;
    let order_id = order["id"].as_str().unwrap().to_owned();
    let uri = format!("/orders/{order_id}/status");

    let (status, _) = ctx
        .request("PATCH", &uri, Some(&token), Some(json!({"status": "shipped"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = ctx.admin_token();
    let (status, body) = ctx
        .request("PATCH", &uri, Some(&admin), Some(json!({"status": "returned"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Must be one of"));

    let (status, body) = ctx
        .request("PATCH", &uri, Some(&admin), Some(json!({"status": "delivered"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "delivered");
}
