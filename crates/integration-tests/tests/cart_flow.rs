//! Guest and signed-in cart behaviour.
//!
//! Requires the API server and a seeded catalog.

#![allow(clippy::unwrap_used)]

use casawood_integration_tests::{TestClient, in_stock_product_id};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_guest_cart_lines_merge_on_repeat_add() {
    let guest = TestClient::guest();
    let product_id = in_stock_product_id().await;

    let (status, body) = guest.get("/api/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["itemCount"], 0);

    guest
        .post("/api/cart/items", json!({"productId": product_id, "quantity": 2}))
        .await;
    let (status, body) = guest
        .post("/api/cart/items", json!({"productId": product_id}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(body["data"]["itemCount"], 3);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_quantity_bounds_are_enforced() {
    let guest = TestClient::guest();
    let product_id = in_stock_product_id().await;

    let (status, _) = guest
        .post("/api/cart/items", json!({"productId": product_id, "quantity": 0}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = guest
        .post("/api/cart/items", json!({"productId": product_id}))
        .await;
    let item_id = body["data"]["items"][0]["id"].as_i64().unwrap();

    let (status, _) = guest
        .put(&format!("/api/cart/items/{item_id}"), json!({"quantity": 100}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_save_for_later_round_trip() {
    let guest = TestClient::guest();
    let product_id = in_stock_product_id().await;

    let (_, body) = guest
        .post("/api/cart/items", json!({"productId": product_id}))
        .await;
    let item_id = body["data"]["items"][0]["id"].as_i64().unwrap();

    let (status, body) = guest
        .post(&format!("/api/cart/items/{item_id}/save-for-later"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["savedForLater"].as_array().unwrap().len(), 1);

    let (status, body) = guest
        .post(&format!("/api/cart/saved/{item_id}/move-to-cart"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let (status, body) = guest.delete("/api/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["itemCount"], 0);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_other_callers_items_are_404() {
    let owner = TestClient::guest();
    let stranger = TestClient::guest();
    let product_id = in_stock_product_id().await;

    let (_, body) = owner
        .post("/api/cart/items", json!({"productId": product_id}))
        .await;
    let item_id = body["data"]["items"][0]["id"].as_i64().unwrap();

    stranger.get("/api/cart").await;
    let (status, _) = stranger.delete(&format!("/api/cart/items/{item_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_guest_cart_merges_into_user_cart() {
    let guest = TestClient::guest();
    let product_id = in_stock_product_id().await;
    guest
        .post("/api/cart/items", json!({"productId": product_id, "quantity": 2}))
        .await;

    let user = TestClient::register("Merge Shopper").await;
    user.post("/api/cart/items", json!({"productId": product_id, "quantity": 1}))
        .await;

    let (status, body) = user
        .post("/api/cart/merge", json!({"guestId": guest.guest_id().unwrap()}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 3);

    // The guest cart is gone
    let (_, body) = guest.get("/api/cart").await;
    assert_eq!(body["data"]["itemCount"], 0);
}
