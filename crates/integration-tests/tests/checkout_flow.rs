//! Address book, order placement and payment verification.
//!
//! Requires the API server and a seeded catalog.

#![allow(clippy::unwrap_used)]

use casawood_integration_tests::{TestClient, create_address, decimal, in_stock_product_id};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

/// Put `quantity` of `product_id` in the cart and place a COD order.
async fn place_cod_order(user: &TestClient, product_id: i64, quantity: u32) -> Value {
    let address_id = create_address(user).await;
    let (status, body) = user
        .post(
            "/api/cart/items",
            json!({"productId": product_id, "quantity": quantity}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = user
        .post(
            "/api/orders",
            json!({"shippingAddressId": address_id, "paymentMethod": "cod"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_first_address_becomes_default() {
    let user = TestClient::register("Address Owner").await;
    let first = create_address(&user).await;
    let second = create_address(&user).await;

    let (_, body) = user.get("/api/addresses").await;
    let addresses = body["data"].as_array().unwrap();
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0]["id"], first);
    assert_eq!(addresses[0]["isDefault"], true);

    let (status, body) = user
        .put(&format!("/api/addresses/{second}/default"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isDefault"], true);

    let (_, body) = user.get(&format!("/api/addresses/{first}")).await;
    assert_eq!(body["data"]["isDefault"], false);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_empty_cart_cannot_be_ordered() {
    let user = TestClient::register("Empty Cart").await;
    let address_id = create_address(&user).await;

    let (status, body) = user
        .post(
            "/api/orders",
            json!({"shippingAddressId": address_id, "paymentMethod": "cod"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cart is empty");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_cod_order_snapshots_cart_and_can_be_cancelled() {
    let user = TestClient::register("Cod Buyer").await;
    let address_id = create_address(&user).await;
    let product_id = in_stock_product_id().await;
    user.post("/api/cart/items", json!({"productId": product_id, "quantity": 2}))
        .await;

    let (status, body) = user
        .post(
            "/api/orders",
            json!({"shippingAddressId": address_id, "paymentMethod": "cod", "notes": "Ring twice"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order = &body["data"];
    assert!(order["orderNumber"].as_str().unwrap().starts_with("ORD-"));
    assert_eq!(order["paymentMethod"], "cod");
    assert_eq!(order["orderStatus"], "pending");
    assert_eq!(order["items"][0]["quantity"], 2);
    assert_eq!(order["shippingAddress"]["pincode"], "560025");

    // The cart was emptied
    let (_, cart) = user.get("/api/cart").await;
    assert_eq!(cart["data"]["itemCount"], 0);

    let order_id = order["id"].as_i64().unwrap();
    let (_, list) = user.get("/api/users/orders").await;
    assert_eq!(list["data"][0]["id"], order_id);

    let (status, body) = user
        .put(&format!("/api/orders/{order_id}/cancel"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["orderStatus"], "cancelled");

    let (status, body) = user
        .put(&format!("/api/orders/{order_id}/cancel"), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Order cannot be cancelled");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_orders_are_private() {
    let buyer = TestClient::register("Private Buyer").await;
    let address_id = create_address(&buyer).await;
    let product_id = in_stock_product_id().await;
    buyer
        .post("/api/cart/items", json!({"productId": product_id}))
        .await;
    let (_, body) = buyer
        .post(
            "/api/orders",
            json!({"shippingAddressId": address_id, "paymentMethod": "cod"}),
        )
        .await;
    let order_id = body["data"]["id"].as_i64().unwrap();

    let other = TestClient::register("Curious Neighbour").await;
    let (status, _) = other.get(&format!("/api/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_tampered_payment_signature_is_rejected() {
    let user = TestClient::register("Online Buyer").await;
    let address_id = create_address(&user).await;

    let (status, body) = user
        .post(
            "/api/payment/verify",
            json!({
                "razorpayOrderId": "order_FAKE123",
                "razorpayPaymentId": "pay_FAKE123",
                "razorpaySignature": "0".repeat(64),
                "shippingAddressId": address_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid payment signature");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_wishlist_add_twice_conflicts() {
    let user = TestClient::register("Wishful").await;
    let product_id = in_stock_product_id().await;

    let (status, _) = user
        .post(&format!("/api/wishlist/{product_id}"), json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = user
        .post(&format!("/api/wishlist/{product_id}"), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = user.get("/api/wishlist").await;
    assert_eq!(body["data"][0]["id"], product_id);

    let (status, _) = user.delete(&format!("/api/wishlist/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = user.delete(&format!("/api/wishlist/{product_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_order_totals_are_subtotal_plus_delivery() {
    let user = TestClient::register("Totals Buyer").await;
    let product_id = in_stock_product_id().await;
    let (_, product) = user.get(&format!("/api/products/{product_id}")).await;
    let price = decimal(&product["data"]["price"]);

    let order = place_cod_order(&user, product_id, 2).await;

    let subtotal = price * Decimal::from(2);
    let delivery = if subtotal > Decimal::from(50_000) {
        Decimal::ZERO
    } else {
        Decimal::from(500)
    };
    assert_eq!(decimal(&order["subtotal"]), subtotal);
    assert_eq!(decimal(&order["deliveryCharges"]), delivery);
    assert_eq!(decimal(&order["total"]), subtotal + delivery);
    assert_eq!(decimal(&order["items"][0]["price"]), price);

    // Stored values match what was returned at placement
    let order_id = order["id"].as_i64().unwrap();
    let (_, stored) = user.get(&format!("/api/orders/{order_id}")).await;
    assert_eq!(decimal(&stored["data"]["total"]), subtotal + delivery);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_deleting_default_address_promotes_newest() {
    let user = TestClient::register("Moving House").await;
    let first = create_address(&user).await;
    let second = create_address(&user).await;
    let newest = create_address(&user).await;

    let (status, _) = user.delete(&format!("/api/addresses/{first}")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = user.get(&format!("/api/addresses/{newest}")).await;
    assert_eq!(body["data"]["isDefault"], true);
    let (_, body) = user.get(&format!("/api/addresses/{second}")).await;
    assert_eq!(body["data"]["isDefault"], false);

    // Deleting a non-default address leaves the default alone
    let (status, _) = user.delete(&format!("/api/addresses/{second}")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = user.get(&format!("/api/addresses/{newest}")).await;
    assert_eq!(body["data"]["isDefault"], true);
}

#[tokio::test]
#[ignore = "Requires running API server, seeded database and CASAWOOD_ADMIN_EMAIL/PASSWORD"]
async fn test_only_admins_update_order_status() {
    let buyer = TestClient::register("Status Watcher").await;
    let product_id = in_stock_product_id().await;
    let order = place_cod_order(&buyer, product_id, 1).await;
    let status_path = format!("/api/orders/{}/status", order["id"]);

    let (status, body) = buyer
        .put(&status_path, json!({"orderStatus": "shipped"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let admin = TestClient::admin().await;
    let (status, body) = admin.put(&status_path, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = admin
        .put(
            &status_path,
            json!({"orderStatus": "shipped", "paymentStatus": "paid"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["orderStatus"], "shipped");
    assert_eq!(body["data"]["paymentStatus"], "paid");

    // A shipped order is past cancelling
    let (status, _) = buyer
        .put(&format!("/api/orders/{}/cancel", order["id"]), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
