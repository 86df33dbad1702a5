//! Online checkout through the payment gateway.
//!
//! Requires the API server running with Razorpay test-mode keys and the same
//! `RAZORPAY_KEY_SECRET` in this process's environment.

#![allow(clippy::unwrap_used)]

use casawood_integration_tests::{
    TestClient, create_address, fresh_payment_id, gateway_signature, in_stock_product_id,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

/// Fill the cart and open a gateway order for it; returns its id.
async fn open_gateway_order(user: &TestClient, address_id: i64, product_id: i64) -> String {
    let (status, body) = user
        .post("/api/cart/items", json!({"productId": product_id}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = user
        .post(
            "/api/payment/create-order",
            json!({"shippingAddressId": address_id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["currency"], "INR");
    body["data"]["gatewayOrderId"].as_str().unwrap().to_string()
}

fn verify_body(order_id: &str, payment_id: &str, address_id: i64) -> Value {
    json!({
        "razorpayOrderId": order_id,
        "razorpayPaymentId": payment_id,
        "razorpaySignature": gateway_signature(order_id, payment_id),
        "shippingAddressId": address_id,
    })
}

#[tokio::test]
#[ignore = "Requires running API server with Razorpay test keys and RAZORPAY_KEY_SECRET"]
async fn test_verified_payment_places_paid_order_once() {
    let user = TestClient::register("Online Payer").await;
    let address_id = create_address(&user).await;
    let product_id = in_stock_product_id().await;
    let order_id = open_gateway_order(&user, address_id, product_id).await;
    let payment_id = fresh_payment_id();

    let (status, body) = user
        .post(
            "/api/payment/verify",
            verify_body(&order_id, &payment_id, address_id),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["paymentMethod"], "online");
    assert_eq!(body["data"]["paymentStatus"], "paid");
    assert_eq!(body["data"]["orderStatus"], "confirmed");
    assert_eq!(body["data"]["razorpayPaymentId"], payment_id.as_str());

    // Same cart total again, same payment: the payment can't settle two orders
    user.post("/api/cart/items", json!({"productId": product_id}))
        .await;
    let (status, body) = user
        .post(
            "/api/payment/verify",
            verify_body(&order_id, &payment_id, address_id),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["message"], "this payment has already been used for an order");
}

#[tokio::test]
#[ignore = "Requires running API server with Razorpay test keys and RAZORPAY_KEY_SECRET"]
async fn test_cart_grown_after_payment_is_rejected() {
    let user = TestClient::register("Cart Grower").await;
    let address_id = create_address(&user).await;
    let product_id = in_stock_product_id().await;
    let order_id = open_gateway_order(&user, address_id, product_id).await;

    // More goods after the gateway order was sized
    let (status, _) = user
        .post(
            "/api/cart/items",
            json!({"productId": product_id, "quantity": 3}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = user
        .post(
            "/api/payment/verify",
            verify_body(&order_id, &fresh_payment_id(), address_id),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["message"], "Paid amount does not match the order total");

    // Nothing was placed and the cart is intact
    let (_, orders) = user.get("/api/orders").await;
    assert_eq!(orders["data"].as_array().unwrap().len(), 0);
    let (_, cart) = user.get("/api/cart").await;
    assert_eq!(cart["data"]["items"][0]["quantity"], 4);
}

#[tokio::test]
#[ignore = "Requires running API server with Razorpay test keys and RAZORPAY_KEY_SECRET"]
async fn test_gateway_order_of_another_user_is_rejected() {
    let owner = TestClient::register("Order Owner").await;
    let owner_address = create_address(&owner).await;
    let product_id = in_stock_product_id().await;
    let order_id = open_gateway_order(&owner, owner_address, product_id).await;

    let other = TestClient::register("Order Borrower").await;
    let other_address = create_address(&other).await;
    other
        .post("/api/cart/items", json!({"productId": product_id}))
        .await;

    let (status, body) = other
        .post(
            "/api/payment/verify",
            verify_body(&order_id, &fresh_payment_id(), other_address),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["message"], "Payment does not match this checkout");
}
