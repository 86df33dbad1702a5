//! End-to-end tests for the Casawood API.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare a database and start the server
//! cargo run -p casawood-cli -- migrate
//! cargo run -p casawood-cli -- seed crates/cli/seed/catalog.yaml --clear
//! cargo run -p casawood-cli -- admin create -e ops@casawood.in -n Ops -p "$CASAWOOD_ADMIN_PASSWORD"
//! cargo run -p casawood-api
//!
//! # Run the ignored tests against it
//! CASAWOOD_ADMIN_EMAIL=ops@casawood.in cargo test -p casawood-integration-tests -- --ignored
//! ```
//!
//! `CASAWOOD_API_URL` points the tests at another server
//! (default `http://localhost:5000`). Each test registers fresh users, so
//! runs don't interfere with each other.
//!
//! Admin tests sign in with `CASAWOOD_ADMIN_EMAIL` / `CASAWOOD_ADMIN_PASSWORD`.
//! Payment tests need the server running with Razorpay test-mode keys and
//! the same `RAZORPAY_KEY_SECRET` exported to the test process, which signs
//! payments the way the checkout widget would.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::str::FromStr;

use hmac::{Hmac, Mac};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use sha2::Sha256;
use uuid::Uuid;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("CASAWOOD_API_URL")
        .unwrap_or_else(|_| "http://localhost:5000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Email that no earlier run has registered.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.casawood.in", Uuid::new_v4().simple())
}

/// HTTP client for one caller: anonymous, a guest, or a signed-in user.
pub struct TestClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    guest_id: Option<String>,
}

impl Default for TestClient {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl TestClient {
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            client: Client::new(),
            base_url: base_url(),
            token: None,
            guest_id: None,
        }
    }

    /// A guest shopper with a fresh `x-guest-id`.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            guest_id: Some(format!("guest-{}", Uuid::new_v4().simple())),
            ..Self::anonymous()
        }
    }

    /// Register a new customer and keep the returned token.
    pub async fn register(name: &str) -> Self {
        let mut client = Self::anonymous();
        let email = unique_email("customer");
        let (status, body) = client
            .send(
                Method::POST,
                "/api/auth/register",
                Some(json!({"name": name, "email": email, "password": "correct-horse-42"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        client.token = Some(body["data"]["token"].as_str().unwrap().to_string());
        client
    }

    /// Sign in with an existing account.
    pub async fn login(email: &str, password: &str) -> Self {
        let mut client = Self::anonymous();
        let (status, body) = client
            .post("/api/auth/login", json!({"email": email, "password": password}))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        client.token = Some(body["data"]["token"].as_str().unwrap().to_string());
        client
    }

    /// The admin account created with `cw-cli admin create`.
    pub async fn admin() -> Self {
        let email = std::env::var("CASAWOOD_ADMIN_EMAIL").expect("CASAWOOD_ADMIN_EMAIL not set");
        let password =
            std::env::var("CASAWOOD_ADMIN_PASSWORD").expect("CASAWOOD_ADMIN_PASSWORD not set");
        Self::login(&email, &password).await
    }

    #[must_use]
    pub fn guest_id(&self) -> Option<&str> {
        self.guest_id.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.client.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(guest_id) = &self.guest_id {
            request = request.header("x-guest-id", guest_id);
        }
        request
    }

    /// Send a request and return the status with the parsed JSON body
    /// (`Value::Null` for non-JSON bodies).
    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.expect("request failed");
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, None).await
    }
}

/// Id of some in-stock product from the seeded catalog.
pub async fn in_stock_product_id() -> i64 {
    let (status, body) = TestClient::anonymous()
        .get("/api/products?inStock=true&limit=1")
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"][0]["id"]
        .as_i64()
        .expect("no in-stock products; seed the catalog first")
}

/// Add a valid address to the user's book and return its id.
pub async fn create_address(client: &TestClient) -> i64 {
    let (status, body) = client
        .post(
            "/api/addresses",
            json!({
                "fullName": "Kabir Menon",
                "phone": "+91 98450 12345",
                "line1": "14 Residency Road",
                "city": "Bengaluru",
                "state": "Karnataka",
                "pincode": "560025",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

/// Read a money field; amounts are serialized as decimal strings.
#[must_use]
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

/// Checkout-widget signature for a payment, using `RAZORPAY_KEY_SECRET`.
#[must_use]
pub fn gateway_signature(order_id: &str, payment_id: &str) -> String {
    let secret = std::env::var("RAZORPAY_KEY_SECRET").expect("RAZORPAY_KEY_SECRET not set");
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Payment id the gateway has never issued.
#[must_use]
pub fn fresh_payment_id() -> String {
    let mut id = format!("pay_{}", Uuid::new_v4().simple());
    id.truncate(18);
    id
}
