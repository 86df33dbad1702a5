//! Razorpay client: gateway order creation and payment signature checks.
//!
//! Only the calls checkout needs are implemented. Orders are created and read
//! back over the REST Orders API with HTTP basic auth; a completed checkout is
//! proven by `HMAC-SHA256("{order_id}|{payment_id}", key_secret)` in hex.
//!
//! The signature only covers the two ids, so before a paid order is placed the
//! gateway order is fetched to learn who it was issued to and how much was
//! charged.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use casawood_core::{CURRENCY_CODE, UserId};

use crate::config::RazorpayConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("gateway error: {status} - {message}")]
    Gateway { status: u16, message: String },

    /// Checkout signature did not match.
    #[error("invalid payment signature")]
    InvalidSignature,

    /// Amount does not fit the gateway's integer paise field.
    #[error("amount out of range")]
    AmountOutOfRange,

    /// Gateway order was issued to another user or in another currency.
    #[error("gateway order does not belong to this checkout")]
    OrderMismatch,
}

/// Order object returned by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in paise.
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Free-form notes set at creation; an empty list when none were given.
    #[serde(default)]
    pub notes: serde_json::Value,
}

impl GatewayOrder {
    /// User id recorded in the notes by `create-order`.
    #[must_use]
    pub fn issued_to(&self) -> Option<&str> {
        self.notes.get("userId").and_then(serde_json::Value::as_str)
    }

    /// Check the order was created for `user_id` in rupees.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::OrderMismatch` otherwise.
    pub fn ensure_issued_to(&self, user_id: UserId) -> Result<(), PaymentError> {
        let owner_matches = self.issued_to() == Some(user_id.to_string().as_str());
        if owner_matches && self.currency == CURRENCY_CODE {
            Ok(())
        } else {
            Err(PaymentError::OrderMismatch)
        }
    }
}

#[derive(Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: serde_json::Value,
}

#[derive(Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Deserialize)]
struct GatewayErrorDetail {
    description: String,
}

/// Razorpay API client.
#[derive(Clone)]
pub struct RazorpayClient {
    client: reqwest::Client,
    key_id: String,
    key_secret: SecretString,
    api_base: String,
}

impl RazorpayClient {
    #[must_use]
    pub fn new(config: &RazorpayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            api_base: config.api_base.clone(),
        }
    }

    /// Public key id for the browser checkout widget.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a gateway order.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Http` if the request fails and
    /// `PaymentError::Gateway` if the gateway rejects it.
    pub async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
        notes: serde_json::Value,
    ) -> Result<GatewayOrder, PaymentError> {
        let url = format!("{}/orders", self.api_base);
        let body = CreateOrderRequest {
            amount: amount_paise,
            currency,
            receipt,
            notes,
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let order = read_order(response).await?;
        tracing::info!(gateway_order_id = %order.id, amount = order.amount, "Gateway order created");
        Ok(order)
    }

    /// Fetch a gateway order by id.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Http` if the request fails and
    /// `PaymentError::Gateway` if the gateway does not know the order.
    pub async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, PaymentError> {
        let url = format!("{}/orders/{order_id}", self.api_base);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .send()
            .await?;

        let order = read_order(response).await?;
        tracing::debug!(gateway_order_id = %order.id, amount = order.amount, "Gateway order fetched");
        Ok(order)
    }

    /// Check the signature the checkout widget returned.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidSignature` on mismatch.
    pub fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        let expected = payment_signature(order_id, payment_id, self.key_secret.expose_secret());
        if constant_time_compare(&expected, &signature.to_ascii_lowercase()) {
            Ok(())
        } else {
            Err(PaymentError::InvalidSignature)
        }
    }
}

/// Decode an order, or the gateway's error description on failure.
async fn read_order(response: reqwest::Response) -> Result<GatewayOrder, PaymentError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GatewayErrorBody>(&text)
            .map_or(text, |b| b.error.description);
        tracing::warn!(status = status.as_u16(), %message, "Gateway rejected request");
        return Err(PaymentError::Gateway {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}

/// Hex HMAC-SHA256 of `"{order_id}|{payment_id}"`.
#[must_use]
pub fn payment_signature(order_id: &str, payment_id: &str, key_secret: &str) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(key_secret.as_bytes()) else {
        // HMAC accepts keys of any length
        return String::new();
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Compare two strings without short-circuiting on the first difference.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() || a.is_empty() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Path, http::StatusCode, routing::get};

    const SECRET: &str = "Qw8Er7Ty6Ui5Op4As3Df2Gh1";
    const ORDER: &str = "order_IluGWxBm9U8zJ8";
    const PAYMENT: &str = "pay_IluHBjVuB7B3yS";
    const SIGNATURE: &str = "2f514b435d902562639b8ddc855f83233352f1e9be27b79381fcf85b6dc10e42";

    fn client_at(api_base: &str) -> RazorpayClient {
        RazorpayClient::new(&RazorpayConfig {
            key_id: "rzp_test_KeyId123".to_string(),
            key_secret: SecretString::from(SECRET),
            api_base: api_base.to_string(),
        })
    }

    fn client() -> RazorpayClient {
        client_at("http://127.0.0.1:9")
    }

    async fn stub_order(Path(id): Path<String>) -> (StatusCode, Json<serde_json::Value>) {
        if id == "order_Paid500" {
            let order = serde_json::json!({
                "id": id,
                "entity": "order",
                "amount": 50_000,
                "currency": "INR",
                "receipt": "rcpt_7_1710408600000",
                "status": "paid",
                "notes": {"userId": "7", "shippingAddressId": "3"},
            });
            (StatusCode::OK, Json(order))
        } else {
            let error = serde_json::json!({
                "error": {"code": "BAD_REQUEST_ERROR", "description": "The id provided does not exist"}
            });
            (StatusCode::BAD_REQUEST, Json(error))
        }
    }

    /// Local stand-in for the Orders API; returns its base URL.
    async fn stub_gateway() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/orders/{id}", get(stub_order));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn order_with(currency: &str, notes: serde_json::Value) -> GatewayOrder {
        serde_json::from_value(serde_json::json!({
            "id": "order_X",
            "amount": 1_000,
            "currency": currency,
            "notes": notes,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_order_reports_amount_and_owner() {
        let base = stub_gateway().await;
        let order = client_at(&base).fetch_order("order_Paid500").await.unwrap();

        assert_eq!(order.amount, 50_000);
        assert_eq!(order.issued_to(), Some("7"));
        assert!(order.ensure_issued_to(UserId::new(7)).is_ok());
        assert!(matches!(
            order.ensure_issued_to(UserId::new(8)),
            Err(PaymentError::OrderMismatch)
        ));
    }

    #[tokio::test]
    async fn test_fetch_unknown_order_is_gateway_error() {
        let base = stub_gateway().await;
        let err = client_at(&base).fetch_order("order_Missing").await.unwrap_err();
        match err {
            PaymentError::Gateway { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "The id provided does not exist");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_order_without_owner_notes_is_rejected() {
        let order = order_with("INR", serde_json::json!([]));
        assert_eq!(order.issued_to(), None);
        assert!(matches!(
            order.ensure_issued_to(UserId::new(7)),
            Err(PaymentError::OrderMismatch)
        ));
    }

    #[test]
    fn test_order_in_other_currency_is_rejected() {
        let order = order_with("USD", serde_json::json!({"userId": "7"}));
        assert!(matches!(
            order.ensure_issued_to(UserId::new(7)),
            Err(PaymentError::OrderMismatch)
        ));
    }

    #[test]
    fn test_signature_matches_known_vector() {
        assert_eq!(payment_signature(ORDER, PAYMENT, SECRET), SIGNATURE);
    }

    #[test]
    fn test_verify_accepts_gateway_signature() {
        assert!(client().verify_payment_signature(ORDER, PAYMENT, SIGNATURE).is_ok());
        assert!(
            client()
                .verify_payment_signature(ORDER, PAYMENT, &SIGNATURE.to_ascii_uppercase())
                .is_ok()
        );
    }

    #[test]
    fn test_verify_rejects_tampered_components() {
        let c = client();
        assert!(matches!(
            c.verify_payment_signature("order_IluGWxBm9U8zJ9", PAYMENT, SIGNATURE),
            Err(PaymentError::InvalidSignature)
        ));
        assert!(matches!(
            c.verify_payment_signature(ORDER, "pay_IluHBjVuB7B3yT", SIGNATURE),
            Err(PaymentError::InvalidSignature)
        ));
        let mut forged = SIGNATURE.to_string();
        forged.replace_range(0..1, "3");
        assert!(matches!(
            c.verify_payment_signature(ORDER, PAYMENT, &forged),
            Err(PaymentError::InvalidSignature)
        ));
        assert!(matches!(
            c.verify_payment_signature(ORDER, PAYMENT, ""),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }

    #[test]
    fn test_gateway_error_body_parses() {
        let body = r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"Authentication failed"}}"#;
        let parsed: GatewayErrorBody = serde_json::from_str(body).unwrap_or_else(|_| GatewayErrorBody {
            error: GatewayErrorDetail {
                description: String::new(),
            },
        });
        assert_eq!(parsed.error.description, "Authentication failed");
    }
}
