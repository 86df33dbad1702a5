//! Online payment routes.
//!
//! The client asks for a gateway order sized to its cart total, completes
//! payment in the gateway's checkout widget, then posts the signed result
//! to `/verify`, which places the order. The gateway order is read back
//! during verification so a payment can only settle the caller's own cart at
//! the amount actually charged.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use casawood_core::{AddressId, CURRENCY_CODE, CheckoutTotals};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{GatewayPayment, Order};
use crate::response::ApiResponse;
use crate::services::checkout::{CheckoutService, Payment, PlaceOrder};
use crate::services::payment::PaymentError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResponse {
    pub key_id: String,
}

/// Public key id for the checkout widget.
///
/// GET /api/payment/key
pub async fn key(State(state): State<AppState>) -> ApiResponse<KeyResponse> {
    ApiResponse::ok(KeyResponse {
        key_id: state.razorpay().key_id().to_string(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub shipping_address_id: AddressId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub gateway_order_id: String,
    /// Amount in paise.
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub totals: CheckoutTotals,
}

/// Gateway receipt reference; the gateway caps it at 40 characters.
fn receipt_for(user_id: impl std::fmt::Display, at: chrono::DateTime<chrono::Utc>) -> String {
    let mut receipt = format!("rcpt_{user_id}_{}", at.timestamp_millis());
    receipt.truncate(40);
    receipt
}

/// Create a gateway order for the cart total.
///
/// POST /api/payment/create-order
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<ApiResponse<CreateOrderResponse>> {
    let Json(body) = body?;
    let quote = CheckoutService::new(state.pool())
        .quote(user.id, body.shipping_address_id)
        .await?;
    let amount = quote
        .totals
        .amount_in_paise()
        .ok_or(PaymentError::AmountOutOfRange)?;

    let receipt = receipt_for(user.id, chrono::Utc::now());
    let notes = serde_json::json!({
        "userId": user.id.to_string(),
        "shippingAddressId": body.shipping_address_id.to_string(),
    });
    let gateway_order = state
        .razorpay()
        .create_order(amount, CURRENCY_CODE, &receipt, notes)
        .await?;

    Ok(ApiResponse::ok(CreateOrderResponse {
        gateway_order_id: gateway_order.id,
        amount: gateway_order.amount,
        currency: gateway_order.currency,
        key_id: state.razorpay().key_id().to_string(),
        totals: quote.totals,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub razorpay_order_id: String,
    #[serde(default)]
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_signature: String,
    pub shipping_address_id: AddressId,
    #[serde(default)]
    pub billing_address_id: Option<AddressId>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Verify a completed payment and place the paid order.
///
/// POST /api/payment/verify
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn verify(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<ApiResponse<Order>> {
    let Json(body) = body?;
    state.razorpay().verify_payment_signature(
        &body.razorpay_order_id,
        &body.razorpay_payment_id,
        &body.razorpay_signature,
    )?;

    let gateway_order = state.razorpay().fetch_order(&body.razorpay_order_id).await?;
    gateway_order.ensure_issued_to(user.id).inspect_err(|_| {
        tracing::warn!(
            gateway_order_id = %gateway_order.id,
            issued_to = ?gateway_order.issued_to(),
            "Gateway order does not belong to caller"
        );
    })?;

    let order = CheckoutService::new(state.pool())
        .place(
            user.id,
            PlaceOrder {
                shipping_address_id: body.shipping_address_id,
                billing_address_id: body.billing_address_id,
                payment: Payment::Online {
                    payment: GatewayPayment {
                        order_id: body.razorpay_order_id,
                        payment_id: body.razorpay_payment_id,
                        signature: body.razorpay_signature,
                    },
                    amount_paise: gateway_order.amount,
                },
                notes: body.notes,
            },
        )
        .await?;

    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number,
        "Paid order placed"
    );
    Ok(ApiResponse::created(order).with_message("Payment verified and order placed"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_receipt_fits_gateway_limit() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let receipt = receipt_for(123_456, at);
        assert!(receipt.starts_with("rcpt_123456_"));
        assert!(receipt.len() <= 40);
    }

    #[test]
    fn test_verify_request_shape() {
        let body: VerifyRequest = serde_json::from_value(serde_json::json!({
            "razorpayOrderId": "order_Nx1",
            "razorpayPaymentId": "pay_Nx1",
            "razorpaySignature": "abc",
            "shippingAddressId": 9,
        }))
        .unwrap();
        assert_eq!(body.razorpay_order_id, "order_Nx1");
        assert_eq!(body.shipping_address_id.as_i32(), 9);
        assert!(body.notes.is_none());
    }
}
