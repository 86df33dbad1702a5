//! Order routes.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
};
use serde::Deserialize;
use tracing::instrument;

use casawood_core::{AddressId, OrderId, OrderStatus, PaymentMethod, PaymentStatus};

use super::parse_id;
use crate::db::orders::OrderRepository;
use crate::db::{Page, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::Order;
use crate::response::ApiResponse;
use crate::services::checkout::{CheckoutService, Payment, PlaceOrder};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// The caller's orders, newest first.
///
/// GET /api/orders, GET /api/users/orders
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    query: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<Order>>> {
    let Query(query) = query?;
    let page = Page::new(query.page, query.limit);

    let (orders, total) = OrderRepository::new(state.pool())
        .list_for_user(user.id, page)
        .await?;
    Ok(ApiResponse::paginated(orders, page, total))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub shipping_address_id: AddressId,
    #[serde(default)]
    pub billing_address_id: Option<AddressId>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Place a cash-on-delivery order from the cart.
///
/// POST /api/orders
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<ApiResponse<Order>> {
    let Json(body) = body?;
    if body.payment_method != PaymentMethod::Cod {
        return Err(AppError::BadRequest(
            "Online payments must be completed through /api/payment".to_string(),
        ));
    }

    let order = CheckoutService::new(state.pool())
        .place(
            user.id,
            PlaceOrder {
                shipping_address_id: body.shipping_address_id,
                billing_address_id: body.billing_address_id,
                payment: Payment::CashOnDelivery,
                notes: body.notes,
            },
        )
        .await?;

    tracing::info!(order_id = %order.id, order_number = %order.order_number, "Order placed");
    Ok(ApiResponse::created(order).with_message("Order placed"))
}

/// One order. Admins may read any order.
///
/// GET /api/orders/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<Order>> {
    let id: OrderId = parse_id(&id, "Order")?;
    let owner = (!user.is_admin()).then_some(user.id);

    let order = OrderRepository::new(state.pool())
        .get(id, owner)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    Ok(ApiResponse::ok(order))
}

/// Cancel a pending or confirmed order.
///
/// PUT /api/orders/{id}/cancel
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<Order>> {
    let id: OrderId = parse_id(&id, "Order")?;

    let order = OrderRepository::new(state.pool())
        .cancel(id, user.id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order not found".to_string()),
            other => other.into(),
        })?
        .ok_or_else(|| AppError::BadRequest("Order cannot be cancelled".to_string()))?;

    Ok(ApiResponse::ok(order).with_message("Order cancelled"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    #[serde(default)]
    pub order_status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

/// Move an order through fulfilment.
///
/// PUT /api/orders/{id}/status
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    body: std::result::Result<Json<StatusRequest>, JsonRejection>,
) -> Result<ApiResponse<Order>> {
    let id: OrderId = parse_id(&id, "Order")?;
    let Json(body) = body?;
    if body.order_status.is_none() && body.payment_status.is_none() {
        return Err(AppError::BadRequest(
            "Provide orderStatus and/or paymentStatus".to_string(),
        ));
    }

    let order = OrderRepository::new(state.pool())
        .update_status(id, body.order_status, body.payment_status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order not found".to_string()),
            other => other.into(),
        })?;

    tracing::info!(
        order_id = %order.id,
        order_status = %order.order_status,
        payment_status = %order.payment_status,
        "Order status updated"
    );
    Ok(ApiResponse::ok(order).with_message("Order status updated"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_parses_cod() {
        let body: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "shippingAddressId": 3,
            "paymentMethod": "cod",
        }))
        .unwrap();
        assert_eq!(body.payment_method, PaymentMethod::Cod);
        assert_eq!(body.shipping_address_id.as_i32(), 3);
        assert!(body.billing_address_id.is_none());
    }

    #[test]
    fn test_status_request_accepts_either_field() {
        let body: StatusRequest =
            serde_json::from_value(serde_json::json!({"orderStatus": "shipped"})).unwrap();
        assert_eq!(body.order_status, Some(OrderStatus::Shipped));
        assert!(body.payment_status.is_none());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let parsed = serde_json::from_value::<StatusRequest>(serde_json::json!({"orderStatus": "lost"}));
        assert!(parsed.is_err());
    }
}
