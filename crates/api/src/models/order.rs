//! Orders and their immutable item snapshots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use casawood_core::{
    AddressId, CheckoutTotals, FabricId, OrderId, OrderStatus, PaymentMethod, PaymentStatus,
    ProductId, UserId,
};

use super::{AddressSnapshot, CartItem};

/// One line of a placed order, copied from the cart at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub fabric_id: Option<FabricId>,
    pub fabric_name: Option<String>,
    pub variant: Option<String>,
}

impl From<&CartItem> for OrderItem {
    fn from(line: &CartItem) -> Self {
        Self {
            product_id: line.product_id,
            name: line.product_name.clone(),
            image: line.product_image.clone(),
            quantity: line.quantity,
            price: line.price,
            original_price: line.original_price,
            fabric_id: line.fabric_id,
            fabric_name: line.fabric_name.clone(),
            variant: line.variant.clone(),
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub items: Json<Vec<OrderItem>>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery_charges: Decimal,
    pub total: Decimal,
    pub shipping_address_id: Option<AddressId>,
    pub billing_address_id: Option<AddressId>,
    pub shipping_address: Json<AddressSnapshot>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    #[serde(skip)]
    pub razorpay_signature: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Gateway references recorded on an order paid online.
#[derive(Debug, Clone)]
pub struct GatewayPayment {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Everything needed to insert an order, minus the order number.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub totals: CheckoutTotals,
    pub shipping_address_id: AddressId,
    pub billing_address_id: Option<AddressId>,
    pub shipping_address: AddressSnapshot,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub gateway: Option<GatewayPayment>,
    pub notes: Option<String>,
}
