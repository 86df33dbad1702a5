//! Order placement from the caller's cart.
//!
//! Cash-on-delivery orders and verified online payments go through the same
//! path: load the active cart lines, check the shipping address belongs to
//! the user, snapshot the lines, compute totals, then insert the order and
//! remove the consumed lines in one transaction.
//!
//! An online payment is only accepted when the gateway charged exactly the
//! total computed from the cart at placement time.

use sqlx::PgPool;
use thiserror::Error;

use casawood_core::{
    AddressId, CheckoutTotals, DeliveryPolicy, OrderStatus, PaymentMethod, PaymentStatus, UserId,
};

use crate::db::RepositoryError;
use crate::db::addresses::AddressRepository;
use crate::db::carts::CartRepository;
use crate::db::orders::OrderRepository;
use crate::models::{Address, CartItem, CartOwner, GatewayPayment, NewOrder, Order, OrderItem};

/// Reasons a checkout can't proceed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("address not found")]
    AddressNotFound,

    #[error("{0} is out of stock")]
    OutOfStock(String),

    #[error("paid {paid} paise but the order total is {due:?} paise")]
    AmountMismatch { paid: i64, due: Option<i64> },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// How an order is being paid for.
#[derive(Debug, Clone)]
pub enum Payment {
    CashOnDelivery,
    /// Gateway payment whose signature and ownership were already verified.
    Online {
        payment: GatewayPayment,
        /// Amount the gateway order charged, in paise.
        amount_paise: i64,
    },
}

/// Check a gateway charge against the order total.
///
/// # Errors
///
/// Returns `CheckoutError::AmountMismatch` unless `paid_paise` equals the
/// total in paise.
pub fn ensure_amount_paid(totals: &CheckoutTotals, paid_paise: i64) -> Result<(), CheckoutError> {
    let due = totals.amount_in_paise();
    if due == Some(paid_paise) {
        Ok(())
    } else {
        Err(CheckoutError::AmountMismatch {
            paid: paid_paise,
            due,
        })
    }
}

/// A request to turn the cart into an order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub shipping_address_id: AddressId,
    pub billing_address_id: Option<AddressId>,
    pub payment: Payment,
    pub notes: Option<String>,
}

/// Priced cart contents for a given shipping address.
#[derive(Debug, Clone)]
pub struct CheckoutQuote {
    pub lines: Vec<CartItem>,
    pub shipping_address: Address,
    pub totals: CheckoutTotals,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    policy: DeliveryPolicy,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            policy: DeliveryPolicy::default(),
        }
    }

    /// Price the user's active cart lines for delivery to `shipping_address_id`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if there are no active lines,
    /// `CheckoutError::AddressNotFound` if the address isn't the user's and
    /// `CheckoutError::OutOfStock` if any product sold out since it was added.
    pub async fn quote(
        &self,
        user_id: UserId,
        shipping_address_id: AddressId,
    ) -> Result<CheckoutQuote, CheckoutError> {
        let view = CartRepository::new(self.pool)
            .view(&CartOwner::User(user_id))
            .await?;
        if view.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if let Some(line) = view.items.iter().find(|l| !l.product_in_stock) {
            return Err(CheckoutError::OutOfStock(line.product_name.clone()));
        }

        let shipping_address = AddressRepository::new(self.pool)
            .get(user_id, shipping_address_id)
            .await?
            .ok_or(CheckoutError::AddressNotFound)?;

        let amounts: Vec<_> = view.items.iter().map(CartItem::line_amounts).collect();
        let totals = CheckoutTotals::compute(&amounts, &self.policy);

        Ok(CheckoutQuote {
            lines: view.items,
            shipping_address,
            totals,
        })
    }

    /// Place an order from the user's cart.
    ///
    /// # Errors
    ///
    /// Same as [`Self::quote`], plus `CheckoutError::AddressNotFound` for a
    /// foreign billing address and repository conflicts from placement.
    pub async fn place(&self, user_id: UserId, request: PlaceOrder) -> Result<Order, CheckoutError> {
        let quote = self.quote(user_id, request.shipping_address_id).await?;

        if let Payment::Online { amount_paise, .. } = &request.payment {
            ensure_amount_paid(&quote.totals, *amount_paise).inspect_err(|e| {
                tracing::warn!(%user_id, error = %e, "Paid amount does not match cart total");
            })?;
        }

        if let Some(billing_id) = request.billing_address_id {
            AddressRepository::new(self.pool)
                .get(user_id, billing_id)
                .await?
                .ok_or(CheckoutError::AddressNotFound)?;
        }

        let (payment_method, payment_status, order_status, gateway) = match request.payment {
            Payment::CashOnDelivery => (
                PaymentMethod::Cod,
                PaymentStatus::Pending,
                OrderStatus::Pending,
                None,
            ),
            Payment::Online { payment, .. } => (
                PaymentMethod::Online,
                PaymentStatus::Paid,
                OrderStatus::Confirmed,
                Some(payment),
            ),
        };

        let new = NewOrder {
            user_id,
            items: quote.lines.iter().map(OrderItem::from).collect(),
            totals: quote.totals,
            shipping_address_id: request.shipping_address_id,
            billing_address_id: request.billing_address_id,
            shipping_address: (&quote.shipping_address).into(),
            payment_method,
            payment_status,
            order_status,
            gateway,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
        };
        let consumed: Vec<_> = quote.lines.iter().map(|l| l.id).collect();

        let order = OrderRepository::new(self.pool).place(&new, &consumed).await?;
        Ok(order)
    }
}
