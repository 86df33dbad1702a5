//! Order repository.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use casawood_core::{CartItemId, OrderId, OrderNumber, OrderStatus, PaymentStatus, UserId};

use super::{Page, RepositoryError};
use crate::models::{NewOrder, Order};

const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";
const PAYMENT_ID_CONSTRAINT: &str = "orders_razorpay_payment_id_key";

/// Attempts at placing an order before giving up on order-number races.
const MAX_PLACEMENT_ATTEMPTS: i64 = 3;

/// Repository for placed orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and delete the cart lines it was built from, atomically.
    ///
    /// The order number is derived from the current order count. When a
    /// concurrent checkout takes the same number the whole placement is
    /// retried with the next one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the gateway payment was already
    /// used for another order, or if every attempt lost the number race.
    pub async fn place(
        &self,
        new: &NewOrder,
        consumed_lines: &[CartItemId],
    ) -> Result<Order, RepositoryError> {
        for attempt in 0..MAX_PLACEMENT_ATTEMPTS {
            let mut tx = self.pool.begin().await?;
            match insert_order(&mut tx, new, consumed_lines, attempt).await {
                Ok(order) => {
                    tx.commit().await?;
                    tracing::info!(
                        order_id = %order.id,
                        order_number = %order.order_number,
                        user_id = %order.user_id,
                        total = %order.total,
                        "Order placed"
                    );
                    return Ok(order);
                }
                Err(sqlx::Error::Database(db_err))
                    if db_err.constraint() == Some(ORDER_NUMBER_CONSTRAINT) =>
                {
                    tracing::warn!(attempt, "Order number taken, retrying");
                }
                Err(sqlx::Error::Database(db_err))
                    if db_err.constraint() == Some(PAYMENT_ID_CONSTRAINT) =>
                {
                    return Err(RepositoryError::Conflict(
                        "this payment has already been used for an order".to_owned(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RepositoryError::Conflict(
            "could not allocate an order number, please retry".to_owned(),
        ))
    }

    /// One page of the user's orders, newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: Page,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT * FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok((orders, total))
    }

    /// Fetch an order. With `owner` set, orders of other users are invisible.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: OrderId,
        owner: Option<UserId>,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = $1 AND ($2::integer IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;
        Ok(order)
    }

    /// Cancel one of the user's orders if it hasn't progressed yet.
    ///
    /// Returns `Ok(None)` when the order exists but can no longer be cancelled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order isn't the user's.
    pub async fn cancel(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let status: OrderStatus = sqlx::query_scalar(
            "SELECT order_status FROM orders WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if !status.is_cancellable() {
            return Ok(None);
        }

        let order = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders SET order_status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(OrderStatus::Cancelled)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(order_id = %id, %user_id, "Order cancelled");
        Ok(Some(order))
    }

    /// Set order and/or payment status; `None` leaves a field unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        order_status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(
            r"
            UPDATE orders SET
                order_status = COALESCE($2, order_status),
                payment_status = COALESCE($3, payment_status),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(order_status)
        .bind(payment_status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewOrder,
    consumed_lines: &[CartItemId],
    attempt: i64,
) -> Result<Order, sqlx::Error> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&mut **tx)
        .await?;
    let number = OrderNumber::generate(Utc::now().date_naive(), existing + attempt);

    let (gateway_order, gateway_payment, gateway_signature) = match &new.gateway {
        Some(g) => (
            Some(g.order_id.as_str()),
            Some(g.payment_id.as_str()),
            Some(g.signature.as_str()),
        ),
        None => (None, None, None),
    };

    let order = sqlx::query_as::<_, Order>(
        r"
        INSERT INTO orders (
            order_number, user_id, items, subtotal, discount, delivery_charges, total,
            shipping_address_id, billing_address_id, shipping_address,
            payment_method, payment_status, order_status,
            razorpay_order_id, razorpay_payment_id, razorpay_signature, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING *
        ",
    )
    .bind(number.as_str())
    .bind(new.user_id)
    .bind(Json(&new.items))
    .bind(new.totals.subtotal)
    .bind(new.totals.discount)
    .bind(new.totals.delivery_charges)
    .bind(new.totals.total)
    .bind(new.shipping_address_id)
    .bind(new.billing_address_id)
    .bind(Json(&new.shipping_address))
    .bind(new.payment_method)
    .bind(new.payment_status)
    .bind(new.order_status)
    .bind(gateway_order)
    .bind(gateway_payment)
    .bind(gateway_signature)
    .bind(&new.notes)
    .fetch_one(&mut **tx)
    .await?;

    let line_ids: Vec<i32> = consumed_lines.iter().map(CartItemId::as_i32).collect();
    sqlx::query("DELETE FROM cart_items WHERE id = ANY($1)")
        .bind(&line_ids)
        .execute(&mut **tx)
        .await?;

    Ok(order)
}
