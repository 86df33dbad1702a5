//! Cart repository.
//!
//! A cart belongs to exactly one user or one guest id. Lines are unique per
//! (product, fabric, variant, saved flag); adding a duplicate line bumps the
//! quantity instead. Quantities never exceed [`MAX_LINE_QUANTITY`].

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use casawood_core::{CartId, CartItemId, FabricId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CartItem, CartOwner, CartView};

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 99;

const ITEM_SELECT: &str = r"
    SELECT ci.id, ci.cart_id, ci.product_id, ci.fabric_id, ci.variant, ci.quantity,
           ci.price, ci.original_price, ci.saved_for_later, ci.added_at,
           p.name AS product_name, p.slug AS product_slug, p.images[1] AS product_image,
           p.in_stock AS product_in_stock, f.name AS fabric_name
    FROM cart_items ci
    JOIN products p ON p.id = ci.product_id
    LEFT JOIN fabrics f ON f.id = ci.fabric_id
";

/// A line to add to a cart, with prices snapshotted from the product.
#[derive(Debug, Clone)]
pub struct NewCartLine {
    pub product_id: ProductId,
    pub fabric_id: Option<FabricId>,
    pub variant: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
}

/// Repository for carts and their lines.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The owner's cart id, if they have one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, owner: &CartOwner) -> Result<Option<CartId>, RepositoryError> {
        let id = match owner {
            CartOwner::User(user_id) => {
                sqlx::query_scalar::<_, CartId>("SELECT id FROM carts WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_optional(self.pool)
                    .await?
            }
            CartOwner::Guest(guest_id) => {
                sqlx::query_scalar::<_, CartId>("SELECT id FROM carts WHERE guest_id = $1")
                    .bind(guest_id)
                    .fetch_optional(self.pool)
                    .await?
            }
        };
        Ok(id)
    }

    /// The owner's cart id, creating an empty cart on first use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, owner: &CartOwner) -> Result<CartId, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id = get_or_create_in(&mut tx, owner).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// All lines of a cart, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let sql = format!("{ITEM_SELECT} WHERE ci.cart_id = $1 ORDER BY ci.added_at, ci.id");
        let items = sqlx::query_as::<_, CartItem>(&sql)
            .bind(cart_id)
            .fetch_all(self.pool)
            .await?;
        Ok(items)
    }

    /// The owner's cart view; empty when they have no cart yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn view(&self, owner: &CartOwner) -> Result<CartView, RepositoryError> {
        match self.find(owner).await? {
            Some(cart_id) => Ok(CartView::from_items(self.items(cart_id).await?)),
            None => Ok(CartView::empty()),
        }
    }

    /// Add a line, or increase the quantity of the matching active line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_item(&self, cart_id: CartId, line: &NewCartLine) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing = matching_line(
            &mut tx,
            cart_id,
            line.product_id,
            line.fabric_id,
            line.variant.as_deref(),
            false,
        )
        .await?;
        match existing {
            Some((item_id, _)) => {
                add_quantity(&mut tx, item_id, line.quantity).await?;
            }
            None => {
                sqlx::query(
                    r"
                    INSERT INTO cart_items (cart_id, product_id, fabric_id, variant, quantity, price, original_price)
                    VALUES ($1, $2, $3, $4, LEAST($5, $6), $7, $8)
                    ",
                )
                .bind(cart_id)
                .bind(line.product_id)
                .bind(line.fabric_id)
                .bind(&line.variant)
                .bind(line.quantity)
                .bind(MAX_LINE_QUANTITY)
                .bind(line.price)
                .bind(line.original_price)
                .execute(&mut *tx)
                .await?;
            }
        }

        touch(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Set the quantity of an active line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line isn't an active line of this cart.
    pub async fn set_quantity(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cart_items SET quantity = $3
            WHERE id = $1 AND cart_id = $2 AND NOT saved_for_later
            ",
        )
        .bind(item_id)
        .bind(cart_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove a line from the active list (`saved = false`) or the saved list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line isn't in that list.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        saved: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM cart_items WHERE id = $1 AND cart_id = $2 AND saved_for_later = $3",
        )
        .bind(item_id)
        .bind(cart_id)
        .bind(saved)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Move a line between the active and saved lists, merging it into a
    /// matching line already on the other side.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line isn't on the `from_saved` side.
    pub async fn move_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        from_saved: bool,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let item: (ProductId, Option<FabricId>, Option<String>, i32) = sqlx::query_as(
            r"
            SELECT product_id, fabric_id, variant, quantity FROM cart_items
            WHERE id = $1 AND cart_id = $2 AND saved_for_later = $3
            FOR UPDATE
            ",
        )
        .bind(item_id)
        .bind(cart_id)
        .bind(from_saved)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        let (product_id, fabric_id, variant, quantity) = item;

        let target = matching_line(&mut tx, cart_id, product_id, fabric_id, variant.as_deref(), !from_saved).await?;
        if let Some((target_id, _)) = target {
            add_quantity(&mut tx, target_id, quantity).await?;
            sqlx::query("DELETE FROM cart_items WHERE id = $1")
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query("UPDATE cart_items SET saved_for_later = $2 WHERE id = $1")
                .bind(item_id)
                .bind(!from_saved)
                .execute(&mut *tx)
                .await?;
        }

        touch(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Remove every active line; saved lines stay.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_active(&self, cart_id: CartId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND NOT saved_for_later")
            .bind(cart_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Fold a guest cart into the user's cart and delete the guest cart.
    ///
    /// Matching lines (same product, fabric, variant and list) sum their
    /// quantities; other lines move across unchanged. Returns the number of
    /// guest lines processed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn merge_guest(&self, guest_id: &str, user_id: UserId) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let guest_cart: Option<CartId> =
            sqlx::query_scalar("SELECT id FROM carts WHERE guest_id = $1 FOR UPDATE")
                .bind(guest_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(guest_cart) = guest_cart else {
            return Ok(0);
        };

        let user_cart = get_or_create_in(&mut tx, &CartOwner::User(user_id)).await?;

        let lines: Vec<(CartItemId, ProductId, Option<FabricId>, Option<String>, i32, bool)> =
            sqlx::query_as(
                r"
                SELECT id, product_id, fabric_id, variant, quantity, saved_for_later
                FROM cart_items WHERE cart_id = $1
                ORDER BY added_at, id
                ",
            )
            .bind(guest_cart)
            .fetch_all(&mut *tx)
            .await?;

        for (item_id, product_id, fabric_id, variant, quantity, saved) in &lines {
            let target = matching_line(&mut tx, user_cart, *product_id, *fabric_id, variant.as_deref(), *saved).await?;
            if let Some((target_id, _)) = target {
                add_quantity(&mut tx, target_id, *quantity).await?;
            } else {
                sqlx::query("UPDATE cart_items SET cart_id = $2 WHERE id = $1")
                    .bind(item_id)
                    .bind(user_cart)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        // Cascades to any lines that were merged rather than moved
        sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(guest_cart)
            .execute(&mut *tx)
            .await?;
        touch(&mut tx, user_cart).await?;

        tx.commit().await?;
        tracing::info!(%user_id, lines = lines.len(), "Merged guest cart");
        Ok(lines.len())
    }
}

async fn get_or_create_in(
    tx: &mut Transaction<'_, Postgres>,
    owner: &CartOwner,
) -> Result<CartId, RepositoryError> {
    let id = match owner {
        CartOwner::User(user_id) => {
            sqlx::query_scalar::<_, CartId>(
                r"
                INSERT INTO carts (user_id) VALUES ($1)
                ON CONFLICT (user_id) DO UPDATE SET updated_at = now()
                RETURNING id
                ",
            )
            .bind(user_id)
            .fetch_one(&mut **tx)
            .await?
        }
        CartOwner::Guest(guest_id) => {
            sqlx::query_scalar::<_, CartId>(
                r"
                INSERT INTO carts (guest_id) VALUES ($1)
                ON CONFLICT (guest_id) DO UPDATE SET updated_at = now()
                RETURNING id
                ",
            )
            .bind(guest_id)
            .fetch_one(&mut **tx)
            .await?
        }
    };
    Ok(id)
}

/// Find the line in `cart_id` with the same product, fabric and variant on
/// the given side (active or saved).
async fn matching_line(
    tx: &mut Transaction<'_, Postgres>,
    cart_id: CartId,
    product_id: ProductId,
    fabric_id: Option<FabricId>,
    variant: Option<&str>,
    saved: bool,
) -> Result<Option<(CartItemId, i32)>, RepositoryError> {
    let line = sqlx::query_as::<_, (CartItemId, i32)>(
        r"
        SELECT id, quantity FROM cart_items
        WHERE cart_id = $1
          AND product_id = $2
          AND fabric_id IS NOT DISTINCT FROM $3
          AND variant IS NOT DISTINCT FROM $4
          AND saved_for_later = $5
        LIMIT 1
        FOR UPDATE
        ",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(fabric_id)
    .bind(variant)
    .bind(saved)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(line)
}

async fn add_quantity(
    tx: &mut Transaction<'_, Postgres>,
    item_id: CartItemId,
    extra: i32,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE cart_items SET quantity = LEAST(quantity + $2, $3) WHERE id = $1")
        .bind(item_id)
        .bind(extra)
        .bind(MAX_LINE_QUANTITY)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn touch(tx: &mut Transaction<'_, Postgres>, cart_id: CartId) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE carts SET updated_at = now() WHERE id = $1")
        .bind(cart_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
