//! Shopping cart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use casawood_core::{CartId, CartItemId, FabricId, LineAmounts, ProductId, UserId};

/// Who a cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOwner {
    User(UserId),
    /// Client-generated identifier sent in `x-guest-id`.
    Guest(String),
}

impl std::fmt::Display for CartOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Guest(id) => write!(f, "guest:{id}"),
        }
    }
}

/// A cart line joined with the product (and fabric) it refers to.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(skip)]
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub fabric_id: Option<FabricId>,
    pub variant: Option<String>,
    pub quantity: i32,
    /// Price when the line was added.
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub saved_for_later: bool,
    pub added_at: DateTime<Utc>,
    pub product_name: String,
    pub product_slug: String,
    pub product_image: Option<String>,
    pub product_in_stock: bool,
    pub fabric_name: Option<String>,
}

impl CartItem {
    #[must_use]
    pub fn line_amounts(&self) -> LineAmounts {
        LineAmounts {
            price: self.price,
            original_price: self.original_price,
            quantity: u32::try_from(self.quantity).unwrap_or(0),
        }
    }
}

/// Cart as returned to clients: active lines and the saved-for-later list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub saved_for_later: Vec<CartItem>,
    pub subtotal: Decimal,
    /// Sum of quantities over active lines.
    pub item_count: i64,
}

impl CartView {
    #[must_use]
    pub fn empty() -> Self {
        Self::from_items(Vec::new())
    }

    /// Split lines into active and saved, and total the active ones.
    #[must_use]
    pub fn from_items(lines: Vec<CartItem>) -> Self {
        let (saved_for_later, items): (Vec<_>, Vec<_>) =
            lines.into_iter().partition(|l| l.saved_for_later);

        let subtotal = items.iter().map(|l| l.line_amounts().line_total()).sum();
        let item_count = items.iter().map(|l| i64::from(l.quantity)).sum();

        Self {
            items,
            saved_for_later,
            subtotal,
            item_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, price: i64, quantity: i32, saved: bool) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            cart_id: CartId::new(1),
            product_id: ProductId::new(id),
            fabric_id: None,
            variant: None,
            quantity,
            price: Decimal::from(price),
            original_price: None,
            saved_for_later: saved,
            added_at: Utc::now(),
            product_name: format!("Product {id}"),
            product_slug: format!("product-{id}"),
            product_image: None,
            product_in_stock: true,
            fabric_name: None,
        }
    }

    #[test]
    fn test_view_excludes_saved_items_from_totals() {
        let view = CartView::from_items(vec![
            item(1, 12_000, 2, false),
            item(2, 3_500, 1, false),
            item(3, 80_000, 1, true),
        ]);

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.saved_for_later.len(), 1);
        assert_eq!(view.subtotal, Decimal::from(27_500));
        assert_eq!(view.item_count, 3);
    }

    #[test]
    fn test_empty_view() {
        let view = CartView::empty();
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal, Decimal::ZERO);
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_owner_display() {
        assert_eq!(CartOwner::User(UserId::new(7)).to_string(), "user:7");
        assert_eq!(CartOwner::Guest("g-1".into()).to_string(), "guest:g-1");
    }
}
