//! Checkout arithmetic.
//!
//! Every path that prices an order goes through [`CheckoutTotals::compute`],
//! so the amount charged by the payment gateway and the amount stored on the
//! order cannot drift apart.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::to_paise;

/// Price snapshot of one cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    /// Unit price the customer pays.
    pub price: Decimal,
    /// List price before markdown, if the product was on sale.
    pub original_price: Option<Decimal>,
    pub quantity: u32,
}

impl LineAmounts {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Savings on this line; zero unless the original price is higher.
    #[must_use]
    pub fn line_discount(&self) -> Decimal {
        match self.original_price {
            Some(orig) if orig > self.price => (orig - self.price) * Decimal::from(self.quantity),
            _ => Decimal::ZERO,
        }
    }
}

/// Delivery fee rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Orders with a subtotal strictly above this ship free.
    pub free_delivery_above: Decimal,
    /// Fee charged otherwise.
    pub flat_fee: Decimal,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            free_delivery_above: Decimal::from(50_000),
            flat_fee: Decimal::from(500),
        }
    }
}

impl DeliveryPolicy {
    #[must_use]
    pub fn charge_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_delivery_above {
            Decimal::ZERO
        } else {
            self.flat_fee
        }
    }
}

/// Totals for a set of cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    /// Informational; already reflected in `subtotal`.
    pub discount: Decimal,
    pub delivery_charges: Decimal,
    pub total: Decimal,
}

impl CheckoutTotals {
    /// Price a list of lines.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use casawood_core::{CheckoutTotals, DeliveryPolicy, LineAmounts};
    ///
    /// let lines = [LineAmounts {
    ///     price: Decimal::from(12_000),
    ///     original_price: Some(Decimal::from(15_000)),
    ///     quantity: 2,
    /// }];
    /// let totals = CheckoutTotals::compute(&lines, &DeliveryPolicy::default());
    /// assert_eq!(totals.subtotal, Decimal::from(24_000));
    /// assert_eq!(totals.discount, Decimal::from(6_000));
    /// assert_eq!(totals.total, Decimal::from(24_500));
    /// ```
    #[must_use]
    pub fn compute(lines: &[LineAmounts], policy: &DeliveryPolicy) -> Self {
        let subtotal: Decimal = lines.iter().map(LineAmounts::line_total).sum();
        let discount: Decimal = lines.iter().map(LineAmounts::line_discount).sum();
        let delivery_charges = policy.charge_for(subtotal);

        Self {
            subtotal,
            discount,
            delivery_charges,
            total: subtotal + delivery_charges,
        }
    }

    /// Total in paise for the payment gateway.
    #[must_use]
    pub fn amount_in_paise(&self) -> Option<i64> {
        to_paise(self.total)
    }
}

/// Human-readable order number, `ORD-YYYY-MMDD-NNN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Build the number for the order placed after `existing_count` others.
    ///
    /// The sequence is zero-padded to three digits and grows past that.
    #[must_use]
    pub fn generate(date: NaiveDate, existing_count: i64) -> Self {
        let seq = existing_count.saturating_add(1);
        Self(format!(
            "ORD-{:04}-{:02}{:02}-{seq:03}",
            date.year(),
            date.month(),
            date.day()
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
