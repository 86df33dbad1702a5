//! Money helpers.
//!
//! All catalog and order amounts are `rust_decimal::Decimal` rupees. The
//! payment gateway works in integer paise.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// ISO 4217 code for every amount in the store.
pub const CURRENCY_CODE: &str = "INR";

/// Convert a rupee amount to paise, rounding half away from zero.
///
/// Returns `None` if the amount does not fit in an `i64`.
///
/// ```
/// use rust_decimal::Decimal;
/// use casawood_core::to_paise;
///
/// assert_eq!(to_paise(Decimal::new(1249950, 2)), Some(1_249_950));
/// ```
#[must_use]
pub fn to_paise(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
