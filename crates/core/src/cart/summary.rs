//! Order summary shown on the cart page.

use serde::Serialize;

use super::Cart;
use crate::types::Money;

/// Orders at or above this final total ship for free.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(18_000);

/// The single coupon the store accepts.
const COUPON_CODE: &str = "LIAHNA10";
const COUPON_PERCENT: u32 = 10;

/// Normalize a shopper-entered code; `None` if it is not a valid coupon.
#[must_use]
pub fn normalize_coupon(code: &str) -> Option<&'static str> {
    (code.trim().to_uppercase() == COUPON_CODE).then_some(COUPON_CODE)
}

/// Discount granted by `coupon` on an order total. Unknown codes give zero.
#[must_use]
pub fn coupon_discount(coupon: Option<&str>, total: Money) -> Money {
    match coupon.and_then(normalize_coupon) {
        Some(_) => total.non_negative().percent(COUPON_PERCENT),
        None => Money::ZERO,
    }
}

/// Amounts for the cart summary panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Sum of pre-promotion line amounts.
    pub subtotal: Money,
    /// Savings from promotional prices.
    pub discount: Money,
    /// Cart total before the coupon.
    pub total: Money,
    /// The applied coupon, if the entered code was valid.
    pub coupon: Option<&'static str>,
    pub coupon_discount: Money,
    /// `total - coupon_discount`, never negative.
    pub final_total: Money,
    pub item_count: i64,
    /// How much more is needed for free shipping; zero once reached.
    pub free_shipping_remaining: Money,
    /// Progress toward free shipping, 0 to 100.
    pub free_shipping_progress: u8,
}

impl CartSummary {
    /// Summarize `cart` with an optional shopper-entered coupon code.
    #[must_use]
    pub fn new(cart: &Cart, coupon: Option<&str>) -> Self {
        let totals = cart.totals();
        let coupon = coupon.and_then(normalize_coupon);
        let coupon_discount = coupon_discount(coupon, totals.total);
        let final_total = totals.total.saturating_sub(coupon_discount).non_negative();

        Self {
            subtotal: totals.subtotal,
            discount: totals.discount,
            total: totals.total,
            coupon,
            coupon_discount,
            final_total,
            item_count: cart.item_count(),
            free_shipping_remaining: FREE_SHIPPING_THRESHOLD
                .saturating_sub(final_total)
                .non_negative(),
            free_shipping_progress: shipping_progress(final_total),
        }
    }

    /// Whether the order ships for free.
    #[must_use]
    pub const fn free_shipping(&self) -> bool {
        self.free_shipping_remaining.is_zero()
    }
}

fn shipping_progress(final_total: Money) -> u8 {
    let threshold = FREE_SHIPPING_THRESHOLD.cents();
    let pct = final_total.cents().saturating_mul(100) / threshold;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=100
    let pct = pct.clamp(0, 100) as u8;
    pct
}
