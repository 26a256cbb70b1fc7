//! Cart engine.
//!
//! A [`Cart`] is an ordered list of line items, one per product id. Prices
//! are snapshotted when a product is first added; adding the same product
//! again only bumps the quantity ("first price wins" for the session).
//!
//! # Modules
//!
//! - [`schema`] - Persisted envelope, known schema versions and migration
//! - [`store`] - The [`CartStore`] persistence trait and [`CartHandle`]
//! - [`summary`] - Coupon and free-shipping summary for the cart page

pub mod schema;
pub mod store;
pub mod summary;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::product::{FALLBACK_PRODUCT_IMAGE, effective_price};
use crate::types::{Money, ProductId};

pub use schema::{
    CART_STORAGE_KEY, CURRENT_SCHEMA_VERSION, CartSchema, LegacyLineItem, LoadOutcome,
    PersistedCart, ResetReason, SchemaError, load_cart,
};
pub use store::{CartHandle, CartStore, CartStoreError};
pub use summary::{CartSummary, FREE_SHIPPING_THRESHOLD, coupon_discount, normalize_coupon};

/// One row of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product id; the merge key for repeated adds.
    pub id: ProductId,
    /// Display name at the time of the add.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Effective unit price captured at add time.
    pub price: Money,
    /// Pre-promotion unit price. Never below `price` for lines built here.
    pub original_price: Money,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Fields written by other schema revisions, carried through untouched.
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl CartLineItem {
    /// `price × quantity`, with negative quantities counted as zero.
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// What the storefront knows about a product when it is added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub promo_price: Option<Money>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    /// Explicit pre-promotion reference price; defaults to `price`.
    #[serde(default)]
    pub original_price: Option<Money>,
}

/// Derived cart amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of pre-promotion line amounts.
    pub subtotal: Money,
    /// `subtotal - total`, never negative.
    pub discount: Money,
    /// Sum of effective line amounts.
    pub total: Money,
}

/// The cart aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a cart from stored lines, keeping their order.
    #[must_use]
    pub const fn from_items(items: Vec<CartLineItem>) -> Self {
        Self { items }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line only has its quantity incremented; name, prices and
    /// image stay as first captured. Otherwise a new line is appended with
    /// the promo-aware price. Inputs are not validated.
    pub fn add_item(&mut self, product: ProductSnapshot, quantity: i64) {
        if let Some(existing) = self.items.iter_mut().find(|item| item.id == product.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return;
        }

        let price = effective_price(product.price, product.promo_price);
        let original_price = product.original_price.unwrap_or(product.price);

        self.items.push(CartLineItem {
            id: product.id,
            name: product.name,
            slug: product.slug,
            price,
            original_price,
            quantity,
            image: Some(
                product
                    .image
                    .unwrap_or_else(|| FALLBACK_PRODUCT_IMAGE.to_string()),
            ),
            variant: product.variant,
            extra: BTreeMap::new(),
        });
    }

    /// Remove the line for `id`. Absent ids are ignored.
    pub fn remove_item(&mut self, id: &ProductId) {
        self.items.retain(|item| &item.id != id);
    }

    /// Replace the quantity of a line; `quantity <= 0` removes it.
    pub fn update_qty(&mut self, id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| &item.id == id) {
            item.quantity = quantity;
        }
    }

    /// Empty the cart (after an order is placed).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Subtotal, discount and total.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        let subtotal: Money = self
            .items
            .iter()
            .map(|item| item.original_price.times(item.quantity))
            .sum();
        let total: Money = self.items.iter().map(CartLineItem::line_total).sum();

        CartTotals {
            subtotal,
            discount: subtotal.saturating_sub(total).non_negative(),
            total,
        }
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.quantity.max(0))
            .fold(0, i64::saturating_add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn snapshot(id: &str, price: i64, promo: Option<i64>) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Produto {id}"),
            price: Money::from_cents(price),
            promo_price: promo.map(Money::from_cents),
            image: None,
            slug: Some(id.to_string()),
            variant: None,
            original_price: None,
        }
    }

    #[test]
    fn test_add_new_line_uses_promo_price() {
        let mut cart = Cart::new();
        cart.add_item(snapshot("a", 4200, Some(3600)), 1);

        let line = cart.line(&ProductId::new("a")).unwrap();
        assert_eq!(line.price, Money::from_cents(3600));
        assert_eq!(line.original_price, Money::from_cents(4200));
        assert_eq!(line.quantity, 1);
        assert_eq!(line.image.as_deref(), Some(FALLBACK_PRODUCT_IMAGE));
    }

    #[test]
    fn test_add_respects_explicit_original_price() {
        let mut cart = Cart::new();
        let mut product = snapshot("a", 10_000, None);
        product.original_price = Some(Money::from_cents(12_000));
        cart.add_item(product, 1);

        let line = cart.line(&ProductId::new("a")).unwrap();
        assert_eq!(line.price, Money::from_cents(10_000));
        assert_eq!(line.original_price, Money::from_cents(12_000));
    }

    #[test]
    fn test_repeat_add_merges_and_keeps_first_price() {
        let mut cart = Cart::new();
        cart.add_item(snapshot("a", 4200, Some(3600)), 2);
        // Catalog price changed between adds.
        cart.add_item(snapshot("a", 5000, None), 3);

        assert_eq!(cart.items().len(), 1);
        let line = cart.line(&ProductId::new("a")).unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(line.price, Money::from_cents(3600));
        assert_eq!(line.original_price, Money::from_cents(4200));
    }

    #[test]
    fn test_new_lines_append_in_order() {
        let mut cart = Cart::new();
        cart.add_item(snapshot("b", 100, None), 1);
        cart.add_item(snapshot("a", 100, None), 1);
        cart.add_item(snapshot("b", 100, None), 1);

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_update_qty_non_positive_removes_like_remove_item() {
        for quantity in [0, -5] {
            let mut updated = Cart::new();
            updated.add_item(snapshot("a", 100, None), 2);
            updated.add_item(snapshot("b", 100, None), 1);
            let mut removed = updated.clone();

            updated.update_qty(&ProductId::new("a"), quantity);
            removed.remove_item(&ProductId::new("a"));

            assert!(updated.line(&ProductId::new("a")).is_none());
            assert_eq!(updated, removed);
        }
    }

    #[test]
    fn test_update_qty_replaces_quantity() {
        let mut cart = Cart::new();
        cart.add_item(snapshot("a", 100, None), 2);
        cart.update_qty(&ProductId::new("a"), 7);
        assert_eq!(cart.line(&ProductId::new("a")).unwrap().quantity, 7);
    }

    #[test]
    fn test_missing_ids_are_no_ops() {
        let mut cart = Cart::new();
        cart.add_item(snapshot("a", 100, None), 1);
        let before = cart.clone();

        cart.remove_item(&ProductId::new("zzz"));
        cart.update_qty(&ProductId::new("zzz"), 4);

        assert_eq!(cart, before);
    }

    #[test]
    fn test_totals_end_to_end() {
        let mut product = snapshot("x", 10_000, None);
        product.original_price = Some(Money::from_cents(12_000));
        let mut cart = Cart::new();
        cart.add_item(product, 2);

        assert_eq!(
            cart.totals(),
            CartTotals {
                subtotal: Money::from_cents(24_000),
                discount: Money::from_cents(4_000),
                total: Money::from_cents(20_000),
            }
        );
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_discount_never_negative_and_consistent() {
        let mut cart = Cart::new();
        cart.add_item(snapshot("a", 4200, Some(3600)), 3);
        cart.add_item(snapshot("b", 2800, None), 1);
        cart.update_qty(&ProductId::new("b"), 4);
        cart.add_item(snapshot("a", 4200, Some(3600)), 1);
        cart.remove_item(&ProductId::new("b"));

        let totals = cart.totals();
        assert!(totals.discount >= Money::ZERO);
        assert_eq!(
            totals.discount,
            totals.subtotal.saturating_sub(totals.total).non_negative()
        );
        assert!(totals.total <= totals.subtotal);
    }

    #[test]
    fn test_inconsistent_lines_clamp_discount_and_quantity() {
        // Data restored from storage can break the usual invariants.
        let cart = Cart::from_items(vec![
            CartLineItem {
                id: ProductId::new("a"),
                name: "A".into(),
                slug: None,
                price: Money::from_cents(5000),
                original_price: Money::from_cents(4000),
                quantity: 1,
                image: None,
                variant: None,
                extra: BTreeMap::new(),
            },
            CartLineItem {
                id: ProductId::new("b"),
                name: "B".into(),
                slug: None,
                price: Money::from_cents(1000),
                original_price: Money::from_cents(1000),
                quantity: -3,
                image: None,
                variant: None,
                extra: BTreeMap::new(),
            },
        ]);

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Money::from_cents(4000));
        assert_eq!(totals.total, Money::from_cents(5000));
        assert_eq!(totals.discount, Money::ZERO);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(snapshot("a", 100, None), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
        assert_eq!(cart.item_count(), 0);
    }
}
