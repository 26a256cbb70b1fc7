//! The catalog product record.
//!
//! Products are produced by the admin (database) or by the static fixture
//! set and are consumed read-only by the catalog queries and the cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::ProductSnapshot;
use crate::types::{Category, Money, ProductId, percent_off};

/// Placeholder image used when a product or cart line has none.
pub const FALLBACK_PRODUCT_IMAGE: &str = "/brand/mood-collection.png";

/// Price a product actually sells for.
///
/// The promo price applies only when present and strictly lower than the
/// base price.
#[must_use]
pub fn effective_price(price: Money, promo_price: Option<Money>) -> Money {
    match promo_price {
        Some(promo) if promo < price => promo,
        _ => price,
    }
}

/// A product as shown on the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    /// Human-readable unique key used in URLs.
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: Vec<String>,
    /// Base price.
    pub price: Money,
    /// Promotional price. Producers guarantee it is below `price`.
    #[serde(default)]
    pub promo_price: Option<Money>,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    /// Image URLs; the first one is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    pub in_stock: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Promo-aware selling price.
    #[must_use]
    pub fn effective_price(&self) -> Money {
        effective_price(self.price, self.promo_price)
    }

    /// Rounded discount of the promotion, if one is lowering the price.
    #[must_use]
    pub fn percent_off(&self) -> Option<u8> {
        percent_off(self.price, self.effective_price())
    }

    /// The primary image, or the placeholder.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.images
            .first()
            .map_or(FALLBACK_PRODUCT_IMAGE, String::as_str)
    }

    /// Build the cart snapshot for this product.
    ///
    /// `image` is the gallery image the shopper was looking at; it is only
    /// used if it belongs to this product, otherwise the primary image is
    /// snapshotted.
    #[must_use]
    pub fn snapshot(&self, variant: Option<String>, image: Option<&str>) -> ProductSnapshot {
        let image = image
            .filter(|chosen| self.images.iter().any(|url| url == chosen))
            .unwrap_or_else(|| self.primary_image());

        ProductSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            promo_price: self.promo_price,
            image: Some(image.to_string()),
            slug: Some(self.slug.clone()),
            variant,
            original_price: None,
        }
    }
}
