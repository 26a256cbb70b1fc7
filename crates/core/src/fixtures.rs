//! The built-in static catalog.
//!
//! Used by the storefront when no database is configured (or it is
//! unreachable) and by `liahna-cli seed` to populate a fresh database.

use crate::product::Product;

const PRODUCTS_JSON: &str = include_str!("../fixtures/products.json");

/// Parse the bundled product list.
///
/// # Errors
///
/// Returns an error if the bundled JSON does not match [`Product`].
pub fn fixture_products() -> Result<Vec<Product>, serde_json::Error> {
    serde_json::from_str(PRODUCTS_JSON)
}

/// Look up a bundled product by slug.
///
/// # Errors
///
/// Returns an error if the bundled JSON does not match [`Product`].
pub fn fixture_by_slug(slug: &str) -> Result<Option<Product>, serde_json::Error> {
    Ok(fixture_products()?.into_iter().find(|p| p.slug == slug))
}
