//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Cached product list and catalog queries
//! - `cart` - Session-held cart with per-session mutation locks
//! - `checkout` - Order placement from the session cart

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use cart::{CartCommand, CartLocks, CartService, SessionCartStore};
pub use catalog::{CatalogError, CatalogService, CatalogSource};
pub use checkout::{CheckoutError, place_order};
