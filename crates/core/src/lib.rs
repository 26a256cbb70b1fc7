//! Liahna Core - Shared types, cart engine and catalog queries.
//!
//! This crate provides the pieces used across all Liahna components:
//! - `storefront` - Public catalog, cart and checkout API
//! - `admin` - Back-office product management API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and traits - no I/O,
//! no database access, no HTTP. Persistence is reached through the
//! [`cart::CartStore`] trait, implemented by the surrounding application.
//!
//! # Modules
//!
//! - [`types`] - Money, type-safe IDs, categories and list-field helpers
//! - [`product`] - The catalog product record
//! - [`cart`] - Cart engine, persisted schema versions and the cart handle
//! - [`catalog`] - Filtering, sorting and pagination over product lists
//! - [`fixtures`] - The built-in static catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod fixtures;
pub mod product;
pub mod types;

pub use product::{FALLBACK_PRODUCT_IMAGE, Product, effective_price};
pub use types::*;
