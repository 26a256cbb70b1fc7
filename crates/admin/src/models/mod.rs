//! Domain models for admin.

pub mod product;
