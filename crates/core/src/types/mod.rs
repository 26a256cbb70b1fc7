//! Core types for Liahna.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod id;
pub mod list;
pub mod money;

pub use category::{Category, CategoryError};
pub use id::*;
pub use list::{deserialize_list, split_list};
pub use money::{CurrencyCode, Money, MoneyError, percent_off};
