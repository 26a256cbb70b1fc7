//! Domain models for storefront.

pub mod order;
pub mod session;

pub use order::{Address, CheckoutRequest, Customer, Order, PaymentMethod};
pub use session::keys as session_keys;
