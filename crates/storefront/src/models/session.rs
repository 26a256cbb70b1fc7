//! Session-related types.

/// Session keys for visitor state.
pub mod keys {
    /// Key for the persisted cart envelope.
    pub const CART: &str = liahna_core::cart::CART_STORAGE_KEY;

    /// Key for the most recently placed order.
    pub const LAST_ORDER: &str = "liahna-order";

    /// Key for the id of the most recently placed order.
    pub const LAST_ORDER_ID: &str = "liahna-last-order-id";
}
