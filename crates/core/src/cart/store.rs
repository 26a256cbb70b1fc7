//! Durable cart storage.
//!
//! [`CartStore`] is the persistence seam: the storefront implements it on top
//! of the HTTP session, tests use an in-memory map. [`CartHandle`] wraps a
//! [`Cart`] and writes it back after every mutation.

use std::future::Future;

use serde_json::Value;
use tracing::warn;

use super::schema::{LoadOutcome, PersistedCart, ResetReason, load_cart};
use super::{Cart, CartTotals, ProductSnapshot};
use crate::types::ProductId;

/// Errors from a cart storage backend.
#[derive(thiserror::Error, Debug)]
pub enum CartStoreError {
    #[error("cart storage backend error: {0}")]
    Backend(String),

    #[error("cart serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single durable slot holding one shopper's cart.
pub trait CartStore {
    /// Read the raw persisted blob, if any.
    fn load(&self) -> impl Future<Output = Result<Option<Value>, CartStoreError>> + Send;

    /// Overwrite the slot.
    fn save(&self, cart: &PersistedCart)
    -> impl Future<Output = Result<(), CartStoreError>> + Send;
}

/// A cart bound to its store.
#[derive(Debug)]
pub struct CartHandle<S> {
    store: S,
    cart: Cart,
}

impl<S: CartStore + Sync> CartHandle<S> {
    /// Restore the cart from `store`.
    ///
    /// Never fails: a backend error or unusable data starts an empty cart.
    /// The outcome is returned so callers can report what happened.
    pub async fn open(store: S) -> (Self, LoadOutcome) {
        let outcome = match store.load().await {
            Ok(blob) => load_cart(blob),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart");
                LoadOutcome::Reset {
                    reason: ResetReason::Malformed(e.to_string()),
                }
            }
        };

        match &outcome {
            LoadOutcome::Reset {
                reason: ResetReason::UnsupportedVersion(version),
            } => warn!(version, "Stored cart has a newer schema, starting empty"),
            LoadOutcome::Reset {
                reason: ResetReason::Malformed(reason),
            } => warn!(reason = %reason, "Stored cart is unreadable, starting empty"),
            LoadOutcome::Loaded {
                migrated_from: Some(version),
                ..
            } => tracing::debug!(from = version, "Migrated stored cart"),
            _ => {}
        }

        let cart = outcome.clone().into_cart();
        (Self { store, cart }, outcome)
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.cart.item_count()
    }

    /// Consume the handle, returning the cart.
    #[must_use]
    pub fn into_cart(self) -> Cart {
        self.cart
    }

    /// Add a product and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written. The in-memory cart
    /// keeps the change either way.
    pub async fn add_item(
        &mut self,
        product: ProductSnapshot,
        quantity: i64,
    ) -> Result<(), CartStoreError> {
        self.cart.add_item(product, quantity);
        self.persist().await
    }

    /// Remove a line and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn remove_item(&mut self, id: &ProductId) -> Result<(), CartStoreError> {
        self.cart.remove_item(id);
        self.persist().await
    }

    /// Set a line's quantity and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn update_qty(&mut self, id: &ProductId, quantity: i64) -> Result<(), CartStoreError> {
        self.cart.update_qty(id, quantity);
        self.persist().await
    }

    /// Empty the cart and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn clear(&mut self) -> Result<(), CartStoreError> {
        self.cart.clear();
        self.persist().await
    }

    /// Write the current cart at the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn persist(&self) -> Result<(), CartStoreError> {
        self.store.save(&PersistedCart::from_cart(&self.cart)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::cart::CURRENT_SCHEMA_VERSION;
    use crate::cart::tests::snapshot;
    use crate::types::Money;

    #[derive(Clone, Default)]
    struct MemoryStore {
        slot: Arc<Mutex<Option<Value>>>,
        fail_reads: bool,
    }

    impl MemoryStore {
        fn with(blob: Value) -> Self {
            Self {
                slot: Arc::new(Mutex::new(Some(blob))),
                fail_reads: false,
            }
        }

        fn stored(&self) -> Option<Value> {
            self.slot.lock().unwrap().clone()
        }
    }

    impl CartStore for MemoryStore {
        async fn load(&self) -> Result<Option<Value>, CartStoreError> {
            if self.fail_reads {
                return Err(CartStoreError::Backend("unavailable".into()));
            }
            Ok(self.stored())
        }

        async fn save(&self, cart: &PersistedCart) -> Result<(), CartStoreError> {
            *self.slot.lock().unwrap() = Some(serde_json::to_value(cart)?);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let store = MemoryStore::default();
        let (mut handle, outcome) = CartHandle::open(store.clone()).await;
        assert_eq!(outcome, LoadOutcome::Empty);

        handle.add_item(snapshot("a", 4200, Some(3600)), 2).await.unwrap();
        handle.add_item(snapshot("b", 2800, None), 1).await.unwrap();
        handle.update_qty(&ProductId::new("b"), 3).await.unwrap();

        let stored = store.stored().unwrap();
        assert_eq!(stored["version"], json!(CURRENT_SCHEMA_VERSION));
        assert_eq!(stored["state"]["items"][0]["price"], json!("36.00"));
        assert_eq!(stored["state"]["items"][1]["quantity"], json!(3));

        let (reopened, _) = CartHandle::open(store).await;
        assert_eq!(reopened.cart(), handle.cart());
        assert_eq!(reopened.item_count(), 5);
    }

    #[tokio::test]
    async fn test_clear_persists_empty_cart() {
        let store = MemoryStore::default();
        let (mut handle, _) = CartHandle::open(store.clone()).await;
        handle.add_item(snapshot("a", 100, None), 1).await.unwrap();
        handle.clear().await.unwrap();

        assert_eq!(store.stored().unwrap()["state"]["items"], json!([]));
        assert_eq!(handle.totals().total, Money::ZERO);
    }

    #[tokio::test]
    async fn test_open_migrates_legacy_blob() {
        let store = MemoryStore::with(json!({
            "state": {"items": [{"id": "a", "name": "A", "price": 36, "quantity": 1}]},
            "version": 1
        }));

        let (handle, outcome) = CartHandle::open(store).await;
        assert!(matches!(
            outcome,
            LoadOutcome::Loaded {
                migrated_from: Some(1),
                ..
            }
        ));
        assert_eq!(
            handle.cart().items()[0].original_price,
            Money::from_cents(3600)
        );
    }

    #[tokio::test]
    async fn test_open_survives_backend_failure() {
        let store = MemoryStore {
            fail_reads: true,
            ..MemoryStore::default()
        };

        let (handle, outcome) = CartHandle::open(store).await;
        assert!(matches!(outcome, LoadOutcome::Reset { .. }));
        assert!(handle.cart().is_empty());
    }

    #[tokio::test]
    async fn test_newer_version_starts_empty_and_is_overwritten_on_write() {
        let store = MemoryStore::with(json!({"state": {"items": []}, "version": 99}));
        let (mut handle, outcome) = CartHandle::open(store.clone()).await;
        assert_eq!(
            outcome,
            LoadOutcome::Reset {
                reason: ResetReason::UnsupportedVersion(99)
            }
        );

        handle.add_item(snapshot("a", 100, None), 1).await.unwrap();
        assert_eq!(
            store.stored().unwrap()["version"],
            json!(CURRENT_SCHEMA_VERSION)
        );
    }
}
