//! Session-held cart.
//!
//! Each visitor's cart lives in their tower-sessions record under
//! [`CART_STORAGE_KEY`]. Handlers run concurrently, so every
//! read-modify-write of a cart holds that session's lock from [`CartLocks`].

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_sessions::Session;
use tower_sessions::session::Id;
use tracing::{instrument, warn};

use liahna_core::ProductId;
use liahna_core::cart::{
    CART_STORAGE_KEY, Cart, CartHandle, CartStore, CartStoreError, PersistedCart, ProductSnapshot,
};

/// Idle time after which a session's lock is forgotten.
const LOCK_IDLE: Duration = Duration::from_secs(30 * 60);

/// [`CartStore`] over the visitor's session.
#[derive(Clone)]
pub struct SessionCartStore {
    session: Session,
}

impl SessionCartStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStore for SessionCartStore {
    async fn load(&self) -> Result<Option<Value>, CartStoreError> {
        self.session
            .get::<Value>(CART_STORAGE_KEY)
            .await
            .map_err(|e| CartStoreError::Backend(e.to_string()))
    }

    /// Writes through to the session store so the record is persisted
    /// while the caller still holds the session's cart lock.
    async fn save(&self, cart: &PersistedCart) -> Result<(), CartStoreError> {
        self.session
            .insert(CART_STORAGE_KEY, cart)
            .await
            .map_err(|e| CartStoreError::Backend(e.to_string()))?;
        self.session
            .save()
            .await
            .map_err(|e| CartStoreError::Backend(e.to_string()))
    }
}

/// Per-session mutexes serializing cart mutations.
#[derive(Clone)]
pub struct CartLocks {
    locks: Cache<Id, Arc<Mutex<()>>>,
}

impl Default for CartLocks {
    fn default() -> Self {
        Self::new()
    }
}

impl CartLocks {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Cache::builder()
                .max_capacity(100_000)
                .time_to_idle(LOCK_IDLE)
                .build(),
        }
    }

    /// Wait for exclusive access to the session's cart.
    ///
    /// A session without an id has not been sent to the client yet, so no
    /// other request can share it and no lock is needed.
    pub async fn acquire(&self, session: &Session) -> Option<OwnedMutexGuard<()>> {
        let id = session.id()?;
        let lock = self
            .locks
            .get_with(id, async { Arc::new(Mutex::new(())) })
            .await;
        Some(lock.lock_owned().await)
    }
}

/// A single cart mutation.
#[derive(Debug, Clone)]
pub enum CartCommand {
    Add {
        product: ProductSnapshot,
        quantity: i64,
    },
    UpdateQty {
        id: ProductId,
        quantity: i64,
    },
    Remove {
        id: ProductId,
    },
    Clear,
}

/// Loads, mutates and persists session carts.
#[derive(Clone, Default)]
pub struct CartService {
    locks: CartLocks,
}

impl CartService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The session's lock registry.
    #[must_use]
    pub const fn locks(&self) -> &CartLocks {
        &self.locks
    }

    /// Open the session's cart. The caller must hold the session lock if it
    /// intends to write.
    pub async fn open(&self, session: &Session) -> CartHandle<SessionCartStore> {
        let (handle, _outcome) = CartHandle::open(SessionCartStore::new(session.clone())).await;
        handle
    }

    /// Current cart contents.
    pub async fn read(&self, session: &Session) -> Cart {
        self.open(session).await.into_cart()
    }

    /// Apply `command` and persist. Returns the resulting cart.
    ///
    /// Persistence failures are logged; the returned cart still reflects the
    /// mutation.
    #[instrument(skip(self, session))]
    pub async fn apply(&self, session: &Session, command: CartCommand) -> Cart {
        let _guard = self.locks.acquire(session).await;
        let mut handle = self.open(session).await;

        let result = match command {
            CartCommand::Add { product, quantity } => handle.add_item(product, quantity).await,
            CartCommand::UpdateQty { id, quantity } => handle.update_qty(&id, quantity).await,
            CartCommand::Remove { id } => handle.remove_item(&id).await,
            CartCommand::Clear => handle.clear().await,
        };

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist cart");
        }

        handle.into_cart()
    }
}
