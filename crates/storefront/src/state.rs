//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::{CartService, CatalogService, CatalogSource};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: Option<PgPool>,
    catalog: CatalogService,
    carts: CartService,
}

impl AppState {
    /// State backed by `PostgreSQL`.
    #[must_use]
    pub fn new(config: &StorefrontConfig, pool: PgPool) -> Self {
        let catalog = CatalogService::new(
            CatalogSource::Database(pool.clone()),
            config.catalog_cache_ttl,
        );
        Self::build(Some(pool), catalog)
    }

    /// State over an in-memory catalog, without a database.
    #[must_use]
    pub fn with_catalog(catalog: CatalogService) -> Self {
        Self::build(None, catalog)
    }

    fn build(pool: Option<PgPool>, catalog: CatalogService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                catalog,
                carts: CartService::new(),
            }),
        }
    }

    /// Database pool, if the catalog is database-backed.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }
}
