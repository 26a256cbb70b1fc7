//! Catalog service.
//!
//! Serves the product list from the database (or the bundled fixtures) and
//! runs the shared query engine over it. The full active list is cached
//! with `moka` under a single key.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use liahna_core::catalog::{CatalogQuery, query_products};
use liahna_core::fixtures::fixture_products;
use liahna_core::{Product, ProductId};

use crate::db::{ProductRepository, RepositoryError};

/// Errors loading the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("bundled catalog is invalid: {0}")]
    Fixtures(#[from] serde_json::Error),
}

/// Where products come from.
#[derive(Clone)]
pub enum CatalogSource {
    /// Active products in `PostgreSQL`; the fixtures stand in while the
    /// table is empty.
    Database(PgPool),
    /// A fixed in-memory list.
    Static(Arc<[Product]>),
}

/// Cache key for the full product list.
const ALL_PRODUCTS: &str = "products:all";

/// Cached, queryable product catalog.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    source: CatalogSource,
    cache: Cache<&'static str, Arc<[Product]>>,
}

impl CatalogService {
    /// Create a catalog over `source`, caching the list for `ttl`.
    #[must_use]
    pub fn new(source: CatalogSource, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogServiceInner { source, cache }),
        }
    }

    /// Catalog backed by the bundled fixtures.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled JSON is invalid.
    pub fn from_fixtures(ttl: Duration) -> Result<Self, CatalogError> {
        Ok(Self::new(
            CatalogSource::Static(fixture_products()?.into()),
            ttl,
        ))
    }

    /// Every product on sale.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn all(&self) -> Result<Arc<[Product]>, CatalogError> {
        if let Some(products) = self.inner.cache.get(ALL_PRODUCTS).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let products = self.load().await?;
        self.inner
            .cache
            .insert(ALL_PRODUCTS, Arc::clone(&products))
            .await;
        Ok(products)
    }

    async fn load(&self) -> Result<Arc<[Product]>, CatalogError> {
        match &self.inner.source {
            CatalogSource::Static(products) => Ok(Arc::clone(products)),
            CatalogSource::Database(pool) => {
                let products = ProductRepository::new(pool).list_active().await?;
                if products.is_empty() {
                    warn!("No active products in database, serving bundled catalog");
                    return Ok(fixture_products()?.into());
                }
                Ok(products.into())
            }
        }
    }

    /// Filtered and sorted listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &CatalogQuery) -> Result<Vec<Product>, CatalogError> {
        let products = self.all().await?;
        Ok(query_products(&products, &query.filter(), query.sort_key()))
    }

    /// Look up a product by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub async fn by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError> {
        Ok(self.all().await?.iter().find(|p| p.slug == slug).cloned())
    }

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub async fn by_id(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.all().await?.iter().find(|p| &p.id == id).cloned())
    }

    /// Drop the cached list so the next read hits the source.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
