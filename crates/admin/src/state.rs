//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use liahna_core::catalog::DEFAULT_PAGE_SIZE;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    page_size: u32,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, page_size: u32) -> Self {
        Self {
            inner: Arc::new(AppStateInner { pool, page_size }),
        }
    }

    /// State with the default listing page size.
    #[must_use]
    pub fn with_pool(pool: PgPool) -> Self {
        Self::new(pool, DEFAULT_PAGE_SIZE)
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Products per listing page.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }
}
