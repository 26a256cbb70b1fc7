//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - database holding the catalog tables
//! - `STOREFRONT_DATABASE_URL` - database holding storefront sessions
//!
//! Both fall back to `DATABASE_URL`.
//!
//! # Migration Files
//!
//! Catalog migrations: `crates/admin/migrations/`

use liahna_admin::config::get_database_url;
use liahna_admin::db::create_pool;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use super::CommandError;

/// Create or upgrade the `products` and `product_images` tables.
///
/// # Errors
///
/// Returns an error if the URL is missing, the database is unreachable or
/// a migration fails.
pub async fn catalog() -> Result<(), CommandError> {
    let database_url = get_database_url("ADMIN_DATABASE_URL")?;

    info!("Connecting to catalog database...");
    let pool = create_pool(&database_url).await?;

    info!("Running catalog migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    info!("Catalog migrations complete");
    Ok(())
}

/// Create the session table used by the storefront's `PostgresStore`.
///
/// # Errors
///
/// Returns an error if the URL is missing, the database is unreachable or
/// the session schema cannot be created.
pub async fn sessions() -> Result<(), CommandError> {
    let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;

    info!("Connecting to storefront database...");
    let pool = create_pool(&database_url).await?;

    info!("Creating session table...");
    PostgresStore::new(pool)
        .migrate()
        .await
        .map_err(|e| CommandError::Sessions(e.to_string()))?;

    info!("Session migrations complete");
    Ok(())
}
