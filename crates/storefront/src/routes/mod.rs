//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness check
//! GET    /health/ready            - Readiness check (database ping)
//!
//! # Catalog
//! GET    /api/categories          - Category list
//! GET    /api/products            - Filtered, sorted listing
//! GET    /api/products/{slug}     - Product detail
//!
//! # Cart (session)
//! GET    /api/cart                - Cart with summary (?coupon=)
//! GET    /api/cart/count          - Badge count
//! POST   /api/cart/items          - Add a product
//! PATCH  /api/cart/items/{id}     - Set a line's quantity
//! DELETE /api/cart/items/{id}     - Remove a line
//! DELETE /api/cart                - Empty the cart
//!
//! # Checkout
//! POST   /api/checkout            - Place an order
//! GET    /api/orders/last         - Last order in this session
//! ```
//!
//! Cart and checkout writes are rate limited per client IP.

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};

use crate::middleware::api_rate_limiter;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    let writes = Router::new()
        .route("/", axum::routing::delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", patch(cart::update).delete(cart::remove))
        .route_layer(api_rate_limiter());

    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(writes)
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::place))
        .route_layer(api_rate_limiter())
        .route("/orders/last", get(checkout::last))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/api/categories", get(products::categories))
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api", checkout_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity when the catalog is database-backed.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
