//! Order placement.
//!
//! There is no payment integration: placing an order validates the buyer's
//! details, snapshots the session cart into an [`Order`], keeps it in the
//! session and empties the cart.

use chrono::Utc;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use liahna_core::OrderId;
use liahna_core::cart::CartSummary;

use super::cart::CartService;
use crate::error::AppError;
use crate::models::order::FieldErrors;
use crate::models::{CheckoutRequest, Order, session_keys};

/// Why an order could not be placed.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid checkout details")]
    Invalid(FieldErrors),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::EmptyCart => Self::BadRequest("Seu carrinho está vazio".to_string()),
            CheckoutError::Invalid(fields) => Self::Validation(fields),
            CheckoutError::Session(e) => Self::Session(e),
        }
    }
}

/// Place an order from the session's cart.
///
/// # Errors
///
/// Returns [`CheckoutError::Invalid`] with every failing field,
/// [`CheckoutError::EmptyCart`] if there is nothing to buy, or
/// [`CheckoutError::Session`] if the order cannot be stored.
#[instrument(skip_all)]
pub async fn place_order(
    carts: &CartService,
    session: &Session,
    request: CheckoutRequest,
) -> Result<Order, CheckoutError> {
    let payment_method = request.validate().map_err(CheckoutError::Invalid)?;

    let _guard = carts.locks().acquire(session).await;
    let mut handle = carts.open(session).await;
    if handle.cart().is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let summary = CartSummary::new(handle.cart(), request.coupon.as_deref());
    let order = Order {
        id: OrderId::generate(),
        items: handle.cart().items().to_vec(),
        totals: handle.totals(),
        coupon: summary.coupon.map(ToString::to_string),
        final_total: summary.final_total,
        customer: request.customer,
        address: request.address,
        payment_method,
        created_at: Utc::now(),
    };

    session.insert(session_keys::LAST_ORDER, &order).await?;
    session.insert(session_keys::LAST_ORDER_ID, &order.id).await?;
    session.save().await?;

    if let Err(e) = handle.clear().await {
        warn!(error = %e, order_id = %order.id, "Failed to clear cart after order");
    }

    info!(order_id = %order.id, total = %order.final_total, "Order placed");
    Ok(order)
}

/// The last order placed in this session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn last_order(session: &Session) -> Result<Option<Order>, tower_sessions::session::Error> {
    session.get::<Order>(session_keys::LAST_ORDER).await
}
