//! Checkout route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::{CheckoutRequest, Order};
use crate::services::checkout;
use crate::state::AppState;

/// Place an order from the session cart.
#[instrument(skip_all)]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = checkout::place_order(state.carts(), &session, request).await?;
    add_breadcrumb("checkout", "Order placed", &[("order_id", order.id.as_str())]);
    Ok((StatusCode::CREATED, Json(order)))
}

/// The last order placed in this session.
#[instrument(skip_all)]
pub async fn last(session: Session) -> Result<Json<Order>> {
    checkout::last_order(&session)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no order in this session".to_string()))
}
