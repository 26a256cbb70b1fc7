//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every mutation answers with the
//! whole cart so the client never has to reconcile partial updates.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use liahna_core::ProductId;
use liahna_core::cart::{Cart, CartLineItem, CartSummary, CartTotals};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::CartCommand;
use crate::state::AppState;

/// Cart contents with totals and the summary panel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub totals: CartTotals,
    pub item_count: i64,
    pub summary: CartSummary,
}

impl CartView {
    fn new(cart: Cart, coupon: Option<&str>) -> Self {
        let summary = CartSummary::new(&cart, coupon);
        Self {
            totals: cart.totals(),
            item_count: cart.item_count(),
            items: cart.into_items(),
            summary,
        }
    }
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        Self::new(cart, None)
    }
}

/// `GET /api/cart` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CartQuery {
    pub coupon: Option<String>,
}

/// Badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: i64,
}

const fn default_quantity() -> i64 {
    1
}

/// `POST /api/cart/items` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub variant: Option<String>,
    /// Gallery image the shopper was viewing.
    #[serde(default)]
    pub image: Option<String>,
}

/// `PATCH /api/cart/items/{id}` body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

/// Show the cart, optionally with a coupon applied to the summary.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CartQuery>,
) -> Json<CartView> {
    let cart = state.carts().read(&session).await;
    Json(CartView::new(cart, query.coupon.as_deref()))
}

/// Number of units in the cart.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Json<CartCount> {
    let cart = state.carts().read(&session).await;
    Json(CartCount {
        count: cart.item_count(),
    })
}

/// Add a catalog product to the cart at its current price.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    if request.quantity < 1 {
        return Err(AppError::BadRequest("Quantidade inválida".to_string()));
    }

    let product = state
        .catalog()
        .by_id(&request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", request.product_id)))?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", product.id.as_str()),
            ("quantity", &request.quantity.to_string()),
        ],
    );

    let snapshot = product.snapshot(request.variant, request.image.as_deref());
    let cart = state
        .carts()
        .apply(
            &session,
            CartCommand::Add {
                product: snapshot,
                quantity: request.quantity,
            },
        )
        .await;

    Ok(Json(cart.into()))
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    Json(request): Json<UpdateItemRequest>,
) -> Json<CartView> {
    let cart = state
        .carts()
        .apply(
            &session,
            CartCommand::UpdateQty {
                id,
                quantity: request.quantity,
            },
        )
        .await;
    Json(cart.into())
}

/// Remove a line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Json<CartView> {
    let cart = state
        .carts()
        .apply(&session, CartCommand::Remove { id })
        .await;
    Json(cart.into())
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Json<CartView> {
    let cart = state.carts().apply(&session, CartCommand::Clear).await;
    Json(cart.into())
}
