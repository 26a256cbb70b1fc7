//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::instrument;

use liahna_core::catalog::CatalogQuery;
use liahna_core::{Category, Money, Product};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// A category as listed in navigation.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub slug: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            slug: category.slug(),
            name: category.name(),
            description: category.description(),
        }
    }
}

/// A product with its promo-aware pricing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub effective_price: Money,
    /// Rounded discount shown next to the struck-through price.
    pub percent_off: Option<u8>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            effective_price: product.effective_price(),
            percent_off: product.percent_off(),
            product,
        }
    }
}

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct ProductList {
    pub items: Vec<ProductView>,
    pub total: usize,
}

/// List all categories in display order.
pub async fn categories() -> Json<Vec<CategoryView>> {
    Json(Category::ALL.into_iter().map(CategoryView::from).collect())
}

/// Filtered, sorted product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<ProductList>> {
    let items = state.catalog().list(&query).await?;
    Ok(Json(ProductList {
        total: items.len(),
        items: items.into_iter().map(ProductView::from).collect(),
    }))
}

/// Product detail by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductView>> {
    state
        .catalog()
        .by_slug(&slug)
        .await?
        .map(|product| Json(ProductView::from(product)))
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))
}
