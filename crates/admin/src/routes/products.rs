//! Product management handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::{info, instrument};

use liahna_core::ProductId;
use liahna_core::catalog::{Page, PageRequest};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::product::{
    ProductInput, ProductListQuery, ProductRecord, ProductUpdate, normalize_images,
};
use crate::state::AppState;

/// Id of a newly created product.
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: ProductId,
}

/// Acknowledgement for writes without a body.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

const ACK: Ack = Ack { ok: true };

/// Paginated product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Page<ProductRecord>>> {
    let request = PageRequest::new(query.page(), state.page_size());
    let page = ProductRepository::new(state.pool())
        .list(&query.filter(), request)
        .await?;
    Ok(Json(page))
}

/// Create a product.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Created>)> {
    let draft = input.validate().map_err(AppError::Validation)?;
    let id = ProductRepository::new(state.pool()).create(&draft).await?;

    info!(product_id = %id, slug = %draft.slug, "Product created");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Full product record with ordered images.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductRecord>> {
    ProductRepository::new(state.pool())
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Update a product, or only its gallery when `imagesOnly` is set.
#[instrument(skip(state, update))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Ack>> {
    let repo = ProductRepository::new(state.pool());

    match update {
        ProductUpdate::Full(input) => {
            let draft = input.validate().map_err(AppError::Validation)?;
            repo.update(&id, &draft).await?;
            info!(product_id = %id, slug = %draft.slug, "Product updated");
        }
        ProductUpdate::ImagesOnly(input) => {
            if input.images.iter().any(|image| image.url.trim().is_empty()) {
                return Err(AppError::BadRequest("Imagem sem URL.".to_string()));
            }
            let product = repo
                .get(&id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
            let images = normalize_images(input.images, Some(&product.name));
            repo.replace_images(&id, &images).await?;
            info!(product_id = %id, images = images.len(), "Product images replaced");
        }
    }

    Ok(Json(ACK))
}

/// Delete a product and its images.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<Ack>> {
    ProductRepository::new(state.pool()).delete(&id).await?;
    info!(product_id = %id, "Product deleted");
    Ok(Json(ACK))
}
