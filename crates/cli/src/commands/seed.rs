//! Seed the catalog with the bundled demo products.
//!
//! Seeding only ever runs against an empty `products` table; a catalog that
//! already holds anything is left untouched.

use liahna_admin::config::get_database_url;
use liahna_admin::db::{ProductRepository, create_pool};
use liahna_admin::models::product::{DEFAULT_IMAGE_ALT, NewImage, ProductDraft};
use liahna_core::Product;
use liahna_core::fixtures::fixture_products;
use tracing::info;

use super::CommandError;

/// Products inserted when `--all` is not given.
const DEFAULT_SEED_COUNT: usize = 5;

/// Stock recorded for seeded products that are in stock.
const SEED_STOCK_QTY: i32 = 10;

/// Insert bundled products into an empty catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn catalog(all: bool) -> Result<(), CommandError> {
    let database_url = get_database_url("ADMIN_DATABASE_URL")?;
    let pool = create_pool(&database_url).await?;
    let repo = ProductRepository::new(&pool);

    let existing = repo.count().await?;
    if existing > 0 {
        info!(existing, "Catalog already has products, skipping seed");
        return Ok(());
    }

    let drafts = seed_drafts(fixture_products()?, all);
    for draft in &drafts {
        let id = repo.create(draft).await?;
        info!(product_id = %id, slug = %draft.slug, "Seeded product");
    }

    info!(inserted = drafts.len(), "Seeding complete");
    Ok(())
}

/// Drafts for the products to insert, in bundle order.
fn seed_drafts(products: Vec<Product>, all: bool) -> Vec<ProductDraft> {
    let take = if all { products.len() } else { DEFAULT_SEED_COUNT };
    products.into_iter().take(take).map(draft_from_fixture).collect()
}

fn draft_from_fixture(product: Product) -> ProductDraft {
    let alt = if product.name.trim().is_empty() {
        DEFAULT_IMAGE_ALT.to_owned()
    } else {
        product.name.clone()
    };
    let images = product
        .images
        .into_iter()
        .zip(0..)
        .map(|(url, sort_order)| NewImage {
            url,
            alt: alt.clone(),
            sort_order,
        })
        .collect();

    ProductDraft {
        name: product.name,
        slug: product.slug,
        description: product.description,
        details: product.details,
        price: product.price,
        promo_price: product.promo_price,
        category: product.category,
        tags: product.tags,
        materials: product.materials,
        colors: product.colors,
        in_stock: product.in_stock,
        stock_qty: Some(if product.in_stock { SEED_STOCK_QTY } else { 0 }),
        featured: product.featured,
        active: true,
        created_at: Some(product.created_at),
        images,
    }
}
