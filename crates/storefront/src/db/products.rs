//! Read-only access to the published catalog.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use liahna_core::{Category, FALLBACK_PRODUCT_IMAGE, Money, Product, ProductId};

use super::RepositoryError;

/// Product row joined with its ordered image URLs.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    slug: String,
    name: String,
    description: String,
    details: Vec<String>,
    price_cents: Money,
    promo_price_cents: Option<Money>,
    category: String,
    tags: Vec<String>,
    materials: Vec<String>,
    colors: Vec<String>,
    in_stock: bool,
    featured: bool,
    created_at: DateTime<Utc>,
    images: Vec<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let images = if row.images.is_empty() {
            vec![FALLBACK_PRODUCT_IMAGE.to_string()]
        } else {
            row.images
        };

        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            description: row.description,
            details: row.details,
            price: row.price_cents,
            promo_price: row.promo_price_cents,
            category: Category::from_slug_or_default(&row.category),
            tags: row.tags,
            materials: row.materials,
            colors: row.colors,
            images,
            in_stock: row.in_stock,
            featured: row.featured,
            created_at: row.created_at,
        }
    }
}

const ACTIVE_PRODUCTS_SQL: &str = r"
    SELECT p.id, p.slug, p.name, p.description, p.details,
           p.price_cents, p.promo_price_cents, p.category,
           p.tags, p.materials, p.colors,
           p.in_stock, p.featured, p.created_at,
           COALESCE(
               ARRAY_AGG(i.url ORDER BY i.sort_order, i.id) FILTER (WHERE i.id IS NOT NULL),
               '{}'
           ) AS images
    FROM products p
    LEFT JOIN product_images i ON i.product_id = p.id
    WHERE p.active
    GROUP BY p.id
    ORDER BY p.created_at DESC
";

/// Repository for the storefront's product reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All active products, newest first, with images in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(ACTIVE_PRODUCTS_SQL)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(category: &str, images: Vec<String>) -> ProductRow {
        ProductRow {
            id: ProductId::new("prd-1"),
            slug: "colar-mare".to_string(),
            name: "Colar Maré".to_string(),
            description: String::new(),
            details: Vec::new(),
            price_cents: Money::from_cents(5900),
            promo_price_cents: None,
            category: category.to_string(),
            tags: vec!["Novo".to_string()],
            materials: Vec::new(),
            colors: Vec::new(),
            in_stock: true,
            featured: false,
            created_at: Utc::now(),
            images,
        }
    }

    #[test]
    fn test_row_without_images_gets_placeholder() {
        let product = Product::from(row("colares", Vec::new()));
        assert_eq!(product.images, vec![FALLBACK_PRODUCT_IMAGE.to_string()]);
        assert_eq!(product.category, Category::Colares);
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let product = Product::from(row("relogios", vec!["/a.jpg".to_string()]));
        assert_eq!(product.category, Category::Brincos);
        assert_eq!(product.primary_image(), "/a.jpg");
    }
}
