//! Product repository for the back office.
//!
//! Products and their images are always written together inside one
//! transaction so the gallery never disagrees with the product row.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use liahna_core::catalog::{Page, PageRequest};
use liahna_core::{Category, Money, ProductId, ProductImageId};

use super::RepositoryError;
use crate::models::product::{NewImage, ProductDraft, ProductImage, ProductListFilter, ProductRecord};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    slug: String,
    description: String,
    details: Vec<String>,
    price_cents: Money,
    promo_price_cents: Option<Money>,
    category: String,
    tags: Vec<String>,
    materials: Vec<String>,
    colors: Vec<String>,
    in_stock: bool,
    stock_qty: Option<i32>,
    featured: bool,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: ProductImageId,
    product_id: ProductId,
    url: String,
    alt: String,
    sort_order: i32,
}

impl From<ImageRow> for ProductImage {
    fn from(row: ImageRow) -> Self {
        Self {
            id: row.id,
            url: row.url,
            alt: row.alt,
            sort_order: row.sort_order,
        }
    }
}

impl ProductRow {
    fn into_record(self, images: Vec<ProductImage>) -> ProductRecord {
        ProductRecord {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            details: self.details,
            price: self.price_cents,
            promo_price: self.promo_price_cents,
            category: Category::from_slug_or_default(&self.category),
            tags: self.tags,
            materials: self.materials,
            colors: self.colors,
            in_stock: self.in_stock,
            stock_qty: self.stock_qty,
            featured: self.featured,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            images,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, slug, description, details, price_cents, \
     promo_price_cents, category, tags, materials, colors, in_stock, stock_qty, \
     featured, active, created_at, updated_at";

const LIST_WHERE: &str = r"
    WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR slug ILIKE '%' || $1 || '%')
      AND ($2::text IS NULL OR category = $2)
      AND ($3::bool IS NULL OR active = $3)
      AND ($4::bool IS NULL OR featured = $4)
";

/// Map a constraint violation on write to a conflict.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict("slug already exists".to_owned());
        }
        if db_err.is_check_violation() {
            return RepositoryError::Conflict(
                "promo price must be below the price".to_owned(),
            );
        }
    }
    RepositoryError::Database(e)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Number of products, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// One page of products matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ProductListFilter,
        request: PageRequest,
    ) -> Result<Page<ProductRecord>, RepositoryError> {
        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM products {LIST_WHERE}"))
            .bind(filter.q.as_deref())
            .bind(filter.category.as_deref())
            .bind(filter.active)
            .bind(filter.featured)
            .fetch_one(self.pool)
            .await?;

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products {LIST_WHERE} \
             ORDER BY created_at DESC, id LIMIT $5 OFFSET $6"
        ))
        .bind(filter.q.as_deref())
        .bind(filter.category.as_deref())
        .bind(filter.active)
        .bind(filter.featured)
        .bind(i64::from(request.page_size()))
        .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<String> = rows.iter().map(|row| row.id.to_string()).collect();
        let mut images = self.images_for(&ids).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let gallery = images.remove(&row.id).unwrap_or_default();
                row.into_record(gallery)
            })
            .collect();

        Ok(Page::new(
            items,
            u64::try_from(total).unwrap_or_default(),
            request,
        ))
    }

    /// Images of the given products, each list in display order.
    async fn images_for(
        &self,
        ids: &[String],
    ) -> Result<HashMap<ProductId, Vec<ProductImage>>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<ImageRow> = sqlx::query_as(
            r"
            SELECT id, product_id, url, alt, sort_order
            FROM product_images
            WHERE product_id = ANY($1)
            ORDER BY product_id, sort_order, id
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<ProductId, Vec<ProductImage>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.product_id.clone())
                .or_default()
                .push(row.into());
        }
        Ok(grouped)
    }

    /// Get a product with its ordered images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &ProductId) -> Result<Option<ProductRecord>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut images = self.images_for(&[id.to_string()]).await?;
        let gallery = images.remove(id).unwrap_or_default();
        Ok(Some(row.into_record(gallery)))
    }

    /// Insert a product and its images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, draft), fields(slug = %draft.slug))]
    pub async fn create(&self, draft: &ProductDraft) -> Result<ProductId, RepositoryError> {
        let id = ProductId::generate();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO products (
                id, name, slug, description, details, price_cents, promo_price_cents,
                category, tags, materials, colors, in_stock, stock_qty, featured, active,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    COALESCE($16, NOW()), NOW())
            ",
        )
        .bind(&id)
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(&draft.details)
        .bind(draft.price)
        .bind(draft.promo_price)
        .bind(draft.category.slug())
        .bind(&draft.tags)
        .bind(&draft.materials)
        .bind(&draft.colors)
        .bind(draft.in_stock)
        .bind(draft.stock_qty)
        .bind(draft.featured)
        .bind(draft.active)
        .bind(draft.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        insert_images(&mut tx, &id, &draft.images).await?;
        tx.commit().await?;

        Ok(id)
    }

    /// Replace every field and the gallery of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: &ProductId, draft: &ProductDraft) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $2, slug = $3, description = $4, details = $5,
                price_cents = $6, promo_price_cents = $7, category = $8,
                tags = $9, materials = $10, colors = $11, in_stock = $12,
                stock_qty = $13, featured = $14, active = $15, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(&draft.details)
        .bind(draft.price)
        .bind(draft.promo_price)
        .bind(draft.category.slug())
        .bind(&draft.tags)
        .bind(&draft.materials)
        .bind(&draft.colors)
        .bind(draft.in_stock)
        .bind(draft.stock_qty)
        .bind(draft.featured)
        .bind(draft.active)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        delete_images(&mut tx, id).await?;
        insert_images(&mut tx, id, &draft.images).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Replace a product's gallery, leaving its fields untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, images))]
    pub async fn replace_images(
        &self,
        id: &ProductId,
        images: &[NewImage],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE products SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        delete_images(&mut tx, id).await?;
        insert_images(&mut tx, id, images).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Delete a product; its images go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

async fn delete_images(
    tx: &mut Transaction<'_, Postgres>,
    id: &ProductId,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM product_images WHERE product_id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn insert_images(
    tx: &mut Transaction<'_, Postgres>,
    id: &ProductId,
    images: &[NewImage],
) -> Result<(), RepositoryError> {
    for image in images {
        sqlx::query(
            r"
            INSERT INTO product_images (id, product_id, url, alt, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(ProductImageId::generate())
        .bind(id)
        .bind(&image.url)
        .bind(&image.alt)
        .bind(image.sort_order)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
