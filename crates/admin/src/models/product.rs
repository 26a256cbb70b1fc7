//! Product records and the product form input.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use liahna_core::{Category, Money, ProductId, ProductImageId, deserialize_list};

/// Alt text used when neither the image nor the product has one.
pub const DEFAULT_IMAGE_ALT: &str = "Produto";

/// Per-field validation messages, keyed by the camelCase field name.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// A stored product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: ProductImageId,
    pub url: String,
    pub alt: String,
    pub sort_order: i32,
}

/// A product as managed in the back office, active or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub details: Vec<String>,
    pub price: Money,
    pub promo_price: Option<Money>,
    pub category: Category,
    pub tags: Vec<String>,
    pub materials: Vec<String>,
    pub colors: Vec<String>,
    pub in_stock: bool,
    pub stock_qty: Option<i32>,
    pub featured: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ordered by `sort_order`.
    pub images: Vec<ProductImage>,
}

/// An image as submitted by the product form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// An image ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub url: String,
    pub alt: String,
    pub sort_order: i32,
}

/// Resolve alt text and ordering for submitted images.
///
/// Missing sort orders take the image's position in the list and missing
/// alt text falls back to the product name, then [`DEFAULT_IMAGE_ALT`].
/// The result is ordered by `sort_order`, keeping submission order for ties.
#[must_use]
pub fn normalize_images(images: Vec<ImageInput>, product_name: Option<&str>) -> Vec<NewImage> {
    let fallback_alt = product_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_IMAGE_ALT);

    let mut normalized: Vec<NewImage> = images
        .into_iter()
        .enumerate()
        .map(|(index, image)| NewImage {
            url: image.url,
            alt: image.alt.unwrap_or_else(|| fallback_alt.to_string()),
            sort_order: image
                .sort_order
                .unwrap_or_else(|| i32::try_from(index).unwrap_or(i32::MAX)),
        })
        .collect();

    normalized.sort_by_key(|image| image.sort_order);
    normalized
}

/// Accept `null`, a blank string, a value, or a value written as a string.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => serde_json::from_str(s.trim())
            .or_else(|_| serde_json::from_value(Value::String(s)))
            .map(Some)
            .map_err(D::Error::custom),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(D::Error::custom),
    }
}

const fn default_true() -> bool {
    true
}

/// Body of product create and full update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub details: Vec<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub price: Option<Money>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub promo_price: Option<Money>,
    pub category: Category,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub materials: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub colors: Vec<String>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub stock_qty: Option<i32>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub images: Vec<ImageInput>,
}

/// A validated product ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub details: Vec<String>,
    pub price: Money,
    pub promo_price: Option<Money>,
    pub category: Category,
    pub tags: Vec<String>,
    pub materials: Vec<String>,
    pub colors: Vec<String>,
    pub in_stock: bool,
    pub stock_qty: Option<i32>,
    pub featured: bool,
    pub active: bool,
    /// Creation time to record; the database clock when `None`.
    pub created_at: Option<DateTime<Utc>>,
    pub images: Vec<NewImage>,
}

impl ProductInput {
    /// Check the form, collecting every problem at once.
    ///
    /// # Errors
    ///
    /// Returns the field messages if anything is invalid.
    pub fn validate(self) -> Result<ProductDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.insert("name", "Informe o nome.");
        }

        let slug = self.slug.trim().to_string();
        if slug.is_empty() {
            errors.insert("slug", "Informe o slug.");
        }

        let price = self.price.filter(|p| *p > Money::ZERO);
        if price.is_none() {
            errors.insert("price", "Preço deve ser maior que zero.");
        }

        if let Some(promo) = self.promo_price {
            if promo <= Money::ZERO {
                errors.insert("promoPrice", "Preço promocional deve ser maior que zero.");
            } else if price.is_some_and(|price| promo >= price) {
                errors.insert("promoPrice", "Preço promocional deve ser menor que o preço.");
            }
        }

        if self.stock_qty.is_some_and(|qty| qty < 0) {
            errors.insert("stockQty", "Estoque não pode ser negativo.");
        }

        let Some(price) = price else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let images = normalize_images(self.images, Some(&name));
        Ok(ProductDraft {
            name,
            slug,
            description: self.description,
            details: self.details,
            price,
            promo_price: self.promo_price,
            category: self.category,
            tags: self.tags,
            materials: self.materials,
            colors: self.colors,
            in_stock: self.in_stock,
            stock_qty: self.stock_qty,
            featured: self.featured,
            active: self.active,
            created_at: None,
            images,
        })
    }
}

/// Body of `PATCH /api/products/{id}` when only the gallery changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesOnlyInput {
    #[serde(default)]
    pub images: Vec<ImageInput>,
}

/// `PATCH /api/products/{id}` body: a full update or a gallery replacement.
#[derive(Debug, Clone)]
pub enum ProductUpdate {
    Full(ProductInput),
    ImagesOnly(ImagesOnlyInput),
}

impl<'de> Deserialize<'de> for ProductUpdate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let images_only = value
            .get("imagesOnly")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if images_only {
            serde_json::from_value(value)
                .map(Self::ImagesOnly)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Self::Full)
                .map_err(D::Error::custom)
        }
    }
}

/// Listing filters from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<String>,
    pub q: Option<String>,
    pub category: Option<String>,
    pub active: Option<String>,
    pub featured: Option<String>,
}

/// Parsed listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListFilter {
    /// Case-insensitive substring of name or slug.
    pub q: Option<String>,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub featured: Option<bool>,
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value.map(str::trim) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

impl ProductListQuery {
    /// Requested page; missing or unparseable values mean the first page.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }

    #[must_use]
    pub fn filter(&self) -> ProductListFilter {
        ProductListFilter {
            q: non_blank(self.q.as_deref()),
            category: non_blank(self.category.as_deref()),
            active: parse_flag(self.active.as_deref()),
            featured: parse_flag(self.featured.as_deref()),
        }
    }
}
