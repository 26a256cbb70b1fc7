//! Catalog query engine.
//!
//! Pure filtering, sorting and pagination over product slices. The
//! storefront runs these over the cached catalog.

mod page;
mod query;

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{Category, Money};

pub use page::{DEFAULT_PAGE_SIZE, Page, PageRequest, paginate};
pub use query::CatalogQuery;

/// Category criterion of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    Only(Category),
    /// A slug outside the category set; no product matches it.
    Unknown,
}

impl CategoryFilter {
    /// Parse a requested slug. Anything but a known slug is [`Self::Unknown`].
    #[must_use]
    pub fn parse(slug: &str) -> Self {
        slug.trim().parse().map_or(Self::Unknown, Self::Only)
    }

    #[must_use]
    pub fn matches(self, category: Category) -> bool {
        self == Self::Only(category)
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        Self::Only(category)
    }
}

/// Criteria for narrowing a product list. Every present criterion must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category: Option<CategoryFilter>,
    /// Free-text search over name, description, tags, materials and colors.
    pub query: Option<String>,
    /// Inclusive lower bound on the effective price.
    pub min_price: Option<Money>,
    /// Inclusive upper bound on the effective price.
    pub max_price: Option<Money>,
    /// Required tags, all of them, case-insensitive.
    pub tags: Vec<String>,
    pub in_stock_only: bool,
}

impl CatalogFilter {
    /// Compiled form with the text criteria lower-cased once.
    fn prepare(&self) -> PreparedFilter<'_> {
        PreparedFilter {
            filter: self,
            query: self
                .query
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_lowercase),
            tags: self.tags.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// Whether `product` passes every criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.prepare().matches(product)
    }
}

struct PreparedFilter<'a> {
    filter: &'a CatalogFilter,
    query: Option<String>,
    tags: Vec<String>,
}

impl PreparedFilter<'_> {
    fn matches(&self, product: &Product) -> bool {
        let filter = self.filter;

        if filter.category.is_some_and(|c| !c.matches(product.category)) {
            return false;
        }
        if filter.in_stock_only && !product.in_stock {
            return false;
        }

        let price = product.effective_price();
        if filter.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if filter.max_price.is_some_and(|max| price > max) {
            return false;
        }

        if !self.tags.is_empty() {
            let product_tags: Vec<String> = product.tags.iter().map(|t| t.to_lowercase()).collect();
            if !self.tags.iter().all(|tag| product_tags.contains(tag)) {
                return false;
            }
        }

        self.query
            .as_deref()
            .is_none_or(|query| search_haystack(product).contains(query))
    }
}

/// Lower-cased text searched by the free-text query.
fn search_haystack(product: &Product) -> String {
    [
        product.name.as_str(),
        product.description.as_str(),
        &product.tags.join(" "),
        &product.materials.join(" "),
        &product.colors.join(" "),
    ]
    .join(" ")
    .to_lowercase()
}

/// Keep the products matching `filter`, in input order.
#[must_use]
pub fn filter_products(products: &[Product], filter: &CatalogFilter) -> Vec<Product> {
    let prepared = filter.prepare();
    products
        .iter()
        .filter(|p| prepared.matches(p))
        .cloned()
        .collect()
}

/// Listing orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    Newest,
    /// Featured first, then newest.
    #[default]
    Recommended,
}

impl SortKey {
    /// Parse a query-string value; unknown keys fall back to
    /// [`SortKey::Recommended`].
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Newest => "newest",
            Self::Recommended => "recommended",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "newest" => Ok(Self::Newest),
            "recommended" => Ok(Self::Recommended),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

impl core::fmt::Display for SortKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return the products ordered by `key`. Stable: ties keep input order.
#[must_use]
pub fn sort_products(products: &[Product], key: SortKey) -> Vec<Product> {
    let mut sorted = products.to_vec();
    match key {
        SortKey::PriceAsc => sorted.sort_by_key(Product::effective_price),
        SortKey::PriceDesc => {
            sorted.sort_by(|a, b| b.effective_price().cmp(&a.effective_price()));
        }
        SortKey::Newest => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Recommended => sorted.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
    }
    sorted
}

/// Filter then sort.
#[must_use]
pub fn query_products(products: &[Product], filter: &CatalogFilter, sort: SortKey) -> Vec<Product> {
    sort_products(&filter_products(products, filter), sort)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::product::tests::product;

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    fn tagged(id: &str, tags: &[&str]) -> Product {
        let mut p = product(id, 1000, None);
        p.tags = tags.iter().map(ToString::to_string).collect();
        p
    }

    #[test]
    fn test_tags_require_every_requested_tag() {
        let products = vec![tagged("a", &["Novo", "Brilho"])];

        let both = CatalogFilter {
            tags: vec!["Novo".into(), "Presenteável".into()],
            ..CatalogFilter::default()
        };
        assert!(filter_products(&products, &both).is_empty());

        let one = CatalogFilter {
            tags: vec!["novo".into()],
            ..CatalogFilter::default()
        };
        assert_eq!(ids(&filter_products(&products, &one)), vec!["a"]);
    }

    #[test]
    fn test_price_bounds_are_inclusive_on_effective_price() {
        let products = vec![
            product("promo", 5000, Some(4000)),
            product("exact", 4000, None),
            product("above", 4001, None),
        ];
        let filter = CatalogFilter {
            max_price: Some(Money::from_cents(4000)),
            ..CatalogFilter::default()
        };
        assert_eq!(ids(&filter_products(&products, &filter)), vec!["promo", "exact"]);

        let filter = CatalogFilter {
            min_price: Some(Money::from_cents(4001)),
            ..CatalogFilter::default()
        };
        assert_eq!(ids(&filter_products(&products, &filter)), vec!["above"]);
    }

    #[test]
    fn test_query_searches_all_text_fields() {
        let mut a = product("a", 1000, None);
        a.name = "Brinco Aurora".into();
        let mut b = product("b", 1000, None);
        b.materials = vec!["Prata 925".into()];
        let mut c = product("c", 1000, None);
        c.colors = vec!["Dourado".into()];
        let products = vec![a, b, c];

        let search = |q: &str| {
            let filter = CatalogFilter {
                query: Some(q.into()),
                ..CatalogFilter::default()
            };
            ids(&filter_products(&products, &filter))
                .into_iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        };

        assert_eq!(search("  AURORA "), vec!["a"]);
        assert_eq!(search("prata"), vec!["b"]);
        assert_eq!(search("dourado"), vec!["c"]);
        assert_eq!(search("   ").len(), 3);
    }

    #[test]
    fn test_category_and_stock_compose() {
        let mut a = product("a", 1000, None);
        a.category = Category::Colares;
        let mut b = product("b", 1000, None);
        b.category = Category::Colares;
        b.in_stock = false;
        let c = product("c", 1000, None);
        let products = vec![a, b, c];

        let filter = CatalogFilter {
            category: Some(Category::Colares.into()),
            in_stock_only: true,
            ..CatalogFilter::default()
        };
        assert_eq!(ids(&filter_products(&products, &filter)), vec!["a"]);

        let filter = CatalogFilter {
            category: Some(Category::Colares.into()),
            ..CatalogFilter::default()
        };
        assert_eq!(ids(&filter_products(&products, &filter)), vec!["a", "b"]);

        let filter = CatalogFilter {
            category: Some(CategoryFilter::Unknown),
            ..CatalogFilter::default()
        };
        assert!(filter_products(&products, &filter).is_empty());
    }

    #[test]
    fn test_price_asc_is_stable() {
        let products = vec![
            product("A", 5000, None),
            product("B", 2000, None),
            product("C", 3000, Some(2000)),
            product("D", 8000, None),
        ];
        assert_eq!(
            ids(&sort_products(&products, SortKey::PriceAsc)),
            vec!["B", "C", "A", "D"]
        );
        assert_eq!(
            ids(&sort_products(&products, SortKey::PriceDesc)),
            vec!["D", "A", "B", "C"]
        );
    }

    #[test]
    fn test_newest_first() {
        let old = product("old", 1000, None);
        let mut new = product("new", 1000, None);
        new.created_at += Duration::days(3);
        assert_eq!(
            ids(&sort_products(&[old, new], SortKey::Newest)),
            vec!["new", "old"]
        );
    }

    #[test]
    fn test_recommended_puts_featured_first() {
        let plain = product("plain", 1000, None);
        let mut featured = product("featured", 1000, None);
        featured.featured = true;
        let mut newer = product("newer", 1000, None);
        newer.created_at += Duration::days(1);

        assert_eq!(
            ids(&sort_products(&[plain, newer, featured], SortKey::Recommended)),
            vec!["featured", "newer", "plain"]
        );
    }

    #[test]
    fn test_sort_key_parse_falls_back_to_recommended() {
        assert_eq!(SortKey::parse_lenient("price-desc"), SortKey::PriceDesc);
        assert_eq!(SortKey::parse_lenient("popular"), SortKey::Recommended);
        assert_eq!(SortKey::parse_lenient(""), SortKey::Recommended);
        assert_eq!(SortKey::Newest.to_string(), "newest");
    }

    #[test]
    fn test_filter_does_not_touch_input() {
        let products = vec![product("a", 1000, None), product("b", 2000, None)];
        let before = products.clone();
        let _ = query_products(&products, &CatalogFilter::default(), SortKey::PriceDesc);
        assert_eq!(products, before);
    }
}
