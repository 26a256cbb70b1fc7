//! Listing query-string parameters.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{CatalogFilter, CategoryFilter, SortKey};
use crate::types::Money;

/// Raw listing parameters as sent by the storefront.
///
/// Every field is kept as text and interpreted leniently: an unparseable
/// bound is ignored rather than rejected. A category outside the set
/// still narrows the listing and matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    /// Comma-separated tag list.
    pub tags: Option<String>,
    pub in_stock: Option<String>,
    pub sort: Option<String>,
}

impl CatalogQuery {
    /// The filter these parameters describe.
    #[must_use]
    pub fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            category: self
                .category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .map(CategoryFilter::parse),
            query: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(ToString::to_string),
            min_price: self.min.as_deref().and_then(parse_price),
            max_price: self.max.as_deref().and_then(parse_price),
            tags: self
                .tags
                .as_deref()
                .map(|tags| {
                    tags.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            in_stock_only: self
                .in_stock
                .as_deref()
                .is_some_and(|v| matches!(v.trim(), "true" | "1")),
        }
    }

    /// Requested order, defaulting to recommended.
    #[must_use]
    pub fn sort_key(&self) -> SortKey {
        self.sort
            .as_deref()
            .map(SortKey::parse_lenient)
            .unwrap_or_default()
    }
}

fn parse_price(raw: &str) -> Option<Money> {
    raw.trim()
        .parse::<Decimal>()
        .ok()
        .and_then(|amount| Money::from_decimal(amount).ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn test_full_query() {
        let query = CatalogQuery {
            category: Some("colares".into()),
            q: Some("  perola ".into()),
            min: Some("20".into()),
            max: Some("59.90".into()),
            tags: Some("Novo, Brilho,,".into()),
            in_stock: Some("1".into()),
            sort: Some("price-asc".into()),
        };

        let filter = query.filter();
        assert_eq!(filter.category, Some(CategoryFilter::Only(Category::Colares)));
        assert_eq!(filter.query.as_deref(), Some("perola"));
        assert_eq!(filter.min_price, Some(Money::from_cents(2000)));
        assert_eq!(filter.max_price, Some(Money::from_cents(5990)));
        assert_eq!(filter.tags, vec!["Novo".to_string(), "Brilho".to_string()]);
        assert!(filter.in_stock_only);
        assert_eq!(query.sort_key(), SortKey::PriceAsc);
    }

    #[test]
    fn test_unknown_category_matches_nothing() {
        let query = CatalogQuery {
            category: Some("relogios".into()),
            ..CatalogQuery::default()
        };
        assert_eq!(query.filter().category, Some(CategoryFilter::Unknown));

        let blank = CatalogQuery {
            category: Some("  ".into()),
            ..CatalogQuery::default()
        };
        assert_eq!(blank.filter().category, None);
    }

    #[test]
    fn test_garbage_is_ignored() {
        let query = CatalogQuery {
            min: Some("abc".into()),
            max: Some("59,90".into()),
            in_stock: Some("yes".into()),
            sort: Some("random".into()),
            ..CatalogQuery::default()
        };

        assert_eq!(query.filter(), CatalogFilter::default());
        assert_eq!(query.sort_key(), SortKey::Recommended);
    }
}
