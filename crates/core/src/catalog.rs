//! Catalog filtering, sorting and derived views.
//!
//! Everything here is a pure function over the full in-memory product list.
//! There is no pagination or indexing: results are recomputed from scratch on
//! every query.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::types::{Product, ProductCategory, ProductId};

/// Stock filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    InStock,
    OutOfStock,
}

impl FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-stock" => Ok(Self::InStock),
            "out-of-stock" => Ok(Self::OutOfStock),
            other => Err(format!("invalid availability: {other}")),
        }
    }
}

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Most recently created first (highest id).
    #[default]
    Newest,
    /// Cheapest effective price first.
    PriceLow,
    /// Most expensive effective price first.
    PriceHigh,
    /// Highest rating first; unrated products count as zero.
    Rating,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            other => Err(format!("invalid sort order: {other}")),
        }
    }
}

/// A combination of catalog predicates plus a sort order.
///
/// Deserializes from a query string. Blank values (`?brand=`) mean "no
/// filter", matching how an unset form control is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<ProductCategory>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub availability: Option<Availability>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sort: Option<SortOrder>,
}

impl CatalogQuery {
    /// Whether a single product passes every predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let price = product.effective_price();

        self.category.is_none_or(|c| product.category == c)
            && self
                .brand
                .as_deref()
                .map(str::trim)
                .is_none_or(|b| product.brand.as_deref().map(str::trim) == Some(b))
            && self.min_price.is_none_or(|min| price >= min)
            && self.max_price.is_none_or(|max| price <= max)
            && self.availability.is_none_or(|a| match a {
                Availability::InStock => product.is_available,
                Availability::OutOfStock => !product.is_available,
            })
            && self
                .search
                .as_deref()
                .is_none_or(|term| matches_search(product, term))
    }

    /// Filter and sort a product list.
    ///
    /// Returns an empty list when nothing matches.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut matched: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        let order = self.sort.unwrap_or_default();
        matched.sort_by(|a, b| compare(order, a, b));
        matched
    }
}

fn matches_search(product: &Product, term: &str) -> bool {
    let term = term.to_lowercase();
    product.name.to_lowercase().contains(&term)
        || product
            .brand
            .as_deref()
            .is_some_and(|brand| brand.to_lowercase().contains(&term))
}

fn compare(order: SortOrder, a: &Product, b: &Product) -> Ordering {
    match order {
        SortOrder::Newest => b.id.cmp(&a.id),
        SortOrder::PriceLow => a.effective_price().cmp(&b.effective_price()),
        SortOrder::PriceHigh => b.effective_price().cmp(&a.effective_price()),
        SortOrder::Rating => b
            .rating
            .unwrap_or(Decimal::ZERO)
            .cmp(&a.rating.unwrap_or(Decimal::ZERO)),
    }
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

// =============================================================================
// Derived Views
// =============================================================================

/// Discounted, available products for the home page "on sale" strip.
#[must_use]
pub fn sale_products(products: &[Product], limit: usize) -> Vec<&Product> {
    products
        .iter()
        .filter(|p| p.has_discount() && p.is_available)
        .take(limit)
        .collect()
}

/// Distinct non-empty brands, in first-seen order.
#[must_use]
pub fn brands(products: &[Product]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for brand in products.iter().filter_map(|p| p.brand.as_deref()) {
        let brand = brand.trim();
        if !brand.is_empty() && !seen.contains(&brand) {
            seen.push(brand);
        }
    }
    seen
}

/// Number of products per category. Categories with no products are absent.
#[must_use]
pub fn category_counts(products: &[Product]) -> BTreeMap<ProductCategory, usize> {
    let mut counts = BTreeMap::new();
    for product in products {
        *counts.entry(product.category).or_insert(0) += 1;
    }
    counts
}

/// Available products in the same category as `product`, excluding itself.
#[must_use]
pub fn related_products<'a>(
    products: &'a [Product],
    product: &Product,
    limit: usize,
) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| p.category == product.category && p.id != product.id && p.is_available)
        .take(limit)
        .collect()
}

/// Find a product by id.
#[must_use]
pub fn find(products: &[Product], id: ProductId) -> Option<&Product> {
    products.iter().find(|p| p.id == id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::ProductSpecs;

    fn product(
        id: i32,
        name: &str,
        brand: &str,
        category: ProductCategory,
        price: i64,
        discount: Option<i64>,
    ) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            brand: Some(brand.to_string()),
            category,
            price: Decimal::from(price),
            discount_price: discount.map(Decimal::from),
            stock: 5,
            is_available: true,
            description: String::new(),
            thumbnail: None,
            pictures: vec![],
            specs: ProductSpecs::default(),
            colors: vec![],
            sizes: vec![],
            rating: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn catalog() -> Vec<Product> {
        let mut zenbook = product(3, "Zenbook 14", "Asus", ProductCategory::Laptop, 30000, None);
        zenbook.rating = Some(Decimal::new(45, 1));
        let mut galaxy = product(2, "Galaxy S24", "Samsung", ProductCategory::Phone, 25000, Some(22000));
        galaxy.is_available = false;
        vec![
            product(1, "iPhone 15", "Apple", ProductCategory::Phone, 40000, Some(0)),
            galaxy,
            zenbook,
            product(4, "MacBook Air", "Apple", ProductCategory::Laptop, 50000, Some(45000)),
        ]
    }

    fn ids(products: &[&Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_default_query_returns_all_newest_first() {
        let products = catalog();
        assert_eq!(ids(&CatalogQuery::default().apply(&products)), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_filter_by_category() {
        let products = catalog();
        let query = CatalogQuery {
            category: Some(ProductCategory::Phone),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec![2, 1]);
    }

    #[test]
    fn test_category_without_products_is_empty() {
        let products = catalog();
        let query = CatalogQuery {
            category: Some(ProductCategory::Bag),
            ..Default::default()
        };
        assert!(query.apply(&products).is_empty());
    }

    #[test]
    fn test_price_bounds_use_effective_price() {
        let products = catalog();
        let query = CatalogQuery {
            max_price: Some(Decimal::from(45000)),
            min_price: Some(Decimal::from(40000)),
            ..Default::default()
        };
        // MacBook is discounted to 45000, iPhone's zero discount is ignored
        assert_eq!(ids(&query.apply(&products)), vec![4, 1]);
    }

    #[test]
    fn test_availability_filter() {
        let products = catalog();
        let query = CatalogQuery {
            availability: Some(Availability::OutOfStock),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec![2]);
    }

    #[test]
    fn test_search_matches_name_or_brand_case_insensitively() {
        let products = catalog();
        let by_brand = CatalogQuery {
            search: Some("APPLE".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&by_brand.apply(&products)), vec![4, 1]);

        let by_name = CatalogQuery {
            search: Some("galaxy".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&by_name.apply(&products)), vec![2]);
    }

    #[test]
    fn test_sort_orders() {
        let products = catalog();
        let sorted = |sort| {
            ids(&CatalogQuery {
                sort: Some(sort),
                ..Default::default()
            }
            .apply(&products))
        };

        assert_eq!(sorted(SortOrder::PriceLow), vec![2, 3, 1, 4]);
        assert_eq!(sorted(SortOrder::PriceHigh), vec![4, 1, 3, 2]);
        assert_eq!(sorted(SortOrder::Rating).first(), Some(&3));
    }

    #[test]
    fn test_query_string_blank_values_are_ignored() {
        let query: CatalogQuery = serde_json::from_value(serde_json::json!({
            "category": "laptop",
            "brand": "",
            "min_price": "  ",
            "max_price": "35000",
            "sort": "price-high"
        }))
        .unwrap();

        assert_eq!(query.category, Some(ProductCategory::Laptop));
        assert_eq!(query.brand, None);
        assert_eq!(query.min_price, None);
        assert_eq!(query.max_price, Some(Decimal::from(35000)));
        assert_eq!(query.sort, Some(SortOrder::PriceHigh));
    }

    #[test]
    fn test_query_rejects_unknown_sort() {
        let result: Result<CatalogQuery, _> =
            serde_json::from_value(serde_json::json!({ "sort": "cheapest" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_sale_products_only_discounted_and_available() {
        let products = catalog();
        assert_eq!(ids(&sale_products(&products, 4)), vec![4]);
    }

    #[test]
    fn test_brands_are_distinct_in_order() {
        let products = catalog();
        assert_eq!(brands(&products), vec!["Apple", "Samsung", "Asus"]);
    }

    #[test]
    fn test_brand_filter_ignores_surrounding_whitespace() {
        let mut products = catalog();
        products[2].brand = Some("Asus ".to_string());
        assert_eq!(brands(&products), vec!["Apple", "Samsung", "Asus"]);

        for wanted in ["Asus", " Asus"] {
            let query = CatalogQuery {
                brand: Some(wanted.to_string()),
                ..CatalogQuery::default()
            };
            assert_eq!(ids(&query.apply(&products)), vec![3]);
        }
    }

    #[test]
    fn test_category_counts() {
        let products = catalog();
        let counts = category_counts(&products);
        assert_eq!(counts.get(&ProductCategory::Phone), Some(&2));
        assert_eq!(counts.get(&ProductCategory::Laptop), Some(&2));
        assert_eq!(counts.get(&ProductCategory::Bag), None);
    }

    #[test]
    fn test_related_products_exclude_self_and_unavailable() {
        let products = catalog();
        let iphone = find(&products, ProductId::new(1)).unwrap();
        // Galaxy is the only other phone but it is unavailable
        assert!(related_products(&products, iphone, 8).is_empty());

        let zenbook = find(&products, ProductId::new(3)).unwrap();
        assert_eq!(ids(&related_products(&products, zenbook, 8)), vec![4]);
    }
}
