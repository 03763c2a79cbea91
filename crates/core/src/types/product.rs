//! The product record as stored in the catalog.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::effective_price;

/// Product category.
///
/// The catalog serves two product lines: electronics (`phone`, `laptop`) and
/// fashion (`dress`, `casual`, `bag`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Phone,
    Laptop,
    Dress,
    Casual,
    Bag,
}

impl ProductCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 5] = [
        Self::Phone,
        Self::Laptop,
        Self::Dress,
        Self::Casual,
        Self::Bag,
    ];

    /// Database and URL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Laptop => "laptop",
            Self::Dress => "dress",
            Self::Casual => "casual",
            Self::Bag => "bag",
        }
    }

    /// Whether products of this category are sold with color/size options.
    #[must_use]
    pub const fn is_fashion(&self) -> bool {
        matches!(self, Self::Dress | Self::Casual | Self::Bag)
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown product category: {0}")]
pub struct ProductCategoryError(pub String);

impl FromStr for ProductCategory {
    type Err = ProductCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phone" => Ok(Self::Phone),
            "laptop" => Ok(Self::Laptop),
            "dress" => Ok(Self::Dress),
            "casual" => Ok(Self::Casual),
            "bag" => Ok(Self::Bag),
            other => Err(ProductCategoryError(other.to_string())),
        }
    }
}

/// Optional hardware attributes for electronics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpecs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
}

impl ProductSpecs {
    /// Labelled, non-empty attributes in a stable order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("CPU", &self.cpu),
            ("RAM", &self.ram),
            ("Storage", &self.storage),
            ("GPU", &self.gpu),
            ("Screen", &self.screen),
            ("Battery", &self.battery),
            ("Camera", &self.camera),
            ("OS", &self.os),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (label, v))
        })
        .collect()
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub category: ProductCategory,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i32,
    pub is_available: bool,
    pub description: String,
    pub thumbnail: Option<String>,
    pub pictures: Vec<String>,
    #[serde(default)]
    pub specs: ProductSpecs,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    pub rating: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The price a customer pays right now.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        effective_price(self.price, self.discount_price)
    }

    /// Whether the effective price is below the base price.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.effective_price() < self.price
    }

    /// Whether at least one unit can be sold.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.is_available && self.stock >= 1
    }

    /// Stock as an unsigned unit count; negative stock counts as zero.
    #[must_use]
    pub fn stock_units(&self) -> u32 {
        u32::try_from(self.stock).unwrap_or(0)
    }

    /// Image to show in listings: the explicit thumbnail or the first picture.
    #[must_use]
    pub fn display_image(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .or_else(|| self.pictures.first().map(String::as_str))
    }
}

// =============================================================================
// Database Row
// =============================================================================

/// Row shape of the `products` table.
///
/// Specs are flattened into nullable columns; the category is stored as text
/// and validated when converting into [`Product`].
#[cfg(feature = "postgres")]
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub brand: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i32,
    pub is_available: bool,
    pub description: String,
    pub thumbnail: Option<String>,
    pub pictures: Vec<String>,
    pub cpu: Option<String>,
    pub ram: Option<String>,
    pub storage: Option<String>,
    pub gpu: Option<String>,
    pub screen: Option<String>,
    pub battery: Option<String>,
    pub camera: Option<String>,
    pub os: Option<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub rating: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "postgres")]
impl ProductRow {
    /// Column list matching the field order of this struct.
    pub const COLUMNS: &'static str = "id, name, brand, category, price, discount_price, stock, \
        is_available, description, thumbnail, pictures, cpu, ram, storage, gpu, screen, \
        battery, camera, os, colors, sizes, rating, created_at, updated_at";
}

#[cfg(feature = "postgres")]
impl TryFrom<ProductRow> for Product {
    type Error = ProductCategoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            brand: row.brand,
            category: row.category.parse()?,
            price: row.price,
            discount_price: row.discount_price,
            stock: row.stock,
            is_available: row.is_available,
            description: row.description,
            thumbnail: row.thumbnail,
            pictures: row.pictures,
            specs: ProductSpecs {
                cpu: row.cpu,
                ram: row.ram,
                storage: row.storage,
                gpu: row.gpu,
                screen: row.screen,
                battery: row.battery,
                camera: row.camera,
                os: row.os,
            },
            colors: row.colors,
            sizes: row.sizes,
            rating: row.rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
