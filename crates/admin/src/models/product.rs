//! Product input accepted by the admin API and the seed command.
//!
//! [`ProductInput`] is the raw, client-supplied shape. [`ProductInput::validate`]
//! checks it and produces a normalized [`NewProduct`], the only thing the
//! repository will write.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use techstore_core::{ProductCategory, ProductSpecs};

/// Highest allowed rating.
const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

const fn default_available() -> bool {
    true
}

/// Product fields as submitted by a client.
///
/// The discount price is also accepted as `discountPrice` or the legacy
/// `newprice`, and the category as `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(alias = "type")]
    pub category: ProductCategory,
    pub price: Decimal,
    #[serde(default, alias = "discountPrice", alias = "newprice")]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_available", alias = "isAvailable")]
    pub is_available: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub pictures: Vec<String>,
    #[serde(default)]
    pub specs: ProductSpecs,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub rating: Option<Decimal>,
}

/// A single reason a [`ProductInput`] was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name is required")]
    EmptyName,
    #[error("price must be greater than 0")]
    NonPositivePrice,
    #[error("discount price must not be negative")]
    NegativeDiscount,
    #[error("stock must not be negative")]
    NegativeStock,
    #[error("at least one picture is required")]
    NoPictures,
    #[error("{0} products need at least one color")]
    MissingColors(ProductCategory),
    #[error("{0} products need at least one size")]
    MissingSizes(ProductCategory),
    #[error("rating must be between 0 and 5")]
    RatingOutOfRange,
}

/// Every reason a [`ProductInput`] was rejected, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// The first problem found.
    #[must_use]
    pub fn first(&self) -> Option<&ValidationError> {
        self.0.first()
    }

    #[must_use]
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A validated, normalized product ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
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
    pub specs: ProductSpecs,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub rating: Option<Decimal>,
}

impl ProductInput {
    /// Check the input and normalize it.
    ///
    /// Normalization trims text, drops blank list entries, treats a zero
    /// discount as no discount, defaults the thumbnail to the first picture
    /// and always stores bags without sizes.
    ///
    /// # Errors
    ///
    /// Returns every rule the input breaks.
    pub fn validate(self) -> Result<NewProduct, ValidationErrors> {
        let name = self.name.trim().to_string();
        let pictures = clean_list(self.pictures);
        let colors = clean_list(self.colors);
        let mut sizes = clean_list(self.sizes);
        let category = self.category;

        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push(ValidationError::EmptyName);
        }
        if self.price <= Decimal::ZERO {
            errors.push(ValidationError::NonPositivePrice);
        }
        if self.discount_price.is_some_and(|d| d < Decimal::ZERO) {
            errors.push(ValidationError::NegativeDiscount);
        }
        if self.stock < 0 {
            errors.push(ValidationError::NegativeStock);
        }
        if pictures.is_empty() {
            errors.push(ValidationError::NoPictures);
        }
        if category.is_fashion() {
            if colors.is_empty() {
                errors.push(ValidationError::MissingColors(category));
            }
            if category != ProductCategory::Bag && sizes.is_empty() {
                errors.push(ValidationError::MissingSizes(category));
            }
        }
        if self
            .rating
            .is_some_and(|r| r < Decimal::ZERO || r > MAX_RATING)
        {
            errors.push(ValidationError::RatingOutOfRange);
        }

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        if category == ProductCategory::Bag {
            sizes.clear();
        }

        let thumbnail = clean_text(self.thumbnail).or_else(|| pictures.first().cloned());

        Ok(NewProduct {
            name,
            brand: clean_text(self.brand),
            category,
            price: self.price,
            discount_price: self.discount_price.filter(|d| *d > Decimal::ZERO),
            stock: self.stock,
            is_available: self.is_available,
            description: self.description.trim().to_string(),
            thumbnail,
            pictures,
            specs: self.specs,
            colors,
            sizes,
            rating: self.rating,
        })
    }
}

fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
