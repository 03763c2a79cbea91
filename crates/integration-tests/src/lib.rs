//! Integration tests for Tech Store.
//!
//! These tests drive the storefront and admin libraries together without a
//! database: the catalog is served from an in-memory [`FixedCatalog`] and
//! carts live in an in-memory session store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p techstore-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart` - Cart behavior through the session-backed store
//! - `catalog` - Filtering and derived catalog views
//! - `checkout` - Order validation and the WhatsApp message
//! - `revalidation` - Admin publish requests against the storefront caches
//! - `admin_products` - Product input validation and image naming
//! - `storefront_routes` - Storefront handlers driven through the router

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use rust_decimal::Decimal;
use tower_sessions::{MemoryStore, Session};

use techstore_core::{Product, ProductCategory, ProductId, ProductSpecs};
use techstore_storefront::cache::ProductSource;
use techstore_storefront::db::RepositoryError;

/// A fresh session backed by its own in-memory store.
#[must_use]
pub fn session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

/// Build a product with sensible defaults for its category.
#[must_use]
pub fn product(id: i32, name: &str, category: ProductCategory, price: i64) -> Product {
    let fashion = category.is_fashion();
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        brand: None,
        category,
        price: Decimal::from(price),
        discount_price: None,
        stock: 5,
        is_available: true,
        description: String::new(),
        thumbnail: None,
        pictures: vec![format!("https://cdn.example.com/product-images/{id}.jpg")],
        specs: ProductSpecs::default(),
        colors: if fashion { vec!["black".to_string()] } else { vec![] },
        sizes: if fashion && category != ProductCategory::Bag {
            vec!["M".to_string()]
        } else {
            vec![]
        },
        rating: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// The same product with a discount price.
#[must_use]
pub fn discounted(mut product: Product, discount: i64) -> Product {
    product.discount_price = Some(Decimal::from(discount));
    product
}

/// A small mixed catalog: phones, laptops and fashion items.
#[must_use]
pub fn sample_catalog() -> Vec<Product> {
    let mut galaxy = discounted(product(1, "Galaxy S24", ProductCategory::Phone, 42_999), 38_999);
    galaxy.brand = Some("Samsung".to_string());

    let mut iphone = product(2, "iPhone 15", ProductCategory::Phone, 54_999);
    iphone.brand = Some("Apple".to_string());

    let mut macbook = product(3, "MacBook Air", ProductCategory::Laptop, 67_999);
    macbook.brand = Some("Apple".to_string());

    let mut sold_out = product(4, "IdeaPad Slim 3", ProductCategory::Laptop, 24_999);
    sold_out.brand = Some("Lenovo".to_string());
    sold_out.stock = 0;
    sold_out.is_available = false;

    let dress = discounted(product(5, "Linen Dress", ProductCategory::Dress, 1_200), 950);
    let tote = product(6, "Leather Tote", ProductCategory::Bag, 1_600);

    vec![galaxy, iphone, macbook, sold_out, dress, tote]
}

/// In-memory product source that counts how often it was loaded.
#[derive(Clone, Default)]
pub struct FixedCatalog {
    products: Arc<std::sync::Mutex<Vec<Product>>>,
    loads: Arc<AtomicUsize>,
}

impl FixedCatalog {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(std::sync::Mutex::new(products)),
            loads: Arc::default(),
        }
    }

    /// Replace the stored products, as an admin write would.
    pub fn replace(&self, products: Vec<Product>) {
        *self.products.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = products;
    }

    /// Number of completed loads.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ProductSource for FixedCatalog {
    async fn load_all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .products
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }
}
