//! Product repository.
//!
//! Queries are checked at runtime so the crate builds without a live
//! database; the column list comes from [`ProductRow::COLUMNS`].

use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgExecutor, PgPool, Postgres};

use techstore_core::{Product, ProductId, ProductRow};

use super::{RepositoryError, map_write_error};
use crate::models::NewProduct;

/// Columns written on insert and update, in bind order.
const WRITE_COLUMNS: &str = "name, brand, category, price, discount_price, stock, \
    is_available, description, thumbnail, pictures, cpu, ram, storage, gpu, screen, \
    battery, camera, os, colors, sizes, rating";

type ProductQuery<'q> = QueryAs<'q, Postgres, ProductRow, PgArguments>;

/// Bind a product's writable fields as `$1..$21`.
fn bind_fields<'q>(query: ProductQuery<'q>, product: &'q NewProduct) -> ProductQuery<'q> {
    query
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.category.as_str())
        .bind(product.price)
        .bind(product.discount_price)
        .bind(product.stock)
        .bind(product.is_available)
        .bind(&product.description)
        .bind(&product.thumbnail)
        .bind(&product.pictures)
        .bind(&product.specs.cpu)
        .bind(&product.specs.ram)
        .bind(&product.specs.storage)
        .bind(&product.specs.gpu)
        .bind(&product.specs.screen)
        .bind(&product.specs.battery)
        .bind(&product.specs.camera)
        .bind(&product.specs.os)
        .bind(&product.colors)
        .bind(&product.sizes)
        .bind(product.rating)
}

fn into_product(row: ProductRow) -> Result<Product, RepositoryError> {
    let id = row.id;
    Product::try_from(row)
        .map_err(|e| RepositoryError::DataCorruption(format!("product {id}: {e}")))
}

/// Insert a product through any executor, so callers can batch inserts in
/// a transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if a table constraint rejects the row.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert_product<'e, E>(
    executor: E,
    product: &NewProduct,
) -> Result<Product, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        "INSERT INTO products ({WRITE_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                 $16, $17, $18, $19, $20, $21) \
         RETURNING {}",
        ProductRow::COLUMNS
    );
    let row = bind_fields(sqlx::query_as::<_, ProductRow>(&query), product)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)?;

    into_product(row)
}

/// Repository for product CRUD.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM products ORDER BY id DESC",
            ProductRow::COLUMNS
        );
        let rows = sqlx::query_as::<_, ProductRow>(&query)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(into_product).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let query = format!("SELECT {} FROM products WHERE id = $1", ProductRow::COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(into_product).transpose()
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a table constraint rejects the row.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        insert_product(self.pool, product).await
    }

    /// Replace every writable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if a table constraint rejects the row.
    pub async fn update(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let query = format!(
            "UPDATE products SET \
                name = $1, brand = $2, category = $3, price = $4, discount_price = $5, \
                stock = $6, is_available = $7, description = $8, thumbnail = $9, \
                pictures = $10, cpu = $11, ram = $12, storage = $13, gpu = $14, \
                screen = $15, battery = $16, camera = $17, os = $18, colors = $19, \
                sizes = $20, rating = $21, updated_at = NOW() \
             WHERE id = $22 \
             RETURNING {}",
            ProductRow::COLUMNS
        );
        let row = bind_fields(sqlx::query_as::<_, ProductRow>(&query), product)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(RepositoryError::NotFound)?;

        into_product(row)
    }

    /// Picture URLs of a product, `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pictures(&self, id: ProductId) -> Result<Option<Vec<String>>, RepositoryError> {
        let pictures: Option<(Vec<String>,)> =
            sqlx::query_as("SELECT pictures FROM products WHERE id = $1")
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        Ok(pictures.map(|(p,)| p))
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
