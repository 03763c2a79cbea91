//! Read-only product queries.

use sqlx::PgPool;

use techstore_core::{Product, ProductRow};

use super::RepositoryError;

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the whole catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row has an unknown category.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM products ORDER BY id DESC",
            ProductRow::COLUMNS
        );
        let rows = sqlx::query_as::<_, ProductRow>(&query)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                Product::try_from(row).map_err(|e| {
                    RepositoryError::DataCorruption(format!("product {id}: {e}"))
                })
            })
            .collect()
    }
}
