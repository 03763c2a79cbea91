//! Seed the catalog from a YAML file.
//!
//! The file holds a `products` list; every entry uses the same fields as the
//! admin API (including the `discountPrice`/`newprice` aliases). All entries
//! are validated before anything is written.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use sqlx::PgPool;

use techstore_admin::db::{self, RepositoryError, insert_product};
use techstore_admin::models::{NewProduct, ProductInput, ValidationErrors};
use techstore_core::Product;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} product(s) failed validation")]
    Invalid(usize),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Top-level shape of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<ProductInput>,
}

/// A seed entry that failed validation.
#[derive(Debug)]
pub struct InvalidEntry {
    /// Position in the file, starting at 1.
    pub position: usize,
    pub name: String,
    pub errors: ValidationErrors,
}

/// Parse and validate seed file contents.
///
/// # Errors
///
/// Returns `SeedError::Yaml` if the contents don't parse. Otherwise the inner
/// result holds either every product or every entry that failed validation.
pub fn parse(content: &str) -> Result<Result<Vec<NewProduct>, Vec<InvalidEntry>>, SeedError> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    let mut valid = Vec::with_capacity(file.products.len());
    let mut invalid = Vec::new();
    for (i, input) in file.products.into_iter().enumerate() {
        let name = input.name.clone();
        match input.validate() {
            Ok(product) => valid.push(product),
            Err(errors) => invalid.push(InvalidEntry {
                position: i + 1,
                name,
                errors,
            }),
        }
    }

    Ok(if invalid.is_empty() {
        Ok(valid)
    } else {
        Err(invalid)
    })
}

/// Seed products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file can't be read or parsed, any entry is
/// invalid, or a database operation fails.
pub async fn products(file_path: &str, dry_run: bool) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    tracing::info!(path = %file_path, "Loading products");
    let content = tokio::fs::read_to_string(Path::new(file_path))
        .await
        .map_err(|source| SeedError::Io {
            path: file_path.to_string(),
            source,
        })?;

    let products = match parse(&content)? {
        Ok(products) => products,
        Err(invalid) => {
            for entry in &invalid {
                tracing::error!(
                    position = entry.position,
                    name = %entry.name,
                    "Invalid product: {}",
                    entry.errors
                );
            }
            return Err(SeedError::Invalid(invalid.len()));
        }
    };
    tracing::info!(count = products.len(), "Products validated");

    if dry_run {
        tracing::info!("Dry run, nothing written");
        return Ok(());
    }

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| SeedError::MissingEnvVar("ADMIN_DATABASE_URL"))?;
    let pool = db::create_pool(&database_url).await?;
    let created = insert_all(&pool, &products).await?;

    tracing::info!(count = created.len(), "Seeding complete");
    Ok(())
}

/// Insert every product in one transaction. Nothing is written if any
/// insert fails.
///
/// # Errors
///
/// Returns an error if the transaction can't be opened or committed, or if
/// the database rejects a row.
pub async fn insert_all(
    pool: &PgPool,
    products: &[NewProduct],
) -> Result<Vec<Product>, SeedError> {
    let mut tx = pool.begin().await?;
    let mut created = Vec::with_capacity(products.len());

    for product in products {
        let row = insert_product(&mut *tx, product).await?;
        tracing::info!(id = %row.id, name = %row.name, "Inserted product");
        created.push(row);
    }

    tx.commit().await?;
    Ok(created)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use techstore_core::ProductCategory;

    use super::*;

    #[test]
    fn test_bundled_seed_file_is_valid() {
        let products = parse(include_str!("../../seeds/products.yaml"))
            .unwrap()
            .unwrap();

        assert_eq!(products.len(), 7);
        let tote = products
            .iter()
            .find(|p| p.category == ProductCategory::Bag)
            .unwrap();
        assert!(tote.sizes.is_empty());
        assert!(tote.discount_price.is_some());
    }

    #[test]
    fn test_every_invalid_entry_is_reported() {
        let yaml = r#"
products:
  - name: ok
    category: phone
    price: "10"
    pictures: [a.jpg]
  - name: ""
    category: phone
    price: "10"
    pictures: [a.jpg]
  - name: dress without sizes
    category: dress
    price: "10"
    pictures: [a.jpg]
    colors: [red]
"#;
        let invalid = parse(yaml).unwrap().unwrap_err();
        let positions: Vec<usize> = invalid.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![2, 3]);
        assert_eq!(invalid[1].name, "dress without sizes");
    }

    async fn count_named(pool: &PgPool, names: &[String]) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE name = ANY($1)")
            .bind(names)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "Requires a migrated database in ADMIN_DATABASE_URL"]
    async fn test_failed_insert_rolls_back_whole_seed() {
        let url = std::env::var("ADMIN_DATABASE_URL").unwrap();
        let pool = db::create_pool(&SecretString::from(url)).await.unwrap();

        let mut products = parse(include_str!("../../seeds/products.yaml"))
            .unwrap()
            .unwrap();
        for product in &mut products {
            product.name = format!("rollback check {}", product.name);
        }
        // The price check constraint rejects the fourth row
        products[3].price = -products[3].price;
        let names: Vec<String> = products.iter().map(|p| p.name.clone()).collect();

        let before = count_named(&pool, &names).await;
        let result = insert_all(&pool, &products).await;

        assert!(matches!(
            result,
            Err(SeedError::Repository(RepositoryError::Conflict(_)))
        ));
        assert_eq!(count_named(&pool, &names).await, before);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(matches!(parse("products: ["), Err(SeedError::Yaml(_))));
        assert!(matches!(parse("items: []"), Err(SeedError::Yaml(_))));
    }
}
